pub mod estimate;
pub mod observers;
pub mod service_request;
pub mod state;

pub use self::estimate::*;
pub use self::observers::*;
pub use self::service_request::*;
pub use self::state::*;
