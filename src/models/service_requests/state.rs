//! Lifecycle states of a service request
use std::fmt;

/// Where a service request is in its lifecycle.
///
/// `Pending -> Estimated -> Accepted -> InProgress -> Completed`, with `Estimated -> Rejected`
/// when the customer turns the estimate down. Editing a rejected request puts it back to `Pending`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceRequestState {
    Pending,
    Estimated,
    Accepted,
    InProgress,
    Completed,
    Rejected,
}

impl ServiceRequestState {
    /// Customer may still change or withdraw the request
    pub fn is_editable(&self) -> bool {
        match *self {
            ServiceRequestState::Pending | ServiceRequestState::Rejected => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            ServiceRequestState::Pending => "pending",
            ServiceRequestState::Estimated => "estimated",
            ServiceRequestState::Accepted => "accepted",
            ServiceRequestState::InProgress => "in progress",
            ServiceRequestState::Completed => "completed",
            ServiceRequestState::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ServiceRequestState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
