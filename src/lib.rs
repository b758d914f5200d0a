//! Repairs is the domain core of a repair marketplace: customers request repairs,
//! technicians fulfill them, reviews are left, coupons applied and wallets track balances.
//! The layered structure of the crate is
//!
//! `Service -> Repo`
//!
//! Persistence, HTTP routing and authentication are provided by the host application:
//! repositories are traits produced by a `ReposFactory`, the acting user arrives in the
//! `DynamicContext`. Each layer returns `failure::Error` and covers errors it passes on with
//! context; `errors::Error` carries the kind of failure so the REST layer can map it to a
//! status code with `errors::status_code`.

extern crate chrono;
extern crate config as config_crate;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate num_traits;
extern crate rand;
extern crate regex;
extern crate rust_decimal;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate uuid;
extern crate validator;
#[macro_use]
extern crate validator_derive;

#[macro_use]
pub mod macros;
pub mod config;
pub mod errors;
pub mod models;
pub mod repos;
pub mod services;
