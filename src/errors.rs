use failure::Error as FailureError;
use validator::{ValidationError, ValidationErrors};

/// Kinds of failures raised by models and services. Services wrap them in context,
/// use `error_kind` to recover the kind from a context chain.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Not found")]
    NotFound,
    #[fail(display = "Validation error: {}", _0)]
    Validate(ValidationErrors),
    #[fail(display = "Server is refusing to fullfil the request")]
    Forbidden,
    #[fail(display = "Insufficient funds")]
    InsufficientFunds,
    #[fail(display = "Review edit window has expired")]
    EditWindowExpired,
    #[fail(display = "Illegal state: {}", _0)]
    IllegalState(String),
}

impl Error {
    /// Wraps a single field violation
    pub fn invalid(field: &'static str, error: ValidationError) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        Error::Validate(errors)
    }

    /// Converts `Error` to HTTP Status Code
    pub fn code(&self) -> u16 {
        match *self {
            Error::NotFound => 404,
            Error::Validate(_) => 400,
            Error::Forbidden | Error::EditWindowExpired => 403,
            Error::IllegalState(_) => 409,
            Error::InsufficientFunds => 422,
        }
    }
}

/// Finds the domain error behind any number of context layers
pub fn error_kind(e: &FailureError) -> Option<&Error> {
    e.iter_chain().filter_map(|cause| cause.downcast_ref::<Error>()).next()
}

/// Status code the REST layer should answer with, 500 for unclassified failures
pub fn status_code(e: &FailureError) -> u16 {
    error_kind(e).map(Error::code).unwrap_or(500)
}
