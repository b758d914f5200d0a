use failure::Error as FailureError;

/// Service layer Result
pub type ServiceResult<T> = Result<T, FailureError>;
