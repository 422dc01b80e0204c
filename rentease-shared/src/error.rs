/// Domain errors shared by the RentEase services
///
/// Every service operation returns [`ServiceResult`]. The variants are
/// deliberately coarse: the HTTP layer maps each one to a single status code,
/// and the message is safe to show to the user except for `Store` and the
/// internal `Password` failures.

use crate::auth::password::PasswordError;
use crate::store::StoreError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Bad user input: mismatched confirmation, short password, empty field
    #[error("{0}")]
    Validation(String),

    /// Credentials did not match
    #[error("{0}")]
    Auth(String),

    /// Caller is logged in with the wrong role
    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    /// Account already registered in this role
    #[error("{0}")]
    Conflict(String),

    #[error("Storage failure: {0}")]
    Store(StoreError),

    /// Hashing or verification failed for a reason other than policy
    #[error("Password failure: {0}")]
    Password(PasswordError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Store(other),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort { .. } => ServiceError::Validation(err.to_string()),
            other => ServiceError::Password(other),
        }
    }
}
