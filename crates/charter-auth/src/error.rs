//! Authentication error types.

use charter_core::error::CharterError;
use thiserror::Error;

use crate::flow::AuthStep;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired code")]
    InvalidCode,

    #[error("access denied: admin account required")]
    AdminRequired,

    #[error("{0}")]
    Validation(String),

    #[error("an account with this email already exists")]
    AccountExists,

    #[error("not available from the {actual} step (expected {expected})")]
    OutOfStep { expected: AuthStep, actual: AuthStep },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for CharterError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidCode => {
                CharterError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::AdminRequired => CharterError::AuthorizationDenied {
                reason: err.to_string(),
            },
            AuthError::Validation(_) | AuthError::AccountExists | AuthError::OutOfStep { .. } => {
                CharterError::Validation {
                    message: err.to_string(),
                }
            }
            AuthError::Crypto(msg) => CharterError::Crypto(msg),
        }
    }
}
