use thiserror::Error;

use crate::domain::identity::errors::IdentityError;
use crate::domain::token::errors::TokenError;

/// Notifier failure. Logged by callers; never fatal to the operation that
/// triggered the notification.
#[derive(Debug, Clone, Error)]
#[error("Email delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Subsystem-boundary error taxonomy.
///
/// Deliberately coarse: login failures are one generic variant regardless of
/// which part was wrong, and `InvalidToken` hides whether a token was
/// expired, revoked, or never existed. The precise cause stays in internal
/// errors and logs.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("An identity with this email already exists")]
    DuplicateIdentity,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::EmailAlreadyExists(_) => AuthError::DuplicateIdentity,
            IdentityError::NotFound(id) => AuthError::NotFound(id),
            IdentityError::InvalidId(e) => AuthError::Validation(e.to_string()),
            IdentityError::InvalidEmail(e) => AuthError::Validation(e.to_string()),
            IdentityError::DatabaseError(e) => AuthError::Persistence(e),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            // All verification failures collapse into one opaque kind
            TokenError::Codec(_)
            | TokenError::InvalidSubject(_)
            | TokenError::PurposeMismatch { .. }
            | TokenError::NotFound => AuthError::InvalidToken,
            TokenError::NotPersisted(p) => {
                AuthError::Unknown(format!("purpose {} is not persisted", p))
            }
            TokenError::DatabaseError(e) => AuthError::Persistence(e),
        }
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Unknown(err.to_string())
    }
}
