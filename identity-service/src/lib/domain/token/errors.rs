use auth::TokenCodecError;
use auth::TokenPurpose;
use thiserror::Error;

use crate::domain::identity::errors::IdentityIdError;

/// Error for token lifecycle operations.
///
/// Internally precise (expired vs revoked vs absent vs forged are distinct
/// variants for logging); the auth boundary collapses all verification
/// failures into one opaque `InvalidToken` before anything leaves the
/// subsystem.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    // Codec failures (signature, expiry, parse) converted via #[from]
    #[error("Token codec error: {0}")]
    Codec(#[from] TokenCodecError),

    #[error("Token subject is not a valid identity id: {0}")]
    InvalidSubject(#[from] IdentityIdError),

    #[error("Token presented for wrong purpose: expected {expected}, got {actual}")]
    PurposeMismatch {
        expected: TokenPurpose,
        actual: TokenPurpose,
    },

    #[error("Purpose {0} does not use the token store")]
    NotPersisted(TokenPurpose),

    // Absent or revoked store record; includes cryptographically valid
    // tokens whose record was blacklisted or never existed (forged)
    #[error("No active token record found")]
    NotFound,

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),
}
