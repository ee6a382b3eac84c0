use thiserror::Error;

/// Error type for token encoding and decoding.
///
/// Decoding discriminates between a bad signature, a lapsed expiry, and a
/// string that is not a token at all. Callers at the subsystem boundary are
/// expected to collapse these into one opaque failure before reporting
/// externally.
#[derive(Debug, Clone, Error)]
pub enum TokenCodecError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Unknown token purpose: {0}")]
    UnknownPurpose(String),
}
