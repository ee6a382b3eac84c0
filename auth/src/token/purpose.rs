use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenCodecError;

/// Discriminator selecting expiry and persistence policy for a token.
///
/// Four independent short lifecycles, not one shared machine:
///
/// | Purpose       | Persisted? | Revoked on use? |
/// |---------------|------------|-----------------|
/// | access        | no         | n/a (stateless) |
/// | refresh       | yes        | no              |
/// | reset_password| yes        | yes             |
/// | verify_email  | yes        | yes             |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    Refresh,
    ResetPassword,
    VerifyEmail,
}

impl TokenPurpose {
    /// Whether a token of this purpose gets a durable store record.
    ///
    /// Access tokens are stateless by design: short-lived, verified without
    /// I/O, unrevocable except by natural expiry.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, TokenPurpose::Access)
    }

    /// Whether the store record must be revoked immediately after a
    /// successful use (single-use semantics).
    pub fn is_single_use(&self) -> bool {
        matches!(self, TokenPurpose::ResetPassword | TokenPurpose::VerifyEmail)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Access => "access",
            TokenPurpose::Refresh => "refresh",
            TokenPurpose::ResetPassword => "reset_password",
            TokenPurpose::VerifyEmail => "verify_email",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenPurpose {
    type Err = TokenCodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenPurpose::Access),
            "refresh" => Ok(TokenPurpose::Refresh),
            "reset_password" => Ok(TokenPurpose::ResetPassword),
            "verify_email" => Ok(TokenPurpose::VerifyEmail),
            other => Err(TokenCodecError::UnknownPurpose(other.to_string())),
        }
    }
}
