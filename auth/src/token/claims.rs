use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::purpose::TokenPurpose;

/// Signed token payload: subject, issuance time, expiry time, purpose tag.
///
/// The `type` field scopes verification: a refresh token presented where an
/// access token is expected fails even though the signature is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (identity id, carried by value)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Purpose tag
    #[serde(rename = "type")]
    pub purpose: TokenPurpose,
}

impl TokenClaims {
    /// Build claims for a subject with explicit issuance and expiry instants.
    pub fn new(
        subject: impl ToString,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        purpose: TokenPurpose,
    ) -> Self {
        Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            purpose,
        }
    }

    /// Expiry instant as a UTC timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
