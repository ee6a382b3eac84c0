use auth::TokenPurpose;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::identity::models::IdentityId;

/// Durable record of an issued token requiring persistence
/// (refresh, reset_password, verify_email — never access).
///
/// The token string is stored verbatim, not re-derived. Records are only
/// ever mutated to set `revoked = true`; they are retained past expiry for
/// audit and pruned by the expiry check on read, never hard-deleted.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub id: Uuid,
    pub token: String,
    pub identity_id: IdentityId,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Build a fresh, unrevoked record for a just-encoded token.
    pub fn new(
        token: String,
        identity_id: IdentityId,
        purpose: TokenPurpose,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            token,
            identity_id,
            purpose,
            expires_at,
            revoked: false,
            created_at: Utc::now(),
        }
    }

    /// Whether the record's expiry instant has passed.
    ///
    /// The store does not filter on expiry; callers must apply this check
    /// on top of the `revoked` flag.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A raw token string paired with its expiry instant, for transport to the
/// caller (and, for reset/verify purposes, out-of-band to the user).
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// The paired credentials handed out on login.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Purpose-keyed expiry policy.
///
/// One table drives all four lifecycles instead of four parallel code
/// paths; constructed from configuration at startup.
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    access: Duration,
    refresh: Duration,
    reset_password: Duration,
    verify_email: Duration,
}

impl TokenLifetimes {
    pub fn new(
        access_minutes: i64,
        refresh_days: i64,
        reset_password_minutes: i64,
        verify_email_minutes: i64,
    ) -> Self {
        Self {
            access: Duration::minutes(access_minutes),
            refresh: Duration::days(refresh_days),
            reset_password: Duration::minutes(reset_password_minutes),
            verify_email: Duration::minutes(verify_email_minutes),
        }
    }

    /// Expiry window for a purpose.
    pub fn for_purpose(&self, purpose: TokenPurpose) -> Duration {
        match purpose {
            TokenPurpose::Access => self.access,
            TokenPurpose::Refresh => self.refresh,
            TokenPurpose::ResetPassword => self.reset_password,
            TokenPurpose::VerifyEmail => self.verify_email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetimes_keyed_by_purpose() {
        let lifetimes = TokenLifetimes::new(30, 30, 10, 10);

        assert_eq!(
            lifetimes.for_purpose(TokenPurpose::Access),
            Duration::minutes(30)
        );
        assert_eq!(
            lifetimes.for_purpose(TokenPurpose::Refresh),
            Duration::days(30)
        );
        assert_eq!(
            lifetimes.for_purpose(TokenPurpose::ResetPassword),
            Duration::minutes(10)
        );
        assert_eq!(
            lifetimes.for_purpose(TokenPurpose::VerifyEmail),
            Duration::minutes(10)
        );
    }

    #[test]
    fn test_record_expiry_check() {
        let now = Utc::now();
        let record = TokenRecord::new(
            "raw".to_string(),
            IdentityId::new(),
            TokenPurpose::Refresh,
            now + Duration::days(30),
        );

        assert!(!record.revoked);
        assert!(!record.is_expired(now));
        assert!(record.is_expired(now + Duration::days(31)));
    }
}
