use async_trait::async_trait;
use auth::TokenPurpose;

use super::errors::TokenError;
use super::models::TokenRecord;
use crate::domain::identity::models::IdentityId;

/// Persistence operations for issued token records (the token store).
#[async_trait]
pub trait TokenRepository: Send + Sync + 'static {
    /// Persist a newly issued token record.
    ///
    /// Not idempotent: duplicate saves create duplicate records, so callers
    /// must not double-issue.
    ///
    /// # Errors
    /// * `DatabaseError` - Storage operation failed
    async fn save(&self, record: TokenRecord) -> Result<TokenRecord, TokenError>;

    /// Look up the unrevoked record for (value, purpose, identity).
    ///
    /// Returns only records with `revoked = false`. Expiry is NOT filtered
    /// here; the caller must check `expires_at` and treat an expired-but-
    /// present record as invalid, distinct from "not found".
    ///
    /// # Errors
    /// * `DatabaseError` - Storage operation failed
    async fn find_active(
        &self,
        token: &str,
        purpose: TokenPurpose,
        identity_id: &IdentityId,
    ) -> Result<Option<TokenRecord>, TokenError>;

    /// Mark a record permanently invalid (blacklisting).
    ///
    /// Used for consumed single-use tokens immediately after successful use.
    ///
    /// # Errors
    /// * `NotFound` - Record does not exist
    /// * `DatabaseError` - Storage operation failed
    async fn revoke(&self, record: &TokenRecord) -> Result<(), TokenError>;

    /// Revoke every active record of one purpose for an identity.
    ///
    /// Backs "logout everywhere": revoking all refresh records invalidates
    /// every outstanding long-lived credential.
    ///
    /// # Returns
    /// Number of records revoked
    ///
    /// # Errors
    /// * `DatabaseError` - Storage operation failed
    async fn revoke_all_for_identity(
        &self,
        identity_id: &IdentityId,
        purpose: TokenPurpose,
    ) -> Result<u64, TokenError>;
}
