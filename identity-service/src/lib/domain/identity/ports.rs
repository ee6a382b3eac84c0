use async_trait::async_trait;

use super::errors::IdentityError;
use super::models::EmailAddress;
use super::models::Identity;
use super::models::IdentityId;

/// Persistence operations for the identity aggregate.
///
/// The storage layer is the single source of truth: every mutation is one
/// atomic write, and identifier uniqueness among non-deleted identities is
/// enforced by a storage constraint, not by callers.
#[async_trait]
pub trait IdentityRepository: Send + Sync + 'static {
    /// Persist a new identity.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - A non-deleted identity already owns this email
    /// * `DatabaseError` - Storage operation failed
    async fn create(&self, identity: Identity) -> Result<Identity, IdentityError>;

    /// Retrieve an identity by id, deleted or not.
    ///
    /// # Errors
    /// * `DatabaseError` - Storage operation failed
    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, IdentityError>;

    /// Retrieve a non-deleted identity by its email identifier.
    ///
    /// Soft-deleted identities are not returned; their email may be reused.
    ///
    /// # Errors
    /// * `DatabaseError` - Storage operation failed
    async fn find_by_email(&self, email: &EmailAddress)
        -> Result<Option<Identity>, IdentityError>;

    /// Write back a mutated identity (profile fields, password hash,
    /// verification flag, soft-delete flag).
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Storage operation failed
    async fn update(&self, identity: Identity) -> Result<Identity, IdentityError>;
}
