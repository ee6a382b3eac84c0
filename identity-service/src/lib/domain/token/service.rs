use std::sync::Arc;

use auth::TokenClaims;
use auth::TokenCodec;
use auth::TokenCodecError;
use auth::TokenPurpose;
use chrono::Utc;

use super::errors::TokenError;
use super::models::AuthTokens;
use super::models::IssuedToken;
use super::models::TokenLifetimes;
use super::models::TokenRecord;
use super::ports::TokenRepository;
use crate::domain::identity::models::IdentityId;

/// Token lifecycle manager.
///
/// Orchestrates issuance, verification, and consumption across the four
/// purpose lifecycles. Policy comes from the purpose tag and the configured
/// lifetimes; the codec and store stay mechanism-only.
pub struct TokenService<TR>
where
    TR: TokenRepository,
{
    repository: Arc<TR>,
    codec: TokenCodec,
    lifetimes: TokenLifetimes,
}

impl<TR> TokenService<TR>
where
    TR: TokenRepository,
{
    /// Create a lifecycle manager.
    ///
    /// # Arguments
    /// * `repository` - Token store implementation
    /// * `signing_key` - Process-wide signing key from configuration
    /// * `lifetimes` - Purpose-keyed expiry windows from configuration
    pub fn new(repository: Arc<TR>, signing_key: &[u8], lifetimes: TokenLifetimes) -> Self {
        Self {
            repository,
            codec: TokenCodec::new(signing_key),
            lifetimes,
        }
    }

    /// Issue the access/refresh pair handed out on login.
    ///
    /// Both tokens are generated from the same issuance instant with
    /// independent expiry horizons. Only the refresh token is persisted;
    /// the access token stays stateless.
    ///
    /// # Errors
    /// * `Codec` - Encoding failed
    /// * `DatabaseError` - Persisting the refresh record failed; no tokens
    ///   are returned in that case
    pub async fn issue_auth_tokens(
        &self,
        identity_id: &IdentityId,
    ) -> Result<AuthTokens, TokenError> {
        let now = Utc::now();
        let access_expires = now + self.lifetimes.for_purpose(TokenPurpose::Access);
        let refresh_expires = now + self.lifetimes.for_purpose(TokenPurpose::Refresh);

        let access = self.codec.encode(&TokenClaims::new(
            identity_id,
            now,
            access_expires,
            TokenPurpose::Access,
        ))?;
        let refresh = self.codec.encode(&TokenClaims::new(
            identity_id,
            now,
            refresh_expires,
            TokenPurpose::Refresh,
        ))?;

        // A save failure cancels the whole issuance; the caller never sees
        // a token whose record is not durably stored.
        self.repository
            .save(TokenRecord::new(
                refresh.clone(),
                *identity_id,
                TokenPurpose::Refresh,
                refresh_expires,
            ))
            .await?;

        Ok(AuthTokens {
            access: IssuedToken {
                token: access,
                expires_at: access_expires,
            },
            refresh: IssuedToken {
                token: refresh,
                expires_at: refresh_expires,
            },
        })
    }

    /// Issue one persisted single-purpose token (reset_password or
    /// verify_email) for out-of-band delivery.
    ///
    /// The record is saved before the raw string is returned; a persistence
    /// failure propagates and cancels the issuance.
    ///
    /// # Errors
    /// * `NotPersisted` - Purpose has no store record (access)
    /// * `Codec` - Encoding failed
    /// * `DatabaseError` - Persisting the record failed
    pub async fn issue_single_purpose_token(
        &self,
        identity_id: &IdentityId,
        purpose: TokenPurpose,
    ) -> Result<IssuedToken, TokenError> {
        if !purpose.is_persisted() {
            return Err(TokenError::NotPersisted(purpose));
        }

        let now = Utc::now();
        let expires_at = now + self.lifetimes.for_purpose(purpose);

        let token = self
            .codec
            .encode(&TokenClaims::new(identity_id, now, expires_at, purpose))?;

        self.repository
            .save(TokenRecord::new(
                token.clone(),
                *identity_id,
                purpose,
                expires_at,
            ))
            .await?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a persisted token: signature, expiry, purpose scope, and an
    /// unrevoked store record must all check out.
    ///
    /// A cryptographically valid token whose record was revoked or never
    /// existed (forged) is rejected with `NotFound`.
    ///
    /// # Errors
    /// * `Codec` - Signature invalid, expired, or malformed
    /// * `PurposeMismatch` - Token carries a different purpose tag
    /// * `NotFound` - No active store record
    pub async fn verify_stored_token(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<TokenRecord, TokenError> {
        let claims = self.codec.decode(token)?;
        if claims.purpose != purpose {
            return Err(TokenError::PurposeMismatch {
                expected: purpose,
                actual: claims.purpose,
            });
        }

        let identity_id = IdentityId::from_string(&claims.sub)?;

        let record = self
            .repository
            .find_active(token, purpose, &identity_id)
            .await?
            .ok_or(TokenError::NotFound)?;

        // The store does not filter on expiry; an expired-but-present record
        // is invalid even though the lookup matched.
        if record.is_expired(Utc::now()) {
            return Err(TokenError::Codec(TokenCodecError::Expired));
        }

        Ok(record)
    }

    /// Verify a stateless access token: decode-only, no store lookup, no I/O.
    ///
    /// This is the cheap per-request authentication path.
    ///
    /// # Errors
    /// * `Codec` - Signature invalid, expired, or malformed
    /// * `PurposeMismatch` - Token is not an access token
    /// * `InvalidSubject` - Subject claim is not an identity id
    pub fn verify_stateless_token(&self, token: &str) -> Result<IdentityId, TokenError> {
        let claims = self.codec.decode(token)?;
        if claims.purpose != TokenPurpose::Access {
            return Err(TokenError::PurposeMismatch {
                expected: TokenPurpose::Access,
                actual: claims.purpose,
            });
        }

        Ok(IdentityId::from_string(&claims.sub)?)
    }

    /// Consume a single-use token by revoking its record.
    ///
    /// # Errors
    /// * `NotFound` - Record does not exist
    /// * `DatabaseError` - Storage operation failed
    pub async fn consume(&self, record: &TokenRecord) -> Result<(), TokenError> {
        self.repository.revoke(record).await
    }

    /// Revoke every outstanding refresh token for an identity
    /// ("logout everywhere").
    ///
    /// # Returns
    /// Number of records revoked
    pub async fn revoke_all_refresh_tokens(
        &self,
        identity_id: &IdentityId,
    ) -> Result<u64, TokenError> {
        self.repository
            .revoke_all_for_identity(identity_id, TokenPurpose::Refresh)
            .await
    }
}
