use std::sync::Arc;

use auth::PasswordHasher;
use auth::TokenPurpose;
use chrono::Utc;

use super::errors::AuthError;
use super::models::RegisterCommand;
use super::ports::Notifier;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::token::models::AuthTokens;
use crate::domain::token::models::IssuedToken;
use crate::domain::token::ports::TokenRepository;
use crate::domain::token::service::TokenService;

/// Credential and token issuance surface consumed by the request layer.
///
/// Orchestrates the identity store, the token lifecycle manager, and the
/// notifier. Every operation is request-scoped; the stores are the only
/// shared mutable state.
pub struct AuthService<IR, TR, N>
where
    IR: IdentityRepository,
    TR: TokenRepository,
    N: Notifier,
{
    identities: Arc<IR>,
    tokens: TokenService<TR>,
    notifier: Arc<N>,
    password_hasher: PasswordHasher,
}

impl<IR, TR, N> AuthService<IR, TR, N>
where
    IR: IdentityRepository,
    TR: TokenRepository,
    N: Notifier,
{
    pub fn new(identities: Arc<IR>, tokens: TokenService<TR>, notifier: Arc<N>) -> Self {
        Self {
            identities,
            tokens,
            notifier,
            password_hasher: PasswordHasher::new(),
        }
    }

    /// Register a new identity and kick off email verification.
    ///
    /// The lookup here is only a fast path for a better error; the storage
    /// uniqueness constraint is the authoritative guard against concurrent
    /// registrations of the same email. The identity is created with
    /// `is_email_verified = false`; a verify-email token is issued and
    /// handed to the notifier. Issuance or delivery failures are logged but
    /// the registration stands.
    ///
    /// # Errors
    /// * `DuplicateIdentity` - A non-deleted identity already owns this email
    /// * `Persistence` - Identity store unavailable
    pub async fn register(&self, command: RegisterCommand) -> Result<Identity, AuthError> {
        if self
            .identities
            .find_by_email(&command.email)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateIdentity);
        }

        // Hash exactly once, before the secret is ever stored
        let password_hash = self
            .password_hasher
            .hash(&command.password)
            .map_err(|e| AuthError::Unknown(format!("Password hashing failed: {}", e)))?;

        let identity = Identity {
            id: IdentityId::new(),
            email: command.email,
            password_hash,
            first_name: command.first_name,
            last_name: command.last_name,
            is_email_verified: false,
            is_deleted: false,
            created_at: Utc::now(),
        };

        let created = self.identities.create(identity).await?;
        tracing::info!(identity_id = %created.id, "Identity registered");

        match self
            .tokens
            .issue_single_purpose_token(&created.id, TokenPurpose::VerifyEmail)
            .await
        {
            Ok(issued) => {
                if let Err(e) = self
                    .notifier
                    .send_verification_email(&created, &issued.token)
                    .await
                {
                    tracing::error!(
                        identity_id = %created.id,
                        error = %e,
                        "Failed to send verification email"
                    );
                }
            }
            Err(e) => {
                // The identity stands; verification can be re-requested
                tracing::error!(
                    identity_id = %created.id,
                    error = %e,
                    "Failed to issue verify-email token"
                );
            }
        }

        Ok(created)
    }

    /// Authenticate by email and password and issue the access/refresh pair.
    ///
    /// Every failure path is the same generic error, and the missing-identity
    /// branch burns a phantom hash verification so it costs the same as a
    /// wrong password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, wrong password, or malformed
    ///   identifier
    /// * `Persistence` - Identity or token store unavailable
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Identity, AuthTokens), AuthError> {
        let email = match EmailAddress::new(email) {
            Ok(email) => email,
            Err(_) => {
                self.password_hasher.verify_phantom(password);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let identity = match self.identities.find_by_email(&email).await? {
            Some(identity) => identity,
            None => {
                self.password_hasher.verify_phantom(password);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let matches = self
            .password_hasher
            .verify(password, &identity.password_hash)
            .map_err(|e| AuthError::Unknown(format!("Password verification failed: {}", e)))?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.tokens.issue_auth_tokens(&identity.id).await?;

        Ok((identity, tokens))
    }

    /// Issue a reset-password token for out-of-band delivery.
    ///
    /// # Errors
    /// * `NotFound` - No non-deleted identity with this email
    /// * `Validation` - Identifier is not an email address
    /// * `Persistence` - Store unavailable
    pub async fn request_password_reset(&self, email: &str) -> Result<IssuedToken, AuthError> {
        let email = EmailAddress::new(email).map_err(|e| AuthError::Validation(e.to_string()))?;

        let identity = self
            .identities
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::NotFound(email.to_string()))?;

        let issued = self
            .tokens
            .issue_single_purpose_token(&identity.id, TokenPurpose::ResetPassword)
            .await?;

        Ok(issued)
    }

    /// Complete a password reset: verify the token, set the new secret,
    /// consume the token, and revoke all outstanding refresh tokens.
    ///
    /// Consumption makes the token single-use; a second call with the same
    /// token fails `InvalidToken`. Revoking refresh tokens ensures a stolen
    /// long-lived credential does not survive the reset.
    ///
    /// # Errors
    /// * `InvalidToken` - Signature, expiry, revocation, or lookup failure
    /// * `Persistence` - Store unavailable
    pub async fn complete_password_reset(
        &self,
        raw_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let record = self
            .tokens
            .verify_stored_token(raw_token, TokenPurpose::ResetPassword)
            .await?;

        let mut identity = self
            .identities
            .find_by_id(&record.identity_id)
            .await?
            .filter(|identity| !identity.is_deleted)
            .ok_or(AuthError::InvalidToken)?;

        identity.password_hash = self
            .password_hasher
            .hash(new_password)
            .map_err(|e| AuthError::Unknown(format!("Password hashing failed: {}", e)))?;
        self.identities.update(identity).await?;

        self.tokens.consume(&record).await?;

        let revoked = self.tokens.revoke_all_refresh_tokens(&record.identity_id).await?;
        tracing::info!(
            identity_id = %record.identity_id,
            revoked_refresh_tokens = revoked,
            "Password reset completed"
        );

        Ok(())
    }

    /// Complete email verification: verify the token, flag the identity as
    /// verified, and consume the token.
    ///
    /// # Errors
    /// * `InvalidToken` - Signature, expiry, revocation, or lookup failure
    /// * `Persistence` - Store unavailable
    pub async fn complete_email_verification(&self, raw_token: &str) -> Result<(), AuthError> {
        let record = self
            .tokens
            .verify_stored_token(raw_token, TokenPurpose::VerifyEmail)
            .await?;

        let mut identity = self
            .identities
            .find_by_id(&record.identity_id)
            .await?
            .filter(|identity| !identity.is_deleted)
            .ok_or(AuthError::InvalidToken)?;

        identity.is_email_verified = true;
        self.identities.update(identity).await?;

        self.tokens.consume(&record).await?;
        tracing::info!(identity_id = %record.identity_id, "Email verified");

        Ok(())
    }

    /// Per-request authentication: decode-only, no I/O.
    ///
    /// # Errors
    /// * `Unauthenticated` - Token invalid, expired, or of the wrong purpose
    pub fn authenticate_request(&self, access_token: &str) -> Result<IdentityId, AuthError> {
        self.tokens.verify_stateless_token(access_token).map_err(|e| {
            tracing::warn!(error = %e, "Access token rejected");
            AuthError::Unauthenticated
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::TokenClaims;
    use auth::TokenCodec;
    use chrono::Duration;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::auth::errors::DeliveryError;
    use crate::domain::identity::errors::IdentityError;
    use crate::domain::token::errors::TokenError;
    use crate::domain::token::models::TokenLifetimes;
    use crate::domain::token::models::TokenRecord;

    const SECRET: &[u8] = b"test_signing_key_at_least_32_bytes!";

    mock! {
        pub TestIdentityRepository {}

        #[async_trait]
        impl IdentityRepository for TestIdentityRepository {
            async fn create(&self, identity: Identity) -> Result<Identity, IdentityError>;
            async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, IdentityError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Identity>, IdentityError>;
            async fn update(&self, identity: Identity) -> Result<Identity, IdentityError>;
        }
    }

    mock! {
        pub TestTokenRepository {}

        #[async_trait]
        impl TokenRepository for TestTokenRepository {
            async fn save(&self, record: TokenRecord) -> Result<TokenRecord, TokenError>;
            async fn find_active(
                &self,
                token: &str,
                purpose: TokenPurpose,
                identity_id: &IdentityId,
            ) -> Result<Option<TokenRecord>, TokenError>;
            async fn revoke(&self, record: &TokenRecord) -> Result<(), TokenError>;
            async fn revoke_all_for_identity(
                &self,
                identity_id: &IdentityId,
                purpose: TokenPurpose,
            ) -> Result<u64, TokenError>;
        }
    }

    mock! {
        pub TestNotifier {}

        #[async_trait]
        impl Notifier for TestNotifier {
            async fn send_verification_email(
                &self,
                identity: &Identity,
                raw_token: &str,
            ) -> Result<(), DeliveryError>;
        }
    }

    fn service(
        identities: MockTestIdentityRepository,
        tokens: MockTestTokenRepository,
        notifier: MockTestNotifier,
    ) -> AuthService<MockTestIdentityRepository, MockTestTokenRepository, MockTestNotifier> {
        AuthService::new(
            Arc::new(identities),
            TokenService::new(Arc::new(tokens), SECRET, TokenLifetimes::new(30, 30, 10, 10)),
            Arc::new(notifier),
        )
    }

    fn existing_identity(email: &str, password: &str) -> Identity {
        Identity {
            id: IdentityId::new(),
            email: EmailAddress::new(email).unwrap(),
            password_hash: PasswordHasher::new().hash(password).unwrap(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            is_email_verified: true,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    fn register_command(email: &str) -> RegisterCommand {
        RegisterCommand::new(
            EmailAddress::new(email).unwrap(),
            "Secret123!".to_string(),
            "A".to_string(),
            "B".to_string(),
        )
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut identities = MockTestIdentityRepository::new();
        let mut tokens = MockTestTokenRepository::new();
        let mut notifier = MockTestNotifier::new();

        identities
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        identities
            .expect_create()
            .withf(|identity| {
                identity.email.as_str() == "a@x.com"
                    && !identity.is_email_verified
                    && !identity.is_deleted
                    && identity.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(Ok);
        tokens
            .expect_save()
            .withf(|record| record.purpose == TokenPurpose::VerifyEmail)
            .times(1)
            .returning(Ok);
        notifier
            .expect_send_verification_email()
            .withf(|_, raw_token| !raw_token.is_empty())
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(identities, tokens, notifier);
        let identity = service.register(register_command("a@x.com")).await.unwrap();
        assert!(!identity.is_email_verified);
    }

    #[tokio::test]
    async fn test_register_duplicate_fast_path() {
        let mut identities = MockTestIdentityRepository::new();
        let tokens = MockTestTokenRepository::new();
        let notifier = MockTestNotifier::new();

        identities
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(existing_identity("a@x.com", "Secret123!"))));
        identities.expect_create().times(0);

        let service = service(identities, tokens, notifier);
        let result = service.register(register_command("a@x.com")).await;
        assert!(matches!(result, Err(AuthError::DuplicateIdentity)));
    }

    #[tokio::test]
    async fn test_register_duplicate_lost_race() {
        // Two concurrent registrations: this one passed the fast-path check
        // but the storage constraint rejected the insert
        let mut identities = MockTestIdentityRepository::new();
        let tokens = MockTestTokenRepository::new();
        let notifier = MockTestNotifier::new();

        identities
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        identities.expect_create().times(1).returning(|identity| {
            Err(IdentityError::EmailAlreadyExists(
                identity.email.as_str().to_string(),
            ))
        });

        let service = service(identities, tokens, notifier);
        let result = service.register(register_command("a@x.com")).await;
        assert!(matches!(result, Err(AuthError::DuplicateIdentity)));
    }

    #[tokio::test]
    async fn test_register_notifier_failure_is_non_fatal() {
        let mut identities = MockTestIdentityRepository::new();
        let mut tokens = MockTestTokenRepository::new();
        let mut notifier = MockTestNotifier::new();

        identities
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        identities.expect_create().times(1).returning(Ok);
        tokens.expect_save().times(1).returning(Ok);
        notifier
            .expect_send_verification_email()
            .times(1)
            .returning(|_, _| Err(DeliveryError("smtp down".to_string())));

        let service = service(identities, tokens, notifier);
        let result = service.register(register_command("a@x.com")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_register_token_issuance_failure_is_non_fatal() {
        let mut identities = MockTestIdentityRepository::new();
        let mut tokens = MockTestTokenRepository::new();
        let mut notifier = MockTestNotifier::new();

        identities
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        identities.expect_create().times(1).returning(Ok);
        tokens
            .expect_save()
            .times(1)
            .returning(|_| Err(TokenError::DatabaseError("store unavailable".to_string())));
        // No token was issued, so no email goes out
        notifier.expect_send_verification_email().times(0);

        let service = service(identities, tokens, notifier);
        let result = service.register(register_command("a@x.com")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_login_success() {
        let identity = existing_identity("a@x.com", "Secret123!");
        let identity_id = identity.id;

        let mut identities = MockTestIdentityRepository::new();
        let mut tokens = MockTestTokenRepository::new();
        let notifier = MockTestNotifier::new();

        let returned = identity.clone();
        identities
            .expect_find_by_email()
            .withf(|email| email.as_str() == "a@x.com")
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        tokens
            .expect_save()
            .withf(|record| record.purpose == TokenPurpose::Refresh)
            .times(1)
            .returning(Ok);

        let service = service(identities, tokens, notifier);
        let (identity, tokens) = service.login("a@x.com", "Secret123!").await.unwrap();
        assert_eq!(identity.id, identity_id);

        // Access token decodes to the identity id with the configured window
        let claims = TokenCodec::new(SECRET).decode(&tokens.access.token).unwrap();
        assert_eq!(claims.sub, identity_id.to_string());
        assert_eq!(claims.purpose, TokenPurpose::Access);
        assert_eq!(claims.exp - claims.iat, 30 * 60);

        let refresh = TokenCodec::new(SECRET).decode(&tokens.refresh.token).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 30 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let identity = existing_identity("a@x.com", "Secret123!");

        let mut identities = MockTestIdentityRepository::new();
        let tokens = MockTestTokenRepository::new();
        let notifier = MockTestNotifier::new();

        identities
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(identity.clone())));

        let service = service(identities, tokens, notifier);
        let result = service.login("a@x.com", "WrongPass").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut identities = MockTestIdentityRepository::new();
        let tokens = MockTestTokenRepository::new();
        let notifier = MockTestNotifier::new();

        identities
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(identities, tokens, notifier);
        let result = service.login("missing@x.com", "Secret123!").await;
        // Same generic error as a wrong password
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_request_password_reset() {
        let identity = existing_identity("a@x.com", "Secret123!");
        let identity_id = identity.id;

        let mut identities = MockTestIdentityRepository::new();
        let mut tokens = MockTestTokenRepository::new();
        let notifier = MockTestNotifier::new();

        identities
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(identity.clone())));
        tokens
            .expect_save()
            .withf(move |record| {
                record.purpose == TokenPurpose::ResetPassword && record.identity_id == identity_id
            })
            .times(1)
            .returning(Ok);

        let service = service(identities, tokens, notifier);
        let issued = service.request_password_reset("a@x.com").await.unwrap();

        let claims = TokenCodec::new(SECRET).decode(&issued.token).unwrap();
        assert_eq!(claims.purpose, TokenPurpose::ResetPassword);
        assert_eq!(claims.sub, identity_id.to_string());
    }

    #[tokio::test]
    async fn test_request_password_reset_unknown_email() {
        let mut identities = MockTestIdentityRepository::new();
        let tokens = MockTestTokenRepository::new();
        let notifier = MockTestNotifier::new();

        identities
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(identities, tokens, notifier);
        let result = service.request_password_reset("missing@x.com").await;
        assert!(matches!(result, Err(AuthError::NotFound(_))));
    }

    fn reset_token_for(identity_id: IdentityId) -> (String, TokenRecord) {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(10);
        let token = TokenCodec::new(SECRET)
            .encode(&TokenClaims::new(
                identity_id,
                now,
                expires_at,
                TokenPurpose::ResetPassword,
            ))
            .unwrap();
        let record = TokenRecord::new(
            token.clone(),
            identity_id,
            TokenPurpose::ResetPassword,
            expires_at,
        );
        (token, record)
    }

    #[tokio::test]
    async fn test_complete_password_reset() {
        let identity = existing_identity("a@x.com", "Secret123!");
        let identity_id = identity.id;
        let (token, record) = reset_token_for(identity_id);

        let mut identities = MockTestIdentityRepository::new();
        let mut tokens = MockTestTokenRepository::new();
        let notifier = MockTestNotifier::new();

        let stored = record.clone();
        tokens
            .expect_find_active()
            .times(1)
            .returning(move |_, _, _| Ok(Some(stored.clone())));
        identities
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(identity.clone())));
        identities
            .expect_update()
            .withf(|identity| {
                // The new secret was hashed before storage
                PasswordHasher::new()
                    .verify("NewPass1!", &identity.password_hash)
                    .unwrap()
            })
            .times(1)
            .returning(Ok);
        let record_id = record.id;
        tokens
            .expect_revoke()
            .withf(move |r| r.id == record_id)
            .times(1)
            .returning(|_| Ok(()));
        tokens
            .expect_revoke_all_for_identity()
            .withf(move |id, purpose| *id == identity_id && *purpose == TokenPurpose::Refresh)
            .times(1)
            .returning(|_, _| Ok(2));

        let service = service(identities, tokens, notifier);
        service
            .complete_password_reset(&token, "NewPass1!")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_complete_password_reset_second_use_rejected() {
        let identity_id = IdentityId::new();
        let (token, _) = reset_token_for(identity_id);

        let mut identities = MockTestIdentityRepository::new();
        let mut tokens = MockTestTokenRepository::new();
        let notifier = MockTestNotifier::new();

        // The record was revoked by the first completion
        tokens
            .expect_find_active()
            .times(1)
            .returning(|_, _, _| Ok(None));
        identities.expect_find_by_id().times(0);

        let service = service(identities, tokens, notifier);
        let result = service.complete_password_reset(&token, "Another1!").await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_complete_email_verification() {
        let mut identity = existing_identity("a@x.com", "Secret123!");
        identity.is_email_verified = false;
        let identity_id = identity.id;

        let now = Utc::now();
        let expires_at = now + Duration::minutes(10);
        let token = TokenCodec::new(SECRET)
            .encode(&TokenClaims::new(
                identity_id,
                now,
                expires_at,
                TokenPurpose::VerifyEmail,
            ))
            .unwrap();
        let record = TokenRecord::new(
            token.clone(),
            identity_id,
            TokenPurpose::VerifyEmail,
            expires_at,
        );

        let mut identities = MockTestIdentityRepository::new();
        let mut tokens = MockTestTokenRepository::new();
        let notifier = MockTestNotifier::new();

        let stored = record.clone();
        tokens
            .expect_find_active()
            .times(1)
            .returning(move |_, _, _| Ok(Some(stored.clone())));
        identities
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(identity.clone())));
        identities
            .expect_update()
            .withf(|identity| identity.is_email_verified)
            .times(1)
            .returning(Ok);
        tokens.expect_revoke().times(1).returning(|_| Ok(()));

        let service = service(identities, tokens, notifier);
        service.complete_email_verification(&token).await.unwrap();
    }

    #[tokio::test]
    async fn test_authenticate_request() {
        let identities = MockTestIdentityRepository::new();
        let tokens = MockTestTokenRepository::new();
        let notifier = MockTestNotifier::new();
        let service = service(identities, tokens, notifier);

        let identity_id = IdentityId::new();
        let now = Utc::now();
        let access = TokenCodec::new(SECRET)
            .encode(&TokenClaims::new(
                identity_id,
                now,
                now + Duration::minutes(30),
                TokenPurpose::Access,
            ))
            .unwrap();
        let refresh = TokenCodec::new(SECRET)
            .encode(&TokenClaims::new(
                identity_id,
                now,
                now + Duration::days(30),
                TokenPurpose::Refresh,
            ))
            .unwrap();

        assert_eq!(service.authenticate_request(&access).unwrap(), identity_id);
        // A refresh token is not usable for request authentication
        assert!(matches!(
            service.authenticate_request(&refresh),
            Err(AuthError::Unauthenticated)
        ));
        assert!(matches!(
            service.authenticate_request("garbage"),
            Err(AuthError::Unauthenticated)
        ));
    }
}
