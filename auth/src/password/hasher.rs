use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Credential verifier backed by Argon2id.
///
/// Hashes are emitted in PHC string format, so the algorithm parameters and
/// salt travel with the stored hash. Verification always goes through the
/// Argon2 verifier; hashes are never compared with plain equality.
pub struct PasswordHasher;

impl PasswordHasher {
    /// A syntactically valid hash of no known secret.
    ///
    /// Used to burn a comparable verification when no identity matched the
    /// presented identifier, so a missing account is not distinguishable
    /// from a wrong password by response timing.
    pub const PHANTOM_HASH: &'static str =
        "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext secret for storage.
    ///
    /// Generates a fresh random salt per call. Must be invoked exactly once
    /// per secret-set: on identity creation and on every password change,
    /// never on unrelated saves.
    ///
    /// # Errors
    /// * `HashingFailed` - Argon2 hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a presented secret against a stored hash.
    ///
    /// # Returns
    /// True if the secret matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Stored hash is not a valid PHC string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        let argon2 = Argon2::default();

        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Run a verification against [`Self::PHANTOM_HASH`] and discard the result.
    ///
    /// Call this on the missing-identity path of a login so both branches pay
    /// the same Argon2 cost.
    pub fn verify_phantom(&self, password: &str) {
        let _ = self.verify(password, Self::PHANTOM_HASH);
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "Secret123!";

        let hash = hasher.hash(password).expect("Failed to hash password");

        // Hash is never the plaintext
        assert_ne!(hash, password);
        assert!(hash.starts_with("$argon2"));

        assert!(hasher
            .verify(password, &hash)
            .expect("Failed to verify password"));
        assert!(!hasher
            .verify("WrongPass", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = PasswordHasher::new();

        let first = hasher.hash("Secret123!").unwrap();
        let second = hasher.hash("Secret123!").unwrap();

        // Fresh salt per call, so identical secrets hash differently
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = PasswordHasher::new();
        let result = hasher.verify("password", "invalid_hash");
        assert!(result.is_err());
    }

    #[test]
    fn test_phantom_hash_parses() {
        let hasher = PasswordHasher::new();
        // The phantom hash must be a valid PHC string that matches nothing we use
        let result = hasher.verify("Secret123!", PasswordHasher::PHANTOM_HASH);
        assert!(matches!(result, Ok(false)));
    }
}
