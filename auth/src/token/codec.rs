use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::TokenClaims;
use super::errors::TokenCodecError;

/// Encodes and decodes signed token strings.
///
/// Uses HS256 (HMAC with SHA-256) with one process-wide signing key injected
/// at construction; key rotation is out of scope. The signature covers all
/// claim fields, and decoding verifies the signature before any claim
/// (purpose, expiry) is trusted.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a codec from a signing key.
    ///
    /// The key should be at least 256 bits (32 bytes) for HS256 and come
    /// from configuration, never from code.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a signed, URL-safe token string.
    ///
    /// # Errors
    /// * `EncodingFailed` - Serialization or signing failed
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, TokenCodecError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenCodecError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a token string.
    ///
    /// Signature verification happens before expiry validation; a tampered
    /// token fails `InvalidSignature` regardless of its claimed expiry.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not verify against the key
    /// * `Expired` - Current time is past the `exp` claim
    /// * `Malformed` - String cannot be parsed as a token
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenCodecError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenCodecError::Expired,
                    ErrorKind::InvalidSignature => TokenCodecError::InvalidSignature,
                    _ => TokenCodecError::Malformed(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::Utc;

    use super::*;
    use crate::token::purpose::TokenPurpose;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn claims(purpose: TokenPurpose, lifetime: Duration) -> TokenClaims {
        let now = Utc::now();
        TokenClaims::new("user123", now, now + lifetime, purpose)
    }

    #[test]
    fn test_encode_and_decode() {
        let codec = TokenCodec::new(SECRET);
        let claims = claims(TokenPurpose::Refresh, Duration::days(30));

        let token = codec.encode(&claims).expect("Failed to encode token");
        assert_eq!(token.matches('.').count(), 2);

        let decoded = codec.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        let codec = TokenCodec::new(SECRET);

        let result = codec.decode("not.a.token");
        assert!(matches!(result, Err(TokenCodecError::Malformed(_))));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let codec = TokenCodec::new(SECRET);
        let other = TokenCodec::new(b"another_secret_at_least_32_bytes!!");

        let token = codec
            .encode(&claims(TokenPurpose::Access, Duration::minutes(30)))
            .unwrap();

        let result = other.decode(&token);
        assert!(matches!(result, Err(TokenCodecError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let codec = TokenCodec::new(SECRET);
        let token = codec
            .encode(&claims(TokenPurpose::Access, Duration::minutes(30)))
            .unwrap();

        // Flip the last character of the signature segment
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        let result = codec.decode(&tampered);
        assert!(matches!(result, Err(TokenCodecError::InvalidSignature)));
    }

    #[test]
    fn test_expired_token() {
        let codec = TokenCodec::new(SECRET);
        let now = Utc::now();
        let expired = TokenClaims::new(
            "user123",
            now - Duration::hours(2),
            now - Duration::hours(1),
            TokenPurpose::Access,
        );

        let token = codec.encode(&expired).unwrap();
        let result = codec.decode(&token);
        assert!(matches!(result, Err(TokenCodecError::Expired)));
    }
}
