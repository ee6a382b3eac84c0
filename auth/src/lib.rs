//! Authentication primitives for the identity service.
//!
//! Provides the two leaf components of the identity and token lifecycle:
//! - Password hashing and verification (Argon2id)
//! - Signed token encoding and decoding (JWT, HS256) with a purpose tag
//!
//! Policy decisions (which purposes are persisted, expiry windows, revocation)
//! live in the service layer; this crate only knows how to hash secrets and
//! how to produce and check tamper-evident token strings.
//!
//! # Examples
//!
//! ## Password hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Signed tokens
//! ```
//! use chrono::{Duration, Utc};
//! use auth::{TokenClaims, TokenCodec, TokenPurpose};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let now = Utc::now();
//! let claims = TokenClaims::new(
//!     "user123",
//!     now,
//!     now + Duration::minutes(30),
//!     TokenPurpose::Access,
//! );
//! let token = codec.encode(&claims).unwrap();
//! let decoded = codec.decode(&token).unwrap();
//! assert_eq!(decoded.purpose, TokenPurpose::Access);
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::TokenClaims;
pub use token::TokenCodec;
pub use token::TokenCodecError;
pub use token::TokenPurpose;
