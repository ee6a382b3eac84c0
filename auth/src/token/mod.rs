pub mod claims;
pub mod codec;
pub mod errors;
pub mod purpose;

pub use claims::TokenClaims;
pub use codec::TokenCodec;
pub use errors::TokenCodecError;
pub use purpose::TokenPurpose;
