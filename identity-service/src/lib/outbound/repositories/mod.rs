pub mod identity;
pub mod token;

pub use identity::PostgresIdentityRepository;
pub use token::PostgresTokenRepository;
