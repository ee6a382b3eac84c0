pub mod errors;
pub mod models;
pub mod ports;

pub use errors::IdentityError;
pub use models::EmailAddress;
pub use models::Identity;
pub use models::IdentityId;
pub use ports::IdentityRepository;
