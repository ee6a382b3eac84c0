pub mod errors;
pub mod models;
pub mod ports;
pub mod service;

pub use errors::TokenError;
pub use models::AuthTokens;
pub use models::IssuedToken;
pub use models::TokenLifetimes;
pub use models::TokenRecord;
pub use ports::TokenRepository;
pub use service::TokenService;
