pub mod errors;
pub mod models;
pub mod ports;
pub mod service;

pub use errors::AuthError;
pub use errors::DeliveryError;
pub use models::RegisterCommand;
pub use ports::Notifier;
pub use service::AuthService;
