pub mod config;
pub mod domain;
pub mod outbound;

pub use domain::identity;
pub use domain::token;
pub use outbound::repositories;
