use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::token::models::TokenLifetimes;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Signing key and the four token expiry windows.
///
/// Defaults mirror the deployed configuration: access 30 minutes,
/// refresh 30 days, reset-password and verify-email 10 minutes.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_minutes")]
    pub access_expiration_minutes: i64,
    #[serde(default = "default_refresh_days")]
    pub refresh_expiration_days: i64,
    #[serde(default = "default_reset_password_minutes")]
    pub reset_password_expiration_minutes: i64,
    #[serde(default = "default_verify_email_minutes")]
    pub verify_email_expiration_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    /// Base URL embedded in verification links sent to users.
    pub client_url: String,
}

fn default_access_minutes() -> i64 {
    30
}

fn default_refresh_days() -> i64 {
    30
}

fn default_reset_password_minutes() -> i64 {
    10
}

fn default_verify_email_minutes() -> i64 {
    10
}

impl JwtConfig {
    /// Materialize the purpose-keyed expiry policy from configured durations.
    pub fn token_lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes::new(
            self.access_expiration_minutes,
            self.refresh_expiration_days,
            self.reset_password_expiration_minutes,
            self.verify_email_expiration_minutes,
        )
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
