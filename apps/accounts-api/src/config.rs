//! Configuration for Accounts API

use core_config::{env_or_default, server::ServerConfig, FromEnv};
use database::postgres::PostgresConfig;
use domain_notifications::SmtpConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
    pub smtp: SmtpConfig,
    pub environment: Environment,
    /// Public base URL used in verification links
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let postgres = PostgresConfig::from_env()?;
        let smtp = SmtpConfig::from_env();

        let base_url = env_or_default("BASE_URL", "http://localhost:8080");

        Ok(Self {
            server,
            postgres,
            smtp,
            environment,
            base_url,
        })
    }
}
