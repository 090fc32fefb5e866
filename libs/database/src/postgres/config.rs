use core_config::{env_or_default, env_required, ConfigError, FromEnv};
use sea_orm::ConnectOptions;
use std::time::Duration;
use tracing::log::LevelFilter;

/// PostgreSQL database configuration.
///
/// Holds connection pool settings for PostgreSQL. Construct manually with
/// [`PostgresConfig::new`] or load from environment variables with
/// [`FromEnv::from_env`].
#[derive(Clone, Debug)]
pub struct PostgresConfig {
    /// Database connection URL (required)
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,

    /// Enable SQL query logging
    pub sqlx_logging: bool,
}

impl PostgresConfig {
    /// Create a new PostgresConfig with default pool settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout_secs: 8,
            acquire_timeout_secs: 8,
            sqlx_logging: true,
        }
    }

    /// Convert into SeaORM `ConnectOptions`.
    pub fn into_connect_options(self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url);
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .sqlx_logging(self.sqlx_logging)
            .sqlx_logging_level(LevelFilter::Debug);
        options
    }
}

impl FromEnv for PostgresConfig {
    /// Reads from environment variables:
    /// - `DATABASE_URL` (required)
    /// - `DATABASE_MAX_CONNECTIONS` (default 20)
    /// - `DATABASE_MIN_CONNECTIONS` (default 2)
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_required("DATABASE_URL")?;

        let max_connections = env_or_default("DATABASE_MAX_CONNECTIONS", "20")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "DATABASE_MAX_CONNECTIONS".to_string(),
                details: format!("{}", e),
            })?;

        let min_connections = env_or_default("DATABASE_MIN_CONNECTIONS", "2")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "DATABASE_MIN_CONNECTIONS".to_string(),
                details: format!("{}", e),
            })?;

        let mut config = Self::new(url);
        config.max_connections = max_connections;
        config.min_connections = min_connections;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_requires_url() {
        temp_env::with_var_unset("DATABASE_URL", || {
            assert!(PostgresConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_from_env_with_defaults() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/accounts")),
                ("DATABASE_MAX_CONNECTIONS", None),
                ("DATABASE_MIN_CONNECTIONS", None),
            ],
            || {
                let config = PostgresConfig::from_env().unwrap();
                assert_eq!(config.url, "postgresql://localhost/accounts");
                assert_eq!(config.max_connections, 20);
                assert_eq!(config.min_connections, 2);
            },
        );
    }
}
