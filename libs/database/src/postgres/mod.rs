//! PostgreSQL connector built on SeaORM.

mod config;
mod connector;

pub use config::PostgresConfig;
pub use connector::{connect, connect_from_config, run_migrations};

pub use sea_orm::DatabaseConnection;
