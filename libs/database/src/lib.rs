//! Database library providing the PostgreSQL connector used across the
//! workspace.
//!
//! # Example
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config(config).await?;
//! postgres::run_migrations::<Migrator>(&db).await?;
//! ```

pub mod postgres;
