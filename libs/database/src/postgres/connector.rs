use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;

/// Connect to a PostgreSQL database with default pool settings.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    connect_from_config(PostgresConfig::new(database_url)).await
}

/// Connect using a `PostgresConfig`.
///
/// This is the recommended way to connect when using configuration:
///
/// ```ignore
/// let config = PostgresConfig::from_env()?;
/// let db = connect_from_config(config).await?;
/// ```
pub async fn connect_from_config(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.into_connect_options()).await?;

    info!("Successfully connected to PostgreSQL database");

    Ok(db)
}

/// Apply all pending migrations for the given migrator.
pub async fn run_migrations<M: MigratorTrait>(db: &DatabaseConnection) -> Result<(), DbErr> {
    info!("Running database migrations");
    M::up(db, None).await?;
    info!("Database migrations complete");
    Ok(())
}
