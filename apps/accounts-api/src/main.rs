//! Accounts API - registration, email verification, and admin console

use axum_helpers::{create_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres;
use domain_accounts::{handlers, InMemorySessionStore, PostgresUserRepository, UserService};
use domain_notifications::SmtpMailer;
use migration::Migrator;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

mod config;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to PostgreSQL");
    let db = postgres::connect_from_config(config.postgres.clone()).await?;
    postgres::run_migrations::<Migrator>(&db).await?;

    let mailer = Arc::new(SmtpMailer::new(config.smtp.clone())?);
    let repository = PostgresUserRepository::new(db);
    let service = UserService::new(repository, mailer, config.base_url.clone());

    // Session cookies carry the Secure attribute whenever the public
    // URL is served over HTTPS
    let secure_cookies = config.environment.use_https();

    let router = handlers::router(service, InMemorySessionStore::new(), secure_cookies)
        .merge(health_router(
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        ))
        .layer(TraceLayer::new_for_http());

    info!(
        environment = %config.environment,
        "Starting Accounts API on {}",
        config.server.address()
    );
    create_app(router, &config.server).await?;

    info!("Accounts API shutdown complete");
    Ok(())
}
