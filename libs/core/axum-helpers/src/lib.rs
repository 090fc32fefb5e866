//! # Axum Helpers
//!
//! Shared utilities for building Axum services in this workspace.
//!
//! ## Modules
//!
//! - **[`errors`]**: structured error response body with error codes
//! - **[`extractors`]**: custom extractors (validated JSON)
//! - **[`server`]**: server startup, health endpoint, graceful shutdown

pub mod errors;
pub mod extractors;
pub mod server;

pub use errors::ErrorResponse;
pub use extractors::ValidatedJson;
pub use server::{create_app, health_router, shutdown_signal, HealthResponse};
