//! Accounts Domain
//!
//! User accounts: registration with email-token verification, login,
//! self-service profile editing, password change, and the admin-only
//! user-management operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, session cookie → principal
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business logic, role gate, password hashing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```
//!
//! Every operation takes the authenticated principal (or none) as an
//! explicit argument; there is no ambient request state.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_accounts::{
//!     handlers,
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//!     session::InMemorySessionStore,
//! };
//! use domain_notifications::MemoryMailer;
//!
//! let service = UserService::new(
//!     InMemoryUserRepository::new(),
//!     Arc::new(MemoryMailer::new()),
//!     "http://localhost:8080".to_string(),
//! );
//! let router = handlers::router(service, InMemorySessionStore::new(), false);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres_repository;
pub mod repository;
pub mod service;
pub mod session;

// Re-export commonly used types
pub use error::{AccountError, AccountResult};
pub use models::{
    AdminUpdateUserRequest, ChangePasswordRequest, LoginRequest, Page, RegisterRequest, Role,
    UpdateProfileRequest, User, UserResponse,
};
pub use postgres_repository::PostgresUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::{UserService, PAGE_SIZE};
pub use session::{InMemorySessionStore, SessionStore};
