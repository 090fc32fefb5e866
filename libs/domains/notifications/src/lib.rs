//! Notifications Domain
//!
//! Email dispatch for the accounts service. The [`Mailer`] trait is the
//! boundary the rest of the workspace depends on; sending is best-effort and
//! callers treat failures as non-fatal.
//!
//! Implementations:
//! - [`SmtpMailer`]: async SMTP via lettre (Mailpit-style defaults for dev)
//! - [`MemoryMailer`]: in-process outbox for development and tests

pub mod error;
pub mod mailer;
pub mod messages;
mod memory;
mod smtp;

pub use error::{NotificationError, NotificationResult};
pub use mailer::Mailer;
pub use memory::{MemoryMailer, OutboxEmail};
pub use smtp::{SmtpConfig, SmtpMailer};
