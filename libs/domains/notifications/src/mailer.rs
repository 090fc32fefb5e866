use crate::error::NotificationResult;
use async_trait::async_trait;

/// Trait for email dispatch.
///
/// Callers treat sending as fire-and-forget: a returned error is logged by
/// the caller, never propagated to the end user.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a plain-text email.
    async fn send(&self, to: &str, subject: &str, body: &str) -> NotificationResult<()>;

    /// Mailer name for logging.
    fn name(&self) -> &'static str;
}
