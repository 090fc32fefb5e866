//! In-memory mailer keeping an outbox of sent messages.

use crate::error::NotificationResult;
use crate::mailer::Mailer;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A message captured by [`MemoryMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mailer that records messages instead of sending them.
///
/// Used in tests to assert on dispatched email, and in development when no
/// SMTP server is available.
#[derive(Debug, Default, Clone)]
pub struct MemoryMailer {
    outbox: Arc<RwLock<Vec<OutboxEmail>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured messages, in send order.
    pub async fn outbox(&self) -> Vec<OutboxEmail> {
        self.outbox.read().await.clone()
    }

    /// Number of captured messages.
    pub async fn len(&self) -> usize {
        self.outbox.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.outbox.read().await.is_empty()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> NotificationResult<()> {
        let mut outbox = self.outbox.write().await;
        outbox.push(OutboxEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });

        debug!(to = %to, subject = %subject, "Captured email in memory outbox");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
