//! SMTP mailer implementation using lettre.
//!
//! Defaults target MailHog/Mailpit-style local SMTP servers; production
//! servers are reached by enabling TLS and credentials via environment.

use crate::error::{NotificationError, NotificationResult};
use crate::mailer::Mailer;
use async_trait::async_trait;
use core_config::env_or_default;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

/// SMTP configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server host.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// Sender email address.
    pub from_email: String,
    /// Sender name.
    pub from_name: String,
    /// SMTP username (optional for dev servers like Mailpit).
    pub username: Option<String>,
    /// SMTP password (optional for dev servers like Mailpit).
    pub password: Option<String>,
    /// Whether to use TLS (false for local dev servers).
    pub use_tls: bool,
}

impl SmtpConfig {
    /// Create a new SMTP configuration.
    pub fn new(host: String, port: u16, from_email: String, from_name: String) -> Self {
        Self {
            host,
            port,
            from_email,
            from_name,
            username: None,
            password: None,
            use_tls: false,
        }
    }

    /// Load configuration from `SMTP_*` environment variables, with
    /// MailHog/Mailpit-friendly defaults.
    pub fn from_env() -> Self {
        Self {
            host: env_or_default("SMTP_HOST", "localhost"),
            port: env_or_default("SMTP_PORT", "1025").parse().unwrap_or(1025),
            from_email: env_or_default("SMTP_FROM_EMAIL", "noreply@localhost"),
            from_name: env_or_default("SMTP_FROM_NAME", "Accounts"),
            username: std::env::var("SMTP_USERNAME").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
            use_tls: std::env::var("SMTP_USE_TLS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Builder method to set TLS.
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Builder method to set credentials.
    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }
}

/// SMTP mailer.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: SmtpConfig,
}

impl SmtpMailer {
    /// Create a new SMTP mailer.
    pub fn new(config: SmtpConfig) -> NotificationResult<Self> {
        let transport = Self::build_transport(&config)?;
        Ok(Self { transport, config })
    }

    /// Create a mailer configured from `SMTP_*` environment variables.
    pub fn from_env() -> NotificationResult<Self> {
        Self::new(SmtpConfig::from_env())
    }

    fn build_transport(
        config: &SmtpConfig,
    ) -> NotificationResult<AsyncSmtpTransport<Tokio1Executor>> {
        let transport = if config.use_tls {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| {
                    NotificationError::Transport(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(config.port);

            if let (Some(username), Some(password)) = (&config.username, &config.password) {
                builder =
                    builder.credentials(Credentials::new(username.clone(), password.clone()));
            }

            builder.build()
        } else {
            // Plaintext transport for local dev servers
            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                    .port(config.port);

            if let (Some(username), Some(password)) = (&config.username, &config.password) {
                builder =
                    builder.credentials(Credentials::new(username.clone(), password.clone()));
            }

            builder.build()
        };

        Ok(transport)
    }

    fn from_mailbox(&self) -> NotificationResult<Mailbox> {
        format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| {
                NotificationError::InvalidAddress(format!(
                    "Invalid sender address '{}': {}",
                    self.config.from_email, e
                ))
            })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> NotificationResult<()> {
        let to_mailbox: Mailbox = to.parse().map_err(|e| {
            NotificationError::InvalidAddress(format!("Invalid recipient '{}': {}", to, e))
        })?;

        let message = Message::builder()
            .from(self.from_mailbox()?)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotificationError::MessageBuild(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        debug!(to = %to, subject = %subject, "Sent email via SMTP");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
