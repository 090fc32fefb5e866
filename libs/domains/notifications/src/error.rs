use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    MessageBuild(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

pub type NotificationResult<T> = Result<T, NotificationError>;
