//! Error types for jobq.

use uuid::Uuid;

/// Top-level error type for the queue service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Job error: {0}")]
    Job(#[from] JobError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Broker transport errors.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Broker unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Submission validation errors. Rejected synchronously; no job is created.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("text must not be empty")]
    EmptyText,

    #[error("repeat count must be between 1 and 10, got {given}")]
    RepeatOutOfRange { given: u32 },
}

/// Job lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Job {id} not found")]
    NotFound { id: Uuid },
}

/// Failures raised by task handlers during execution. Captured by the
/// worker loop as a terminal Failure snapshot, never re-raised.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("division by zero")]
    DivisionByZero,
}

/// Result type alias for the queue service.
pub type Result<T> = std::result::Result<T, Error>;
