// Error handling framework

use thiserror::Error;

/// Object storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid storage credentials: {0}")]
    Credentials(String),

    #[error("Failed to create bucket handle for '{bucket}': {reason}")]
    BucketHandle { bucket: String, reason: String },

    #[error("Failed to list objects in '{bucket}' with prefix '{prefix}': {reason}")]
    ListFailed {
        bucket: String,
        prefix: String,
        reason: String,
    },

    #[error("Health check failed: {0}")]
    HealthCheck(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Message bus errors
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Failed to connect to queue: {0}")]
    Connection(String),

    #[error("Failed to create stream: {0}")]
    StreamCreation(String),

    #[error("Failed to create consumer: {0}")]
    ConsumerCreation(String),

    #[error("Failed to receive message: {0}")]
    ReceiveFailed(String),

    #[error("Failed to acknowledge message: {0}")]
    AckFailed(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
