/// # Dock Queue Errors
/// This module defines the `DockQueueError` enum, which encapsulates all potential errors that can occur within the IQX Dock Queue service.
/// Validation and precondition failures are rejected before any store call; store and connection failures carry the adapter's message.


use thiserror::Error;
use std::io;
use crate::models::QueueStatus;

#[derive(Error, Debug)]
pub enum DockQueueError {
    /// Represents input that failed validation before any store call was made.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Represents a transition attempted from a status whose guard does not allow it.
    #[error("Driver {id} cannot {event} while {status}")]
    InvalidTransition {
        id: String,
        status: QueueStatus,
        event: &'static str,
    },

    /// Represents a lookup for a driver record that does not exist.
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Represents a gate that is unknown or not currently open for assignment.
    #[error("Gate unavailable: {0}")]
    GateUnavailable(String),

    /// Represents a failure reported by the record store.
    #[error("Store error: {0}")]
    StoreError(String),

    /// Represents errors related to reaching the record store or the messaging provider.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Represents errors arising from misconfigurations or invalid settings.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Represents a create whose id is already taken in the table.
    #[error("Duplicate record: {0}")]
    DuplicateRecord(String),

    /// Represents errors that occur during serialization or deserialization of rows.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type DockQueueResult<T> = Result<T, DockQueueError>;

impl DockQueueError {
    /// `true` for failures the caller caused and can fix by re-fetching or correcting input.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DockQueueError::ValidationError(_)
                | DockQueueError::InvalidTransition { .. }
                | DockQueueError::DriverNotFound(_)
                | DockQueueError::GateUnavailable(_)
        )
    }
}

impl From<config::ConfigError> for DockQueueError {
    fn from(err: config::ConfigError) -> Self {
        DockQueueError::ConfigError(err.to_string())
    }
}

impl From<url::ParseError> for DockQueueError {
    fn from(err: url::ParseError) -> Self {
        DockQueueError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for DockQueueError {
    fn from(err: reqwest::Error) -> Self {
        DockQueueError::ConnectionError(err.to_string())
    }
}
