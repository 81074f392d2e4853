//! Error types for the collaboration client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The room has reached its connection limit
    #[error("Room '{0}' is full")]
    RoomFull(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Unparseable prompt input
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}
