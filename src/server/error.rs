//! Error types for the HTTP server.

use std::io::ErrorKind;

use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid server configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON deserialization error while loading configuration.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error shows the peer socket can no longer be written to.
    pub fn is_disconnect(&self) -> bool {
        let io = match self {
            Error::IoError(e) | Error::ParseError(ParserError::Io(e)) => e,
            _ => return false,
        };
        matches!(
            io.kind(),
            ErrorKind::BrokenPipe
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::NotConnected
                | ErrorKind::WriteZero
        )
    }
}
