//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur while reading an HTTP request head.
///
/// Every variant except [`Error::Io`] means the client sent something that
/// is not a valid request head; [`Error::Io`] means the socket itself failed.
#[derive(Debug, Error)]
pub enum Error {
    /// The request line does not consist of exactly three non-empty tokens.
    #[error("Malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// A header line is missing the `": "` delimiter.
    #[error("Invalid header line: {0:?}")]
    InvalidHeaderFormat(String),

    /// A line of the request head is not valid UTF-8.
    #[error("Request head is not valid UTF-8")]
    InvalidEncoding,

    /// The stream ended before the blank line terminating the head.
    #[error("Connection closed before the request head was complete")]
    UnexpectedEof,

    /// The request head is larger than the configured limit.
    #[error("Request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    /// Reading from the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error was caused by the bytes the client sent rather
    /// than by the transport.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Error::Io(_))
    }
}
