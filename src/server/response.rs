//! HTTP response types and serialization.

use std::fmt;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::parser::Headers;
use crate::server::error::Error;

/// The interim response sent when a client asks for `Expect: 100-continue`.
pub const CONTINUE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

/// Fixed response sent for any request that cannot be handled.
pub const BAD_REQUEST: &[u8] =
    b"HTTP/1.1 400 Bad Request\r\nContent-type: text/plain\r\nContent-length: 11\r\n\r\nBad Request";

/// Fixed response sent when a file is missing or outside the document root.
pub const NOT_FOUND: &[u8] =
    b"HTTP/1.1 404 Not Found\r\nContent-type: text/plain\r\nContent-length: 9\r\n\r\nNot Found";

/// Fixed response sent for every method other than GET.
pub const METHOD_NOT_ALLOWED: &[u8] =
    b"HTTP/1.1 405 Method Not Allowed\r\nContent-type: text/plain\r\nContent-length: 18\r\n\r\nMethod Not Allowed";

/// HTTP status codes used by the server, with their reason phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Continue = 100,
    Ok = 200,
    BadRequest = 400,
    NotFound = 404,
    MethodNotAllowed = 405,
}

impl StatusCode {
    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Continue => "Continue",
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
        }
    }

    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// Formats as the status-line text, e.g. `404 Not Found`.
impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Where a response body comes from.
#[derive(Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    /// In-memory content.
    Content(Vec<u8>),
    /// An open file, streamed at send time.
    File(File),
}

impl Body {
    /// The exact number of bytes this body will produce.
    async fn len(&self) -> Result<u64, Error> {
        Ok(match self {
            Body::Empty => 0,
            Body::Content(bytes) => bytes.len() as u64,
            Body::File(file) => file.metadata().await?.len(),
        })
    }
}

/// An HTTP response, consumed by [`Response::send`].
#[derive(Debug)]
pub struct Response {
    /// The status-line text without the protocol prefix, e.g. `200 OK`
    pub status: String,
    /// The HTTP headers
    pub headers: Headers,
    body: Body,
}

impl Response {
    /// Create a response with an empty body.
    pub fn new(status: impl fmt::Display) -> Self {
        Self {
            status: status.to_string(),
            headers: Headers::new(),
            body: Body::Empty,
        }
    }

    /// Append a header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    /// Replace the header set.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Set the content type.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    /// Use `content` as the body. Content always takes precedence over a file.
    pub fn with_content(self, content: impl Into<String>) -> Self {
        self.with_content_bytes(content.into().into_bytes())
    }

    /// Use raw bytes as the body. Takes precedence over a file.
    pub fn with_content_bytes(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Content(content.into());
        self
    }

    /// Stream `file` as the body, unless content was already supplied.
    pub fn with_file(mut self, file: File) -> Self {
        if !matches!(self.body, Body::Content(_)) {
            self.body = Body::File(file);
        }
        self
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Serialize the status line and headers, appending `Content-Length`
    /// when it was not set explicitly.
    fn head(&self, content_length: u64) -> String {
        let mut head = format!("HTTP/1.1 {}\r\n{}", self.status, self.headers);
        if !self.headers.contains("content-length") {
            head.push_str(&format!("Content-Length: {content_length}\r\n"));
        }
        head.push_str("\r\n");
        head
    }

    /// Write the complete response to `socket`.
    ///
    /// The head and in-memory bodies are written with `write_all`; file
    /// bodies are streamed and capped at the size the file had when the
    /// head was written. Socket failures are returned as-is, nothing is
    /// retried.
    pub async fn send<W>(self, socket: &mut W) -> Result<(), Error>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let content_length = self.body.len().await?;
        socket.write_all(self.head(content_length).as_bytes()).await?;

        match self.body {
            Body::Empty => {}
            Body::Content(bytes) => socket.write_all(&bytes).await?,
            Body::File(file) => {
                let mut reader = file.take(content_length);
                tokio::io::copy(&mut reader, socket).await?;
            }
        }

        socket.flush().await?;
        Ok(())
    }

    /// Serialize the response into a byte vector.
    pub async fn to_bytes(self) -> Result<Vec<u8>, Error> {
        let mut bytes = Vec::new();
        self.send(&mut bytes).await?;
        Ok(bytes)
    }
}
