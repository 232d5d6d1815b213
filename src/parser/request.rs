//! HTTP request parsing and representation.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, Take};

use crate::parser::error::Error;
use crate::parser::headers::Headers;
use crate::parser::method::Method;

/// Default upper bound on the size of a request head, in bytes.
pub const DEFAULT_MAX_HEAD_SIZE: usize = 8192;

/// A parsed HTTP request head.
///
/// The body is not part of the value. It stays in the stream the request was
/// parsed from, positioned right after the blank line, and is read on demand
/// through [`Request::body`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request-target, exactly as sent
    pub path: String,
    /// The HTTP version token, e.g. `HTTP/1.1`
    pub http_version: String,
    /// The HTTP headers
    pub headers: Headers,
}

impl Request {
    /// Parse one request head from `stream` using [`DEFAULT_MAX_HEAD_SIZE`].
    pub async fn parse<R>(stream: &mut R) -> Result<Self, Error>
    where
        R: AsyncBufRead + Unpin,
    {
        Self::parse_with_limit(stream, DEFAULT_MAX_HEAD_SIZE).await
    }

    /// Parse one request head from `stream`, reading at most `max_head_size`
    /// bytes.
    ///
    /// Reads the request line, then header lines up to and including the
    /// blank line. Nothing past the blank line is consumed.
    ///
    /// # Errors
    ///
    /// * [`Error::MalformedRequestLine`] if the request line is not three
    ///   non-empty tokens separated by single spaces
    /// * [`Error::InvalidHeaderFormat`] if a header line lacks `": "`
    /// * [`Error::UnexpectedEof`] if the stream ends before the blank line
    /// * [`Error::HeadTooLarge`] if the head does not fit in `max_head_size`
    /// * [`Error::Io`] if reading from the stream fails
    pub async fn parse_with_limit<R>(stream: &mut R, max_head_size: usize) -> Result<Self, Error>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut remaining = max_head_size;

        let request_line = read_line(stream, &mut remaining, max_head_size).await?;
        let (method, path, http_version) = parse_request_line(&request_line)?;

        let mut headers = Headers::new();
        loop {
            let line = read_line(stream, &mut remaining, max_head_size).await?;
            if line.is_empty() {
                break;
            }
            let (name, value) = parse_header_line(&line)?;
            headers.add(name, value);
        }

        Ok(Self {
            method,
            path,
            http_version,
            headers,
        })
    }

    /// The declared body length. A missing or unparseable `Content-Length`
    /// counts as zero.
    pub fn content_length(&self) -> u64 {
        self.headers
            .get("content-length")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Whether the client asked for a `100 Continue` interim response.
    pub fn expects_continue(&self) -> bool {
        self.headers
            .get_or("expect", "")
            .to_ascii_lowercase()
            .contains("100-continue")
    }

    /// A reader over the request body: the next [`Request::content_length`]
    /// bytes of the stream this request was parsed from.
    pub fn body<'a, R>(&self, stream: &'a mut R) -> Take<&'a mut R>
    where
        R: AsyncRead + Unpin,
    {
        stream.take(self.content_length())
    }
}

/// Read one line, without its terminator, charging it against `remaining`.
async fn read_line<R>(stream: &mut R, remaining: &mut usize, limit: usize) -> Result<String, Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *stream)
        .take(*remaining as u64)
        .read_until(b'\n', &mut buf)
        .await?;

    if buf.last() != Some(&b'\n') {
        return Err(if n >= *remaining {
            Error::HeadTooLarge(limit)
        } else {
            Error::UnexpectedEof
        });
    }
    *remaining -= n;

    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    String::from_utf8(buf).map_err(|_| Error::InvalidEncoding)
}

fn parse_request_line(line: &str) -> Result<(Method, String, String), Error> {
    let parts: Vec<&str> = line.split(' ').collect();
    match parts.as_slice() {
        [method, path, version]
            if !method.is_empty() && !path.is_empty() && !version.is_empty() =>
        {
            Ok((Method::from(*method), path.to_string(), version.to_string()))
        }
        _ => Err(Error::MalformedRequestLine(line.to_string())),
    }
}

fn parse_header_line(line: &str) -> Result<(&str, &str), Error> {
    match line.split_once(": ") {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => Err(Error::InvalidHeaderFormat(line.to_string())),
    }
}
