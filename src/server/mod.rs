//! HTTP server implementation for microserve.
//!
//! This module turns parsed requests into responses: the connection state
//! machine, the response serializer, the static file handler and the
//! listening server that ties them together.

mod config;
mod connection;
mod error;
mod handler;
mod http_server;
mod mime;
mod response;
mod tests;

// Re-export public items
pub use config::ServerConfig;
pub use connection::{handle_connection, Outcome};
pub use error::Error;
pub use handler::{Handler, HandlerFuture, Socket, StaticFiles};
pub use http_server::{HttpServer, StopHandle};
pub use mime::{content_type, DEFAULT_MIME_TYPE};
pub use response::{Body, Response, StatusCode, BAD_REQUEST, CONTINUE, METHOD_NOT_ALLOWED, NOT_FOUND};
