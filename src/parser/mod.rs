//! HTTP protocol layer.
//!
//! This module reads request heads straight off a byte stream and provides
//! the header container shared by requests and responses.

mod error;
mod headers;
mod method;
mod request;

// Re-export public items
pub use error::Error;
pub use headers::Headers;
pub use method::Method;
pub use request::{Request, DEFAULT_MAX_HEAD_SIZE};
