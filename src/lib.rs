//! A minimal HTTP/1.1 static file server.
//!
//! The request parser reads the request line and headers straight off the
//! socket, one line at a time, and leaves the body in the stream. Responses
//! are serialized by hand with CRLF framing. One request is handled per
//! connection.
//!
//! # Features
//!
//! - Streaming request head parser with a bounded head size
//! - Case-insensitive, multi-value header container
//! - Responses backed by in-memory content or an open file
//! - `Expect: 100-continue` support
//! - Static file serving with document root guarding and MIME lookup
//! - One task per connection with a connection limit and graceful shutdown
//!
//! # Examples
//!
//! ## Parsing a request
//!
//! ```
//! use microserve::Request;
//!
//! # tokio_test_block(async {
//! let mut stream: &[u8] = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let request = Request::parse(&mut stream).await.unwrap();
//!
//! assert_eq!(request.path, "/index.html");
//! assert_eq!(request.headers.get("host"), Some("example.com"));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! ## Building a response
//!
//! ```
//! use microserve::Response;
//!
//! # tokio_test_block(async {
//! let bytes = Response::new("200 OK")
//!     .with_header("content-type", "text/plain")
//!     .with_content("hi")
//!     .to_bytes()
//!     .await
//!     .unwrap();
//!
//! assert_eq!(
//!     bytes,
//!     b"HTTP/1.1 200 OK\r\nContent-type: text/plain\r\nContent-Length: 2\r\n\r\nhi"
//! );
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! ## Running the server
//!
//! ```no_run
//! use microserve::{HttpServer, ServerConfig};
//!
//! # async fn run() -> Result<(), microserve::ServerError> {
//! let server = HttpServer::bind(ServerConfig::default()).await?;
//! let stop = server.stop_handle();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     stop.stop();
//! });
//! server.start().await
//! # }
//! ```

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, Headers, Method, Request};
pub use server::{
    Error as ServerError, Handler, HttpServer, Response, ServerConfig, StaticFiles, StatusCode,
    StopHandle,
};
