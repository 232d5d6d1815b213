//! Per-connection request handling.
//!
//! Each connection carries exactly one request through these steps:
//!
//! 1. parse the request head (any failure ends in the fixed 400 response)
//! 2. answer `Expect: 100-continue` with the interim response
//! 3. drain `Content-Length` bytes of body so the stream stays aligned
//! 4. dispatch: non-GET methods get the fixed 405 response, GET goes to
//!    the [`Handler`]
//! 5. shut the connection down
//!
//! Errors from any step are caught here. The routine never returns an
//! error to the accept loop.

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::parser::{Method, Request};
use crate::server::error::Error;
use crate::server::handler::Handler;
use crate::server::response::{BAD_REQUEST, CONTINUE, METHOD_NOT_ALLOWED};

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The handler produced a response.
    Served,
    /// The request used a method other than GET and got a 405.
    MethodNotAllowed,
    /// Handling failed and the fixed 400 response was sent.
    BadRequest,
    /// The socket failed and nothing more could be written.
    Dropped,
}

/// Handle one request on `socket`, then shut the socket down.
pub async fn handle_connection<S>(socket: S, handler: &dyn Handler, max_head_size: usize) -> Outcome
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let mut stream = BufReader::new(socket);

    let outcome = match process(&mut stream, handler, max_head_size).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_disconnect() => {
            warn!("Connection lost: {e}");
            Outcome::Dropped
        }
        Err(e) => {
            warn!("Failed to handle request: {e}");
            match stream.write_all(BAD_REQUEST).await {
                Ok(()) => Outcome::BadRequest,
                Err(e) => {
                    debug!("Could not send 400 response: {e}");
                    Outcome::Dropped
                }
            }
        }
    };

    if let Err(e) = stream.shutdown().await {
        debug!("Error shutting down connection: {e}");
    }
    outcome
}

async fn process<S>(
    stream: &mut BufReader<S>,
    handler: &dyn Handler,
    max_head_size: usize,
) -> Result<Outcome, Error>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let request = Request::parse_with_limit(&mut *stream, max_head_size).await?;
    debug!("{} {} {}", request.method, request.path, request.http_version);

    if request.expects_continue() {
        stream.write_all(CONTINUE).await?;
        stream.flush().await?;
    }

    let drained = tokio::io::copy(&mut request.body(&mut *stream), &mut tokio::io::sink()).await?;
    if drained > 0 {
        debug!("Discarded {drained} byte request body");
    }

    if request.method != Method::GET {
        stream.write_all(METHOD_NOT_ALLOWED).await?;
        return Ok(Outcome::MethodNotAllowed);
    }

    handler.serve(&request.path, &mut *stream).await?;
    Ok(Outcome::Served)
}
