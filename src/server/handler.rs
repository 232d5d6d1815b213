//! Request handlers: the file-serving side of the server.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;

use log::{debug, warn};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::server::error::Error;
use crate::server::mime;
use crate::server::response::{Response, StatusCode, NOT_FOUND};

/// Type alias for the boxed future returned by [`Handler::serve`].
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;

/// The socket a handler writes its response to.
pub type Socket<'a> = dyn AsyncWrite + Unpin + Send + 'a;

/// Something that answers GET requests.
///
/// A handler writes a complete response for `path` to `socket`. Errors it
/// returns are treated as a failed request by the connection handler.
pub trait Handler: Send + Sync + 'static {
    fn serve<'a>(&'a self, path: &'a str, socket: &'a mut Socket<'a>) -> HandlerFuture<'a>;
}

/// Serves files from a document root.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index: String,
}

impl StaticFiles {
    /// Serve files below `root`, answering `/` with `index`.
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index: index.into(),
        }
    }

    /// The directory files are served from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path to a file below the root.
    ///
    /// Query string and fragment are ignored, and a trailing `/` selects
    /// the index document. Returns `None` if a `..` segment would climb
    /// out of the root; nothing is looked up on disk.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let path = path.split(['?', '#']).next().unwrap_or_default();

        let mut segments: Vec<&str> = Vec::new();
        for component in Path::new(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_str()?),
                Component::ParentDir => {
                    segments.pop()?;
                }
                Component::CurDir => {}
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        if path.is_empty() || path.ends_with('/') {
            segments.push(&self.index);
        }

        let mut resolved = self.root.clone();
        resolved.extend(segments);
        Some(resolved)
    }

    async fn open(path: &Path) -> std::io::Result<Option<File>> {
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if !file.metadata().await?.is_file() {
            return Ok(None);
        }
        Ok(Some(file))
    }

    async fn serve_file<'a>(&'a self, path: &'a str, socket: &'a mut Socket<'a>) -> Result<(), Error> {
        let Some(resolved) = self.resolve(path) else {
            warn!("Rejected path outside the document root: {path}");
            socket.write_all(NOT_FOUND).await?;
            return Ok(());
        };

        let file = match Self::open(&resolved).await {
            Ok(Some(file)) => file,
            Ok(None) => {
                debug!("No file at {}", resolved.display());
                socket.write_all(NOT_FOUND).await?;
                return Ok(());
            }
            Err(e) => {
                warn!("Failed to open {}: {e}", resolved.display());
                socket.write_all(NOT_FOUND).await?;
                return Ok(());
            }
        };

        let content_type = mime::content_type(&resolved);
        debug!("Serving {} as {content_type}", resolved.display());
        Response::new(StatusCode::Ok)
            .with_content_type(content_type)
            .with_file(file)
            .send(socket)
            .await
    }
}

impl Handler for StaticFiles {
    fn serve<'a>(&'a self, path: &'a str, socket: &'a mut Socket<'a>) -> HandlerFuture<'a> {
        Box::pin(self.serve_file(path, socket))
    }
}
