//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, error, info};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::server::config::ServerConfig;
use crate::server::connection::handle_connection;
use crate::server::error::Error;
use crate::server::handler::{Handler, StaticFiles};

/// An HTTP server that owns its listening socket.
///
/// Every accepted connection is handled in its own task. At most
/// `max_connections` tasks run at once; beyond that the accept loop waits
/// for a slot.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    handler: Arc<dyn Handler>,
    listener: TcpListener,
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Requests shutdown of a running [`HttpServer`].
#[derive(Clone)]
pub struct StopHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl StopHandle {
    /// Ask the server to stop accepting connections.
    pub fn stop(&self) {
        // A full channel means a stop is already pending.
        let _ = self.shutdown_tx.try_send(());
    }
}

impl HttpServer {
    /// Bind to `config.addr` and serve files from `config.root`.
    pub async fn bind(config: ServerConfig) -> Result<Self, Error> {
        let handler = StaticFiles::new(config.root.clone(), config.index.clone());
        Self::bind_with_handler(config, handler).await
    }

    /// Bind to `config.addr` and answer GET requests with `handler`.
    pub async fn bind_with_handler(config: ServerConfig, handler: impl Handler) -> Result<Self, Error> {
        config.validate()?;
        let listener = TcpListener::bind(config.addr).await?;
        Ok(Self::from_listener(listener, config, handler))
    }

    /// Use an already bound listener.
    pub fn from_listener(listener: TcpListener, config: ServerConfig, handler: impl Handler) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        Self {
            config,
            handler: Arc::new(handler),
            listener,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// A handle that stops this server once it is running.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shutdown_tx: self.shutdown_tx.clone(),
        }
    }

    /// Handle accept errors. The listener stays up; wait a bit before retrying.
    async fn handle_accept_error(e: std::io::Error) {
        error!("Error accepting connection: {e}");
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>, timeout: std::time::Duration) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let drained = tokio::time::timeout(timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await;

        if drained.is_err() {
            info!("Shutdown timeout reached, aborting {len} connections", len = tasks.len());
            tasks.shutdown().await;
        }
        info!("Server shutdown complete");
    }

    /// Accept and handle connections until [`StopHandle::stop`] is called.
    pub async fn start(mut self) -> Result<(), Error> {
        self.config.validate()?;
        let addr = self.local_addr()?;
        info!("Server listening on http://{addr}");
        info!("Serving requests with up to {} concurrent connections", self.config.max_connections);

        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let mut tasks = JoinSet::new();

        loop {
            let permit = tokio::select! {
                _ = self.shutdown_rx.recv() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let (socket, peer) = tokio::select! {
                _ = self.shutdown_rx.recv() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        Self::handle_accept_error(e).await;
                        continue;
                    }
                },
            };

            info!("New connection from {peer}");
            let handler = self.handler.clone();
            let max_head_size = self.config.max_head_size;
            tasks.spawn(async move {
                // The permit is dropped when the task completes, releasing the slot
                let _permit = permit;
                let outcome = handle_connection(socket, handler.as_ref(), max_head_size).await;
                debug!("Connection from {peer} closed: {outcome:?}");
            });

            while let Some(res) = tasks.try_join_next() {
                if let Err(e) = res {
                    error!("Connection task failed: {e}");
                }
            }
        }

        info!("Shutting down server...");
        Self::perform_shutdown(&mut tasks, self.config.shutdown_timeout()).await;
        Ok(())
    }
}
