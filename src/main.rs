//! Serve a directory over HTTP.
//!
//! Usage: `microserve [CONFIG.json]`. Without a configuration file the
//! server listens on 127.0.0.1:9000 and serves `./www`.

use log::{error, info};
use microserve::{HttpServer, ServerConfig, ServerError};
use tokio::signal;

async fn run() -> Result<(), ServerError> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    info!("Serving files from {}", config.root.display());

    let server = HttpServer::bind(config).await?;
    let stop = server.stop_handle();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating graceful shutdown");
                stop.stop();
            }
            Err(e) => {
                error!("Error setting up Ctrl+C handler: {e}");
            }
        }
    });

    server.start().await
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}
