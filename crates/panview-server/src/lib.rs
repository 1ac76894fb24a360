//! HTTP server for panview.
//!
//! Serves pandoc-compiled documents over three routes:
//! - `GET /view/{*name}`: compiled HTML, or the file itself for non-documents
//! - `GET /refresh/{*name}`: `True`/`False` autorefresh answer
//! - `GET /generated/{file}`: rendered diagram images
//!
//! # Quick Start
//!
//! ```ignore
//! use panview_config::Config;
//! use panview_server::{run_server, server_config_from_config};
//! use panview_site::AppContext;
//!
//! let config = Config::load(None, None)?;
//! let context = AppContext::from_config(&config)?;
//! run_server(server_config_from_config(&config), context).await?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (panview-server)
//!                        │
//!                        ├─► /view      ──► AppContext::compile ──► pandoc
//!                        ├─► /refresh   ──► AppContext::is_stale
//!                        └─► /generated ──► DiagramCache image files
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use panview_config::Config;
use panview_site::AppContext;
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Run the server until Ctrl-C, then tear down `context`.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_server(
    config: ServerConfig,
    context: AppContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState { context });
    let app = app::create_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match Arc::try_unwrap(state) {
        Ok(state) => state.context.close()?,
        Err(_) => tracing::warn!("Requests still in flight, leaving cache root in place"),
    }
    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from panview config.
#[must_use]
pub fn server_config_from_config(config: &Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    }
}
