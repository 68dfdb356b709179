//! Live-reloading development server for QuickPoint presentations.
//!
//! This crate provides an axum HTTP server that serves:
//! - The viewer application's static files from the application root
//! - The operator's presentation directory under `/presentation/`
//! - A change-detection endpoint (`/__mtime`) for live reload
//!
//! Application HTML gets a small polling script injected before `</body>`.
//! The script fetches `/__mtime` and reloads the page once the latest
//! modification time under the presentation root moves forward.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use quickpoint_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         app_root: PathBuf::from("."),
//!         presentation_root: PathBuf::from("/home/me/talk"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (no-cache headers on every response)
//!                        │
//!                        └─► dispatch ──► PathResolver::translate
//!                                │
//!                                ├─► /__mtime ──► directory walk (blocking pool)
//!                                │
//!                                └─► static files ──► live reload injection
//! ```

mod app;
mod error;
mod handlers;
mod listing;
mod live_reload;
mod middleware;
mod resolve;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use quickpoint_config::{Config, PresentationDir};
use state::AppState;
use tokio::net::TcpListener;
use tokio::sync::Notify;

pub use error::ServerError;
pub use live_reload::{LiveReloadScript, inject, latest_mtime};
pub use resolve::{MTIME_PATH, PRESENTATION_PREFIX, PathResolver, Root, Target};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on (0 picks a free port).
    pub port: u16,
    /// Directory holding the viewer application's static files.
    pub app_root: PathBuf,
    /// Absolute path of the presentation directory.
    pub presentation_root: PathBuf,
    /// Inject the live reload script into application HTML.
    pub live_reload_enabled: bool,
    /// How often the injected script polls for changes.
    pub poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 8080,
            app_root: PathBuf::from("."),
            presentation_root: PathBuf::from("."),
            live_reload_enabled: true,
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Stops a running [`Server`].
///
/// Cloneable; stopping before [`Server::serve`] starts makes it return
/// right away.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    notify: Arc<Notify>,
}

impl StopHandle {
    /// Ask the server to stop accepting connections and shut down.
    pub fn stop(&self) {
        self.notify.notify_one();
    }

    async fn stopped(&self) {
        self.notify.notified().await;
    }
}

/// A bound, not yet serving, HTTP server.
pub struct Server {
    listener: TcpListener,
    router: Router,
    stop: StopHandle,
}

impl Server {
    /// Bind the listening socket.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if the address cannot be bound.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let state = Arc::new(AppState::new(&config));
        let router = app::create_router(state);

        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .map_err(|source| ServerError::Bind {
                addr: format!("{}:{}", config.host, config.port),
                source,
            })?;
        tracing::info!(
            address = %listener.local_addr()?,
            app_root = %config.app_root.display(),
            presentation_root = %config.presentation_root.display(),
            "Listening"
        );

        Ok(Self {
            listener,
            router,
            stop: StopHandle::default(),
        })
    }

    /// Address the listener is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle that stops [`Server::serve`] from another task.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Serve until Ctrl-C or [`StopHandle::stop`], then shut down gracefully.
    ///
    /// In-flight requests are allowed to finish. The listener is dropped on
    /// return.
    ///
    /// # Errors
    ///
    /// Returns an error if accepting connections fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal(self.stop))
            .await?;
        Ok(())
    }
}

/// Run the server until interrupted.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    Server::bind(config).await?.serve().await
}

/// Wait for Ctrl-C or an explicit stop.
async fn shutdown_signal(stop: StopHandle) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {}
        () = stop.stopped() => {}
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from QuickPoint config.
///
/// # Arguments
///
/// * `config` - Loaded configuration (CLI settings already applied)
/// * `presentation` - Validated presentation directory
#[must_use]
pub fn server_config_from_config(config: &Config, presentation: &PresentationDir) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        app_root: config.app_resolved.root.clone(),
        presentation_root: presentation.root().to_path_buf(),
        live_reload_enabled: config.live_reload.enabled,
        poll_interval: config.live_reload.poll_interval(),
    }
}
