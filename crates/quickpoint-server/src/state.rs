//! Application state.
//!
//! Shared, read-only state for all request handlers.

use crate::ServerConfig;
use crate::live_reload::LiveReloadScript;
use crate::resolve::PathResolver;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Maps request paths onto the application and presentation roots.
    pub(crate) resolver: PathResolver,
    /// Script injected into application HTML (if live reload is enabled).
    pub(crate) live_reload: Option<LiveReloadScript>,
}

impl AppState {
    pub(crate) fn new(config: &ServerConfig) -> Self {
        Self {
            resolver: PathResolver::new(
                config.app_root.clone(),
                config.presentation_root.clone(),
            ),
            live_reload: config
                .live_reload_enabled
                .then(|| LiveReloadScript::new(config.poll_interval)),
        }
    }
}
