//! Change-detection endpoint.
//!
//! Returns the latest modification time under the presentation root as a
//! bare JSON number. Polled by the injected live reload script.

use axum::Json;
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::live_reload::latest_mtime;
use crate::state::AppState;

/// Handle GET /__mtime.
pub(crate) async fn get_mtime(state: &AppState) -> Result<Response, ServerError> {
    let root = state.resolver.presentation_root().to_path_buf();
    let mtime = tokio::task::spawn_blocking(move || latest_mtime(&root)).await?;
    Ok(Json(mtime).into_response())
}
