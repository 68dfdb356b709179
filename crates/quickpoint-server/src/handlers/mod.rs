//! HTTP request handlers.

pub(crate) mod mtime;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::resolve::Target;
use crate::state::AppState;
use crate::static_files;

/// Entry point for every request: resolve the target, then hand off to the
/// mtime endpoint or the static file responder.
pub(crate) async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        tracing::info!(%method, path = uri.path(), "Rejected request");
        return ServerError::MethodNotImplemented(method).into_response();
    }

    let request_target = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
    let result = match state.resolver.translate(request_target) {
        Target::Mtime => mtime::get_mtime(&state).await,
        Target::File {
            root,
            path,
            trailing_slash,
        } => static_files::serve(&state, &uri, root, path, trailing_slash).await,
    };

    result.unwrap_or_else(|err| {
        tracing::debug!(path = uri.path(), error = %err, "Request failed");
        err.into_response()
    })
}
