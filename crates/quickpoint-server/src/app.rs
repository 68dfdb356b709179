//! Router construction.
//!
//! Builds the axum router with the dispatch handler and middleware.

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers;
use crate::middleware::no_cache;
use crate::state::AppState;

/// Create the application router.
///
/// Every request goes through [`handlers::dispatch`], which consults the
/// path resolver. Request tracing stays at DEBUG so routine GETs are quiet.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(handlers::dispatch)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(no_cache::cache_control_layer())
                .layer(no_cache::pragma_layer())
                .layer(no_cache::expires_layer()),
        )
        .with_state(state)
}
