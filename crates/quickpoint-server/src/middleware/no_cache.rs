//! Cache suppression middleware.
//!
//! Adds cache-busting headers to all responses, errors included:
//! - Cache-Control
//! - Pragma
//! - Expires

use axum::http::HeaderValue;
use axum::http::header;
use tower_http::set_header::SetResponseHeaderLayer;

/// Cache-Control header value.
const CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate, max-age=0";

/// Create layer that adds Cache-Control header.
pub(crate) fn cache_control_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_CONTROL),
    )
}

/// Create layer that adds the legacy Pragma header.
pub(crate) fn pragma_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(header::PRAGMA, HeaderValue::from_static("no-cache"))
}

/// Create layer that adds an already-expired Expires header.
pub(crate) fn expires_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(header::EXPIRES, HeaderValue::from_static("0"))
}
