//! Static file serving.
//!
//! Serves resolved paths from either root:
//!
//! - Directories without a trailing slash redirect to the slashed URL
//! - Directories serve `index.html`/`index.htm`, else a listing
//! - Application HTML gets the live reload script injected
//! - Everything else is sent as-is

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};

use crate::error::ServerError;
use crate::listing;
use crate::resolve::Root;
use crate::state::AppState;

/// Index files tried, in order, when a directory is requested.
const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Serve a resolved file target.
pub(crate) async fn serve(
    state: &AppState,
    uri: &Uri,
    root: Root,
    path: PathBuf,
    trailing_slash: bool,
) -> Result<Response, ServerError> {
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|_| ServerError::FileNotFound(path.clone()))?;

    if !metadata.is_dir() {
        if trailing_slash {
            return Err(ServerError::FileNotFound(path));
        }
        return serve_file(state, root, &path).await;
    }

    if !trailing_slash {
        return Ok(redirect_to_directory(uri));
    }

    for index in INDEX_FILES {
        let candidate = path.join(index);
        if tokio::fs::metadata(&candidate)
            .await
            .is_ok_and(|m| m.is_file())
        {
            return serve_file(state, root, &candidate).await;
        }
    }

    listing::render(&path, uri.path()).await
}

/// Read a file and build its response.
async fn serve_file(state: &AppState, root: Root, path: &Path) -> Result<Response, ServerError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|_| ServerError::FileNotFound(path.to_path_buf()))?;
    let last_modified = tokio::fs::metadata(path)
        .await
        .ok()
        .and_then(|m| m.modified().ok())
        .map(http_date);

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let is_html = mime.essence_str() == "text/html";

    let (content_type, body) = match (&state.live_reload, root, is_html) {
        (Some(script), Root::Application, true) => match String::from_utf8(bytes) {
            Ok(text) => (
                "text/html; charset=utf-8".to_owned(),
                script.inject(&text).into_owned().into_bytes(),
            ),
            Err(err) => (mime.to_string(), err.into_bytes()),
        },
        _ => (mime.to_string(), bytes),
    };

    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_LENGTH, body.len().to_string()),
        ],
        body,
    )
        .into_response();

    if let Some(value) = last_modified.and_then(|date| date.parse().ok()) {
        response.headers_mut().insert(header::LAST_MODIFIED, value);
    }

    Ok(response)
}

/// Redirect `/dir` to `/dir/`, keeping the query string.
fn redirect_to_directory(uri: &Uri) -> Response {
    let location = match uri.query() {
        Some(query) => format!("{}/?{query}", uri.path()),
        None => format!("{}/", uri.path()),
    };
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

/// Format a timestamp as an HTTP date (RFC 9110 IMF-fixdate).
fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}
