//! Request path resolution.
//!
//! Maps request targets onto one of two virtual roots:
//!
//! ```text
//! /__mtime              -> change-detection endpoint
//! /presentation[/rel]   -> presentation root (+ rel)
//! /anything/else        -> application root (+ path)
//! ```
//!
//! Resolution is a pure mapping. Whether the resulting path exists is
//! decided by the responder.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Path of the change-detection endpoint polled by the live reload script.
pub const MTIME_PATH: &str = "/__mtime";

/// URL prefix under which the presentation root is mounted.
pub const PRESENTATION_PREFIX: &str = "/presentation";

/// Which virtual root a file target was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    /// The viewer application's own static files.
    Application,
    /// The operator-selected presentation directory.
    Presentation,
}

/// Result of translating a request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The change-detection endpoint.
    Mtime,
    /// A filesystem path under one of the roots.
    File {
        root: Root,
        path: PathBuf,
        /// Whether the request path ended with `/`.
        trailing_slash: bool,
    },
}

/// Translates request targets into filesystem paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    app_root: PathBuf,
    presentation_root: PathBuf,
}

impl PathResolver {
    #[must_use]
    pub fn new(app_root: PathBuf, presentation_root: PathBuf) -> Self {
        Self {
            app_root,
            presentation_root,
        }
    }

    #[must_use]
    pub fn app_root(&self) -> &Path {
        &self.app_root
    }

    #[must_use]
    pub fn presentation_root(&self) -> &Path {
        &self.presentation_root
    }

    /// Translate a request target (path with optional query and fragment).
    #[must_use]
    pub fn translate(&self, request_target: &str) -> Target {
        let raw_path = strip_query_and_fragment(request_target);
        if raw_path == MTIME_PATH {
            return Target::Mtime;
        }

        let decoded = percent_decode_str(raw_path).decode_utf8_lossy();
        let trailing_slash = decoded.ends_with('/');

        let (root, path) = match decoded.strip_prefix(PRESENTATION_PREFIX) {
            Some("") => (Root::Presentation, self.presentation_root.clone()),
            Some(rest) if rest.starts_with('/') => {
                (Root::Presentation, safe_join(&self.presentation_root, rest))
            }
            _ => (Root::Application, safe_join(&self.app_root, &decoded)),
        };

        Target::File {
            root,
            path,
            trailing_slash,
        }
    }
}

fn strip_query_and_fragment(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}

/// Join URL path segments onto `root`, dropping any segment that could
/// climb out of it.
fn safe_join(root: &Path, url_path: &str) -> PathBuf {
    let mut resolved = root.to_path_buf();
    for segment in url_path.split('/') {
        if segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains(std::path::is_separator)
        {
            continue;
        }
        resolved.push(segment);
    }
    resolved
}
