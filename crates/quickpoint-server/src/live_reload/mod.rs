//! Live reload by polling.
//!
//! Application HTML gets a small script injected that polls the mtime
//! endpoint and reloads the page once the presentation changes on disk.

mod inject;
mod mtime;

pub use inject::{LiveReloadScript, inject};
pub use mtime::latest_mtime;
