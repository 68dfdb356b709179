//! Opening the served page in the default browser.

use std::time::Duration;

/// Delay between binding and opening the browser.
pub(crate) const OPEN_DELAY: Duration = Duration::from_millis(500);

/// Open `url` in the default browser after `delay`.
///
/// Runs as a detached one-shot task; failures are logged and never stop
/// the server.
pub(crate) fn open_after(url: String, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match open::that_detached(&url) {
            Ok(()) => tracing::debug!(%url, "Opened browser"),
            Err(err) => tracing::warn!(%url, error = %err, "Failed to open browser"),
        }
    });
}
