//! Console status lines for the serve command.

use std::path::Path;

use console::{Style, Term};

/// Writes human-facing status lines to stderr.
pub(crate) struct Output {
    term: Term,
    notice: Style,
    failure: Style,
    url: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            notice: Style::new().yellow(),
            failure: Style::new().red(),
            url: Style::new().cyan().bold(),
        }
    }

    /// Announce the running server: presentation, URL and how to stop.
    pub(crate) fn serving(&self, presentation: &Path, url: &str) {
        let [presentation, serving, hint] = serving_lines(presentation, url);
        self.line(&presentation);
        self.line(&self.url.apply_to(serving).to_string());
        self.line(&hint);
    }

    /// Server has shut down.
    pub(crate) fn stopped(&self) {
        self.line("Stopped.");
    }

    /// Non-fatal notice, such as a cancelled folder selection (yellow).
    pub(crate) fn notice(&self, msg: &str) {
        self.line(&self.notice.apply_to(msg).to_string());
    }

    /// Fatal error, printed as `Error: <err>` (red).
    pub(crate) fn error(&self, err: &dyn std::fmt::Display) {
        self.line(&self.failure.apply_to(format!("Error: {err}")).to_string());
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}

fn serving_lines(presentation: &Path, url: &str) -> [String; 3] {
    [
        format!("Presentation: {}", presentation.display()),
        format!("Serving: {url}"),
        "Press Ctrl+C to stop".to_owned(),
    ]
}
