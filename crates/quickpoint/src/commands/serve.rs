//! `quickpoint` serve command implementation.

use std::path::PathBuf;

use clap::Args;
use quickpoint_config::{CliSettings, Config, PRESENTATION_CONFIG_FILENAME, PresentationDir};
use quickpoint_server::{PRESENTATION_PREFIX, Server, server_config_from_config};

use crate::browser;
use crate::error::CliError;
use crate::output::Output;
use crate::picker::{self, PickerChoice};

/// Arguments for serving a presentation.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Presentation directory containing config.json (prompts when omitted).
    presentation: Option<String>,

    /// Port to bind to (same as --port).
    #[arg(value_name = "PORT", conflicts_with = "port")]
    port_positional: Option<u16>,

    /// Path to configuration file (default: auto-discover quickpoint.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the viewer application (overrides config).
    #[arg(long)]
    app_root: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Do not open the browser.
    #[arg(long)]
    no_open: bool,

    /// Disable live reload.
    #[arg(long)]
    no_live_reload: bool,

    /// How to ask for the presentation directory when none is given.
    #[arg(long, value_enum, default_value_t = PickerChoice::Auto)]
    picker: PickerChoice,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Serve the presentation until interrupted.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the presentation directory
    /// has no `config.json`, or the server fails to bind.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port.or(self.port_positional),
            app_root: self.app_root,
            live_reload_enabled: self.no_live_reload.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let raw = match self.presentation {
            Some(raw) => raw,
            None => match picker::select(self.picker, &config.app_resolved.root)? {
                Some(raw) => raw,
                None => {
                    output.notice("No folder selected.");
                    return Ok(());
                }
            },
        };
        let presentation = PresentationDir::resolve(&raw)?;

        let server = Server::bind(server_config_from_config(&config, &presentation)).await?;
        let url = entry_url(&config.server.host, server.local_addr()?.port(), &config.app_resolved.entry);

        output.serving(presentation.root(), &url);

        if !self.no_open {
            browser::open_after(url, browser::OPEN_DELAY);
        }

        server.serve().await?;
        output.stopped();
        Ok(())
    }
}

/// URL of the viewer entry page, pointing it at the presentation config.
fn entry_url(host: &str, port: u16, entry: &str) -> String {
    let entry = entry.trim_start_matches('/');
    format!("http://{host}:{port}/{entry}?config={PRESENTATION_PREFIX}/{PRESENTATION_CONFIG_FILENAME}")
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeArgs,
    }

    fn parse(args: &[&str]) -> ServeArgs {
        TestCli::try_parse_from(std::iter::once("quickpoint").chain(args.iter().copied()))
            .unwrap()
            .serve
    }

    #[test]
    fn test_entry_url_default_entry() {
        assert_eq!(
            entry_url("localhost", 8080, "src/index.html"),
            "http://localhost:8080/src/index.html?config=/presentation/config.json"
        );
    }

    #[test]
    fn test_entry_url_strips_leading_slash() {
        assert_eq!(
            entry_url("127.0.0.1", 9000, "/viewer.html"),
            "http://127.0.0.1:9000/viewer.html?config=/presentation/config.json"
        );
    }

    #[test]
    fn test_parse_positionals() {
        let args = parse(&["~/talks/demo", "9000"]);

        assert_eq!(args.presentation.as_deref(), Some("~/talks/demo"));
        assert_eq!(args.port_positional, Some(9000));
        assert_eq!(args.port, None);
        assert!(!args.no_open);
        assert!(matches!(args.picker, PickerChoice::Auto));
    }

    #[test]
    fn test_parse_flags() {
        let args = parse(&[
            "--port",
            "9001",
            "--no-open",
            "--no-live-reload",
            "--picker",
            "prompt",
            "--verbose",
        ]);

        assert_eq!(args.presentation, None);
        assert_eq!(args.port, Some(9001));
        assert!(args.no_open);
        assert!(args.no_live_reload);
        assert!(args.verbose);
        assert!(matches!(args.picker, PickerChoice::Prompt));
    }

    #[test]
    fn test_parse_rejects_two_ports() {
        let result = TestCli::try_parse_from(["quickpoint", "talk", "9000", "--port", "9001"]);
        assert!(result.is_err());
    }
}
