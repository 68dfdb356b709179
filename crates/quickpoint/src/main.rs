//! QuickPoint CLI - presentation development server.
//!
//! Serves the viewer application and a presentation directory, injects a
//! live reload script into the application's HTML and opens the browser.

mod browser;
mod commands;
mod error;
mod output;
mod picker;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::ServeArgs;
use error::CliError;
use output::Output;

/// QuickPoint - presentation development server.
#[derive(Parser)]
#[command(name = "quickpoint", version, about)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.serve.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = tokio::runtime::Runtime::new()
        .map_err(CliError::from)
        .and_then(|rt| rt.block_on(cli.serve.execute()));

    if let Err(err) = result {
        output.error(&err);
        std::process::exit(1);
    }
}
