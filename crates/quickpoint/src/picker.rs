//! Interactive selection of the presentation directory.
//!
//! Used when no directory is passed on the command line. Implementations are
//! chosen at runtime by what the machine offers: a native dialog when its
//! helper program is on `PATH`, otherwise a prompt on the terminal.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use clap::ValueEnum;
use console::Term;

use crate::error::CliError;

const DIALOG_PROMPT: &str = "Select a presentation folder (must contain config.json)";

/// Which kind of picker to use.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub(crate) enum PickerChoice {
    /// First available of dialog, then prompt.
    #[default]
    Auto,
    /// Native folder dialog only.
    Dialog,
    /// Terminal prompt only.
    Prompt,
}

/// A way of asking the operator for a directory.
pub(crate) trait DirectoryPicker {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether this picker can run here.
    fn is_available(&self) -> bool;

    /// Ask for a directory, starting at `start`.
    ///
    /// Returns `Ok(None)` when the operator cancels.
    fn pick(&self, start: &Path) -> Result<Option<String>, CliError>;
}

/// macOS folder chooser via `osascript`.
struct AppleScriptDialog;

impl DirectoryPicker for AppleScriptDialog {
    fn name(&self) -> &'static str {
        "osascript"
    }

    fn is_available(&self) -> bool {
        on_path("osascript")
    }

    fn pick(&self, start: &Path) -> Result<Option<String>, CliError> {
        let script = format!(
            "set chosen to choose folder with prompt \"{}\" default location POSIX file \"{}\"\n\
             return POSIX path of chosen",
            DIALOG_PROMPT,
            applescript_escape(&start.to_string_lossy()),
        );
        let output = Command::new("osascript").arg("-e").arg(script).output()?;
        // non-zero status: the operator pressed Cancel
        if !output.status.success() {
            return Ok(None);
        }
        Ok(non_empty(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// GTK folder chooser via `zenity`.
struct ZenityDialog;

impl DirectoryPicker for ZenityDialog {
    fn name(&self) -> &'static str {
        "zenity"
    }

    fn is_available(&self) -> bool {
        let has_display =
            std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some();
        has_display && on_path("zenity")
    }

    fn pick(&self, start: &Path) -> Result<Option<String>, CliError> {
        let mut filename = OsString::from("--filename=");
        filename.push(start.as_os_str());
        filename.push("/");
        let output = Command::new("zenity")
            .args(["--file-selection", "--directory"])
            .arg(format!("--title={DIALOG_PROMPT}"))
            .arg(filename)
            .output()?;
        match output.status.code() {
            Some(0) => Ok(non_empty(&String::from_utf8_lossy(&output.stdout))),
            Some(1) => Ok(None),
            _ => Err(CliError::Picker(format!(
                "zenity failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

/// Line-based prompt on the controlling terminal.
struct TerminalPrompt;

impl DirectoryPicker for TerminalPrompt {
    fn name(&self) -> &'static str {
        "prompt"
    }

    fn is_available(&self) -> bool {
        Term::stdout().is_term()
    }

    fn pick(&self, start: &Path) -> Result<Option<String>, CliError> {
        let term = Term::stdout();
        term.write_line(&format!("{DIALOG_PROMPT} (relative to {})", start.display()))?;
        term.write_str("Presentation folder: ")?;
        let line = term.read_line()?;
        let Some(answer) = non_empty(&line) else {
            return Ok(None);
        };
        if Path::new(&answer).is_absolute() || answer.starts_with('~') || answer.starts_with('$') {
            return Ok(Some(answer));
        }
        Ok(Some(start.join(answer).to_string_lossy().into_owned()))
    }
}

/// Ask for a directory with the first available picker for `choice`.
///
/// # Errors
///
/// Returns `CliError::Picker` if no picker can run, or the picker's own error.
pub(crate) fn select(choice: PickerChoice, start: &Path) -> Result<Option<String>, CliError> {
    select_from(candidates(choice), start)
}

fn candidates(choice: PickerChoice) -> Vec<Box<dyn DirectoryPicker>> {
    match choice {
        PickerChoice::Auto => vec![
            Box::new(AppleScriptDialog),
            Box::new(ZenityDialog),
            Box::new(TerminalPrompt),
        ],
        PickerChoice::Dialog => vec![Box::new(AppleScriptDialog), Box::new(ZenityDialog)],
        PickerChoice::Prompt => vec![Box::new(TerminalPrompt)],
    }
}

fn select_from(
    pickers: Vec<Box<dyn DirectoryPicker>>,
    start: &Path,
) -> Result<Option<String>, CliError> {
    let picker = pickers
        .into_iter()
        .find(|p| p.is_available())
        .ok_or_else(|| {
            CliError::Picker(
                "no directory picker available; pass the presentation directory as an argument"
                    .to_owned(),
            )
        })?;
    tracing::info!(picker = picker.name(), "Asking for presentation directory");
    picker.pick(start)
}

/// Whether `program` is an executable file in a `PATH` directory.
fn on_path(program: &str) -> bool {
    std::env::var_os("PATH").is_some_and(|paths| {
        std::env::split_paths(&paths).any(|dir| {
            dir.join(program).is_file() || dir.join(format!("{program}.exe")).is_file()
        })
    })
}

/// Trimmed picker output, `None` when blank.
fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
