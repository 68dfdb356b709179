//! Configuration management for QuickPoint.
//!
//! Parses optional `quickpoint.toml` files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! The presentation directory is not part of the file; it is resolved
//! separately by [`PresentationDir::resolve`], which enforces that the
//! directory carries a `config.json`.
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `app.root`
//!
//! Presentation paths additionally expand a leading `~`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override application root directory.
    pub app_root: Option<PathBuf>,
    /// Override live reload enabled flag.
    pub live_reload_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quickpoint.toml";

/// File that must exist directly inside every presentation directory.
pub const PRESENTATION_CONFIG_FILENAME: &str = "config.json";

/// Default application entry page, relative to the application root.
const DEFAULT_ENTRY: &str = "src/index.html";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Application configuration (paths are relative strings from TOML).
    app: AppConfigRaw,
    /// Live reload configuration.
    pub live_reload: LiveReloadConfig,

    /// Resolved application configuration (set after loading).
    #[serde(skip)]
    pub app_resolved: AppConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 8080,
        }
    }
}

/// Raw application configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AppConfigRaw {
    root: Option<String>,
    entry: Option<String>,
}

/// Resolved application configuration with absolute paths.
#[derive(Debug, Default)]
pub struct AppConfig {
    /// Directory holding the viewer application's static files.
    pub root: PathBuf,
    /// Entry page opened in the browser, relative to `root`.
    pub entry: String,
}

/// Live reload configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LiveReloadConfig {
    /// Whether the polling script is injected into application HTML.
    pub enabled: bool,
    /// How often the browser polls for changes.
    pub poll_interval_ms: u64,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 500,
        }
    }
}

impl LiveReloadConfig {
    /// Poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Presentation directory lacks `config.json`.
    #[error("{} not found", .0.display())]
    MissingPresentationConfig(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`QP_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quickpoint.toml` in current directory and parents.
    /// Without a file, the application root is the installation directory.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the values are invalid once CLI settings are applied.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_installed()?
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(app_root) = &settings.app_root {
            self.app_resolved.root.clone_from(app_root);
        }
        if let Some(live_reload_enabled) = settings.live_reload_enabled {
            self.live_reload.enabled = live_reload_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with the application rooted where `quickpoint`
    /// is installed.
    fn default_installed() -> Result<Self, ConfigError> {
        let exe = std::env::current_exe()?;
        Ok(Self::default_with_base(&installation_root(&exe, DEFAULT_ENTRY)))
    }

    /// Create default config with the application rooted at `base`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            app: AppConfigRaw::default(),
            live_reload: LiveReloadConfig::default(),
            app_resolved: AppConfig {
                root: base.to_path_buf(),
                entry: DEFAULT_ENTRY.to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_app()?;
        self.validate_live_reload()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but the
        // browser could never be pointed at it from a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_app(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.app_resolved.entry, "app.entry")
    }

    fn validate_live_reload(&self) -> Result<(), ConfigError> {
        const MIN_INTERVAL_MS: u64 = 50;
        const MAX_INTERVAL_MS: u64 = 60_000;

        let interval = self.live_reload.poll_interval_ms;
        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&interval) {
            return Err(ConfigError::Validation(format!(
                "live_reload.poll_interval_ms must be between {MIN_INTERVAL_MS} and {MAX_INTERVAL_MS}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref root) = self.app.root {
            self.app.root = Some(expand::expand_env(root, "app.root")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let root = self.app.root.as_deref().unwrap_or(".");
        let entry = self.app.entry.as_deref().unwrap_or(DEFAULT_ENTRY);

        self.app_resolved = AppConfig {
            root: config_dir.join(root),
            entry: entry.trim_start_matches('/').to_owned(),
        };
    }
}

/// Operator-selected directory holding the presentation content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationDir {
    root: PathBuf,
}

impl PresentationDir {
    /// Resolve a user-supplied presentation path.
    ///
    /// Expands `~` and environment variables, trims trailing separators,
    /// makes the path absolute against the working directory and checks
    /// that it contains `config.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingPresentationConfig` when `config.json`
    /// is absent, or `ConfigError::EnvVar` when expansion fails.
    pub fn resolve(raw: &str) -> Result<Self, ConfigError> {
        let expanded = expand::expand_path(raw, "presentation")?;
        let root = std::path::absolute(trim_trailing_separators(&expanded))?;

        let config_file = root.join(PRESENTATION_CONFIG_FILENAME);
        if !config_file.is_file() {
            return Err(ConfigError::MissingPresentationConfig(config_file));
        }

        Ok(Self { root })
    }

    /// Absolute presentation root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the presentation's `config.json`.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.root.join(PRESENTATION_CONFIG_FILENAME)
    }

    #[must_use]
    pub fn into_path(self) -> PathBuf {
        self.root
    }
}

/// Directory the viewer application is installed in, given the running
/// executable.
///
/// The nearest ancestor of the executable's directory that holds `entry`
/// wins, so both `<app>/quickpoint` and `<app>/target/release/quickpoint`
/// find `<app>`. Falls back to the executable's own directory.
fn installation_root(exe: &Path, entry: &str) -> PathBuf {
    let exe_dir = exe.parent().unwrap_or(Path::new("."));
    exe_dir
        .ancestors()
        .find(|dir| dir.join(entry).is_file())
        .unwrap_or(exe_dir)
        .to_path_buf()
}

/// Trim trailing `/` (and `\` on Windows) while keeping a bare root intact.
fn trim_trailing_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches(std::path::is_separator);
    if trimmed.is_empty() { path } else { trimmed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.app_resolved.root, PathBuf::from("/test"));
        assert_eq!(config.app_resolved.entry, "src/index.html");
        assert!(config.live_reload.enabled);
        assert_eq!(config.live_reload.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 8080);
        assert!(config.live_reload.enabled);
    }

    #[test]
    fn test_parse_server_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 3000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_parse_live_reload_config() {
        let toml = r"
[live_reload]
enabled = false
poll_interval_ms = 1000
";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.live_reload.enabled);
        assert_eq!(config.live_reload.poll_interval_ms, 1000);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[app]
root = "viewer"
entry = "/app/index.html"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.app_resolved.root, PathBuf::from("/project/viewer"));
        assert_eq!(config.app_resolved.entry, "app/index.html");
    }

    #[test]
    fn test_resolve_paths_defaults_to_config_dir() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.app_resolved.root, PathBuf::from("/project/."));
        assert_eq!(config.app_resolved.entry, "src/index.html");
    }

    #[test]
    fn test_apply_cli_settings_port() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            port: Some(3000),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "localhost"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_app_root_and_live_reload() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            app_root: Some(PathBuf::from("/opt/quickpoint")),
            live_reload_enabled: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.app_resolved.root, PathBuf::from("/opt/quickpoint"));
        assert!(!config.live_reload.enabled);
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;

        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.host = String::new();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_validate_rejects_tiny_poll_interval() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.live_reload.poll_interval_ms = 10;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/quickpoint.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_explicit_file_resolves_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quickpoint.toml");
        std::fs::write(&path, "[server]\nport = 9090\n\n[app]\nroot = \"web\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.app_resolved.root, dir.path().join("web"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quickpoint.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let result = Config::load(Some(&path), None);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_cli_settings_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quickpoint.toml");
        std::fs::write(&path, "[server]\nport = 9090\n").unwrap();
        let settings = CliSettings {
            port: Some(4000),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_load_rejects_empty_cli_host() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quickpoint.toml");
        std::fs::write(&path, "").unwrap();
        let settings = CliSettings {
            host: Some(String::new()),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_installation_root_finds_entry_above_build_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/index.html"), "<body></body>").unwrap();
        std::fs::create_dir_all(dir.path().join("target/release")).unwrap();
        let exe = dir.path().join("target/release/quickpoint");

        assert_eq!(installation_root(&exe, DEFAULT_ENTRY), dir.path());
    }

    #[test]
    fn test_installation_root_next_to_executable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/index.html"), "<body></body>").unwrap();
        let exe = dir.path().join("quickpoint");

        assert_eq!(installation_root(&exe, DEFAULT_ENTRY), dir.path());
    }

    #[test]
    fn test_installation_root_falls_back_to_executable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("bin/quickpoint");

        assert_eq!(installation_root(&exe, DEFAULT_ENTRY), dir.path().join("bin"));
    }

    #[test]
    fn test_default_app_root_ignores_working_directory() {
        let exe = std::env::current_exe().unwrap();

        let config = Config::default_installed().unwrap();

        assert_eq!(
            config.app_resolved.root,
            installation_root(&exe, DEFAULT_ENTRY)
        );
        assert_ne!(config.app_resolved.root, std::env::current_dir().unwrap());
    }

    #[test]
    fn test_presentation_dir_resolves_with_config_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();

        let presentation = PresentationDir::resolve(dir.path().to_str().unwrap()).unwrap();

        assert_eq!(presentation.root(), dir.path());
        assert_eq!(presentation.config_file(), dir.path().join("config.json"));
    }

    #[test]
    fn test_presentation_dir_trims_trailing_slash() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        let raw = format!("{}/", dir.path().display());

        let presentation = PresentationDir::resolve(&raw).unwrap();

        assert_eq!(presentation.into_path(), dir.path().to_path_buf());
    }

    #[test]
    fn test_presentation_dir_requires_config_json() {
        let dir = tempfile::tempdir().unwrap();

        let err = PresentationDir::resolve(dir.path().to_str().unwrap()).unwrap_err();

        match err {
            ConfigError::MissingPresentationConfig(path) => {
                assert_eq!(path, dir.path().join("config.json"));
            }
            other => panic!("Expected MissingPresentationConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_presentation_dir_rejects_config_json_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("config.json")).unwrap();

        let result = PresentationDir::resolve(dir.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(ConfigError::MissingPresentationConfig(_))
        ));
    }

    #[test]
    fn test_trim_trailing_separators_keeps_root() {
        assert_eq!(trim_trailing_separators("/"), "/");
        assert_eq!(trim_trailing_separators("/slides//"), "/slides");
        assert_eq!(trim_trailing_separators("slides"), "slides");
    }
}
