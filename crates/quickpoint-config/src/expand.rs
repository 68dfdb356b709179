//! Environment variable and home directory expansion for config values.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a config string.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: e.to_string(),
        })
}

/// Expand a leading `~` and environment variable references in a path.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::full(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: e.to_string(),
        })
}
