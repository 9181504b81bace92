//! Layered configuration for the plugincode binaries.
//!
//! Values resolve from lowest to highest precedence: built-in defaults, a
//! TOML configuration file (named with `--config-path` or
//! `PLUGINCODE_CONFIG_PATH`), `PLUGINCODE_*` environment variables, and
//! finally command-line flags. Loading is delegated to `ortho_config`, which
//! reports every malformed layer at once rather than stopping at the first.

mod defaults;

use ortho_config::OrthoConfig;
use plugincode::DependencyCheck;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use defaults::{
    DEFAULT_LOG_FILTER, default_dependency_check, default_log_filter, default_log_filter_string,
    default_log_format,
};

/// How the binaries render log events on stderr.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One flattened JSON object per event.
    #[default]
    Json,
    /// Single-line text for terminals.
    Compact,
}

/// Error returned when text names no [`LogFormat`].
pub type LogFormatParseError = strum::ParseError;

/// CLI flags understood by the configuration loader.
///
/// Binaries that parse their own commands forward only these flags (and
/// their values) to [`Config::load_from_iter`].
pub const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--dependency-check",
];

/// Resolved configuration shared by the binaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "PLUGINCODE")]
pub struct Config {
    /// Tracing filter expression, in `EnvFilter` syntax.
    #[ortho_config(default = default_log_filter_string())]
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for log events.
    #[ortho_config(default = default_log_format())]
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Handling of unsatisfied or cyclic plugin requirements.
    #[ortho_config(default = default_dependency_check())]
    #[serde(default = "default_dependency_check")]
    pub dependency_check: DependencyCheck,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            dependency_check: default_dependency_check(),
        }
    }
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for log events.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Handling of unsatisfied or cyclic plugin requirements.
    #[must_use]
    pub const fn dependency_check(&self) -> DependencyCheck {
        self.dependency_check
    }
}
