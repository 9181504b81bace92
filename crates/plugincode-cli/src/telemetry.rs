//! Logging setup for the `plugincode` binary.
//!
//! Events are written to stderr so listings on stdout stay machine readable.
//! The JSON format carries RFC 3339 timestamps; the compact format is meant
//! for people at a terminal and omits them.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use plugincode_config::{Config, LogFormat};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;

static INSTALLATION: OnceCell<Installation> = OnceCell::new();

/// Which subscriber receives the CLI's events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installation {
    /// The CLI installed its own stderr subscriber.
    Installed,
    /// A global subscriber already existed and keeps receiving events.
    Inherited,
}

/// Errors encountered while configuring logging.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter directives do not parse.
    #[error("invalid log filter '{filter}': {reason}")]
    Filter {
        /// Directives as configured.
        filter: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// Routes the process's tracing events according to `config`.
///
/// Only the first successful call does any work. Later calls report the
/// same [`Installation`] and ignore their configuration, so a process keeps
/// the log format it started with.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when `config.log_filter()` is not a
/// valid filter expression.
pub fn initialise(config: &Config) -> Result<Installation, TelemetryError> {
    INSTALLATION.get_or_try_init(|| install(config)).copied()
}

fn install(config: &Config) -> Result<Installation, TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    let outcome = match config.log_format() {
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .with_timer(UtcTime::rfc_3339())
            .try_init(),
        LogFormat::Compact => builder
            .compact()
            .with_target(false)
            .without_time()
            .with_ansi(io::stderr().is_terminal())
            .try_init(),
    };

    let installation = if outcome.is_ok() {
        Installation::Installed
    } else {
        Installation::Inherited
    };
    debug!(format = %config.log_format(), ?installation, "logging configured");
    Ok(installation)
}

fn parse_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|error| TelemetryError::Filter {
        filter: directives.to_owned(),
        reason: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("info")]
    #[case("plugincode=debug,warn")]
    #[case("plugincode::manager=trace")]
    fn accepts_filter_directives(#[case] directives: &str) {
        assert!(parse_filter(directives).is_ok());
    }

    #[test]
    fn rejects_unknown_levels_naming_the_filter() {
        let error = parse_filter("plugincode=loudest").expect_err("unknown level");
        assert!(
            error.to_string().starts_with("invalid log filter 'plugincode=loudest': "),
            "unexpected message: {error}"
        );
    }

    #[test]
    fn repeated_initialisation_reports_the_first_outcome() {
        let first = initialise(&Config::default()).expect("default filter parses");
        let compact = Config {
            log_format: LogFormat::Compact,
            log_filter: "plugincode=loudest".to_owned(),
            ..Config::default()
        };
        let second = initialise(&compact).expect("configuration ignored once installed");
        assert_eq!(first, second);
    }
}
