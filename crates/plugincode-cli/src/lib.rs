//! Command-line runtime for inspecting the plugins linked into a host.
//!
//! The runtime splits configuration flags from the command, loads
//! [`Config`], installs telemetry, and runs the plugin load phase against the
//! link-time registrations. `list` reports every stage and its plugins in
//! load order; `check` fails with the load error when any stage does not
//! load or a requirement is broken.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use plugincode::discovery::{Discoverer, InventoryDiscoverer};
use plugincode::{DependencyCheck, LoadedPlugins, PluginError, PluginRegistry};
use plugincode_config::Config;
use thiserror::Error;
use tracing::debug;

mod config;
pub mod listing;
pub mod telemetry;

use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
pub use listing::Listing;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] telemetry::TelemetryError),
    #[error(transparent)]
    LoadPlugins(#[from] PluginError),
    #[error("unknown stage '{0}'")]
    UnknownStage(String),
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}

/// Command-line interface for plugin inspection.
#[derive(Parser, Debug)]
#[command(name = "plugincode", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Lists every stage and its plugins in load order.
    List {
        /// Emits the listing as JSON.
        #[arg(long)]
        json: bool,
        /// Restricts the listing to one stage (for example `scan`).
        #[arg(long, value_name = "STAGE")]
        stage: Option<String>,
    },
    /// Loads every stage and validates plugin requirements strictly.
    Check,
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    stdout: &'a mut W,
    stderr: &'a mut E,
    loader: &'a L,
    discoverer: &'a dyn Discoverer,
}

impl<W, E, L> CliRunner<'_, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn run(&mut self, args: Vec<OsString>) -> ExitCode {
        let split = split_config_arguments(&args);
        let cli = match Cli::try_parse_from(split.command_arguments) {
            Ok(cli) => cli,
            Err(error) => return self.report_usage(error),
        };

        let result = self
            .loader
            .load(&split.config_arguments)
            .and_then(|config| {
                telemetry::initialise(&config)?;
                self.execute(cli.command, &config)
            });

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                let _ = writeln!(self.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }

    fn execute(&mut self, command: CliCommand, config: &Config) -> Result<(), AppError> {
        match command {
            CliCommand::List { json, stage } => {
                let loaded = self.load(config.dependency_check())?;
                if let Some(wanted) = stage.as_deref() {
                    if loaded.stage(wanted).is_none() {
                        return Err(AppError::UnknownStage(wanted.to_owned()));
                    }
                }
                let listing = Listing::new(&loaded, stage.as_deref());
                if json {
                    listing.write_json(&mut *self.stdout)?;
                } else {
                    listing.write_human(&mut *self.stdout)?;
                }
                Ok(())
            }
            CliCommand::Check => {
                let loaded = self.load(DependencyCheck::Strict)?;
                let plugins = loaded.plugins().len();
                let stages = loaded.stages().count();
                writeln!(
                    self.stdout,
                    "{plugins} plugins loaded across {stages} stages; requirements satisfied"
                )?;
                Ok(())
            }
        }
    }

    fn load(&self, dependency_check: DependencyCheck) -> Result<LoadedPlugins, AppError> {
        debug!(%dependency_check, "loading plugins");
        let mut registry =
            PluginRegistry::with_default_stages().with_dependency_check(dependency_check);
        Ok(registry.load_plugins(self.discoverer)?)
    }

    fn report_usage(&mut self, error: clap::Error) -> ExitCode {
        if error.use_stderr() {
            let _ = write!(self.stderr, "{}", AppError::CliUsage(error));
            ExitCode::FAILURE
        } else {
            let _ = write!(self.stdout, "{error}");
            ExitCode::SUCCESS
        }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
///
/// Plugins are discovered from the link-time registrations made with
/// [`plugincode::register_plugin!`].
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with(args, stdout, stderr, &OrthoConfigLoader, &InventoryDiscoverer::new())
}

/// Runs the CLI with a custom configuration loader and discoverer.
pub(crate) fn run_with<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
    discoverer: &dyn Discoverer,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner {
        stdout,
        stderr,
        loader,
        discoverer,
    }
    .run(args.into_iter().collect())
}

#[cfg(test)]
mod tests;
