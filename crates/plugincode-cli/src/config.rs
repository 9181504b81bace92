//! Configuration loading helpers for the CLI.
//!
//! The leading configuration flags are split off from the command line so
//! `ortho_config` only sees the flags it understands while `clap` parses the
//! subcommand.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use plugincode_config::{CONFIG_CLI_FLAGS, Config};

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration from the configuration flags of the command line.
    ///
    /// Configuration flags must precede the subcommand; anything after the
    /// first other token is left to the command parser.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let (flag, inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (&*text, false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Command line divided into configuration and command arguments.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_arguments: Vec<OsString>,
}

/// Splits the leading configuration flags from the command tokens.
///
/// The program name is copied to both halves so each can be handed to a
/// parser unchanged.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let mut tokens = args.iter();
    let Some(program) = tokens.next() else {
        return ConfigArgumentSplit::default();
    };

    let mut config_arguments = vec![program.clone()];
    let mut command_arguments = vec![program.clone()];
    let mut pending_value = false;
    let mut in_command = false;

    for argument in tokens {
        if in_command {
            command_arguments.push(argument.clone());
        } else if pending_value {
            config_arguments.push(argument.clone());
            pending_value = false;
        } else {
            match classify(argument) {
                FlagAction::Include { needs_value } => {
                    config_arguments.push(argument.clone());
                    pending_value = needs_value;
                }
                FlagAction::Stop => {
                    in_command = true;
                    command_arguments.push(argument.clone());
                }
            }
        }
    }

    ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    }
}
