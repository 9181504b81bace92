//! Plugins, loaders and the world shared by the CLI tests.

use std::cell::RefCell;
use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

use plugincode::codebase::Codebase;
use plugincode::discovery::{Discoverer, InventoryDiscoverer, StaticDiscoverer};
use plugincode::options::PluggableCommandLineOption;
use plugincode::stages::post_scan::{self, PostScanPlugin};
use plugincode::stages::scan::{self, ScanPlugin};
use plugincode::{
    CodebasePlugin, Implementation, Plugin, PluginError, PluginSpec, RunOptions, register_plugin,
};
use plugincode_config::Config;
use serde_json::{Map, Value};

use crate::AppError;
use crate::config::ConfigLoader;

#[derive(Debug, Default)]
pub(crate) struct Copyrights;

impl Plugin for Copyrights {
    fn is_enabled(&self, options: &RunOptions) -> bool {
        options.flag("copyright")
    }
}

impl ScanPlugin for Copyrights {
    fn scan_resource(
        &self,
        _location: &Path,
        _options: &RunOptions,
    ) -> Result<Map<String, Value>, PluginError> {
        Ok(Map::new())
    }
}

#[derive(Debug, Default)]
pub(crate) struct Consolidate;

impl Plugin for Consolidate {
    fn is_enabled(&self, options: &RunOptions) -> bool {
        options.flag("consolidate")
    }
}

impl CodebasePlugin for Consolidate {
    fn process_codebase(
        &mut self,
        _codebase: &mut dyn Codebase,
        _options: &RunOptions,
    ) -> Result<(), PluginError> {
        Ok(())
    }
}

impl PostScanPlugin for Consolidate {}

pub(crate) fn copyrights() -> Implementation {
    Implementation::scan::<Copyrights>(
        PluginSpec::new()
            .with_sort_order(5)
            .with_option(PluggableCommandLineOption::flag("--copyright")),
    )
}

pub(crate) fn urls() -> Implementation {
    Implementation::scan::<Copyrights>(PluginSpec::new())
}

pub(crate) fn consolidate() -> Implementation {
    Implementation::post_scan::<Consolidate>(
        PluginSpec::new()
            .with_option(PluggableCommandLineOption::flag("--consolidate"))
            .requires_plugin("scan:copyrights"),
    )
}

register_plugin!(scan::ENTRYPOINT, "urls", || Ok(urls()));
register_plugin!(scan::ENTRYPOINT, "copyrights", || Ok(copyrights()));
register_plugin!(post_scan::ENTRYPOINT, "consolidate", || Ok(consolidate()));

/// Returns a fixed configuration regardless of the arguments.
pub(crate) struct StaticConfigLoader {
    config: Config,
    seen: RefCell<Vec<OsString>>,
}

impl StaticConfigLoader {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            config,
            seen: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn seen(&self) -> Vec<OsString> {
        self.seen.borrow().clone()
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        self.seen.replace(args.to_vec());
        Ok(self.config.clone())
    }
}

/// Captured outcome of one CLI invocation.
pub(crate) struct Outcome {
    pub(crate) exit: ExitCode,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

pub(crate) fn args(command: &str) -> Vec<OsString> {
    std::iter::once("plugincode")
        .chain(command.split_whitespace())
        .map(OsString::from)
        .collect()
}

pub(crate) fn invoke(
    command: &str,
    loader: &StaticConfigLoader,
    discoverer: &dyn Discoverer,
) -> Outcome {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = crate::run_with(args(command), &mut stdout, &mut stderr, loader, discoverer);
    Outcome {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

/// Runs against the plugins registered above.
pub(crate) fn invoke_linked(command: &str) -> Outcome {
    let loader = StaticConfigLoader::new(Config::default());
    invoke(command, &loader, &InventoryDiscoverer::new())
}

/// A discoverer whose post-scan plugin requires a scan plugin nobody ships.
pub(crate) fn broken_requirements() -> StaticDiscoverer {
    StaticDiscoverer::new().with(
        post_scan::ENTRYPOINT,
        "consolidate",
        Implementation::post_scan::<Consolidate>(PluginSpec::new().requires_plugin("scan:missing")),
    )
}
