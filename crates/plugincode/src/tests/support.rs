//! Shared fixtures: an in-memory codebase and a small set of sample plugins.

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::codebase::{Codebase, Resource};
use crate::contract::{CodebasePlugin, Plugin, PluginSpec, RunOptions};
use crate::discovery::StaticDiscoverer;
use crate::error::PluginError;
use crate::implementation::Implementation;
use crate::options::{HelpGroup, PluggableCommandLineOption};
use crate::stages::location_provider::{self, LocationProviderPlugin};
use crate::stages::output::{self, OutputPlugin, get_files};
use crate::stages::output_filter::{self, OutputFilterPlugin};
use crate::stages::post_scan::{self, PostScanPlugin};
use crate::stages::pre_scan::{self, PreScanPlugin};
use crate::stages::scan::{self, ScanPlugin};

// ---------------------------------------------------------------------------
// Virtual codebase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VirtualResource {
    pub(crate) path: String,
    pub(crate) filtered: bool,
    pub(crate) size: u64,
    pub(crate) attributes: Map<String, Value>,
}

impl VirtualResource {
    pub(crate) fn new(path: &str) -> Self {
        Self {
            path: path.to_owned(),
            filtered: false,
            size: 0,
            attributes: Map::new(),
        }
    }
}

impl Resource for VirtualResource {
    fn path(&self) -> &str {
        &self.path
    }

    fn is_filtered(&self) -> bool {
        self.filtered
    }

    fn set_filtered(&mut self, filtered: bool) {
        self.filtered = filtered;
    }

    fn to_map(&self, with_info: bool, with_timing: bool) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("path".to_owned(), json!(self.path));
        map.insert("is_filtered".to_owned(), json!(self.filtered));
        if with_info {
            map.insert("size".to_owned(), json!(self.size));
        }
        if with_timing {
            map.insert("scan_time".to_owned(), json!(0.0));
        }
        map.extend(self.attributes.clone());
        map
    }
}

/// A flat codebase; the first resource is the root.
#[derive(Debug, Clone, Default)]
pub(crate) struct VirtualCodebase {
    pub(crate) resources: Vec<VirtualResource>,
    pub(crate) with_info: bool,
}

impl VirtualCodebase {
    pub(crate) fn from_paths(paths: &[&str]) -> Self {
        Self {
            resources: paths.iter().map(|path| VirtualResource::new(path)).collect(),
            with_info: false,
        }
    }

    pub(crate) fn resource_mut(&mut self, path: &str) -> &mut VirtualResource {
        self.resources
            .iter_mut()
            .find(|resource| resource.path == path)
            .expect("resource exists")
    }
}

impl Codebase for VirtualCodebase {
    fn with_info(&self) -> bool {
        self.with_info
    }

    fn walk_filtered(&self, skip_root: bool) -> Box<dyn Iterator<Item = &dyn Resource> + '_> {
        let skip = usize::from(skip_root);
        Box::new(
            self.resources
                .iter()
                .skip(skip)
                .filter(|resource| !resource.filtered)
                .map(|resource| resource as &dyn Resource),
        )
    }

    fn for_each_resource_mut(&mut self, visit: &mut dyn FnMut(&mut dyn Resource)) {
        for resource in &mut self.resources {
            visit(resource);
        }
    }
}

// ---------------------------------------------------------------------------
// Setup log
// ---------------------------------------------------------------------------

thread_local! {
    static SETUP_LOG: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

fn record_setup(name: &'static str) {
    SETUP_LOG.with(|log| log.borrow_mut().push(name));
}

/// Drains the names of plugins whose `setup` ran on this thread.
pub(crate) fn take_setup_log() -> Vec<&'static str> {
    SETUP_LOG.with(|log| std::mem::take(&mut *log.borrow_mut()))
}

// ---------------------------------------------------------------------------
// Sample plugins
// ---------------------------------------------------------------------------

/// Pre-scan plugin enabled by `--ignore`.
#[derive(Debug, Default)]
pub(crate) struct IgnorePaths;

impl Plugin for IgnorePaths {
    fn is_enabled(&self, options: &RunOptions) -> bool {
        options.is_set("ignore")
    }

    fn setup(&mut self, _options: &RunOptions) -> Result<(), PluginError> {
        record_setup("ignore");
        Ok(())
    }
}

impl CodebasePlugin for IgnorePaths {
    fn process_codebase(
        &mut self,
        _codebase: &mut dyn Codebase,
        _options: &RunOptions,
    ) -> Result<(), PluginError> {
        Ok(())
    }
}

impl PreScanPlugin for IgnorePaths {}

pub(crate) fn ignore_paths() -> Implementation {
    Implementation::pre_scan::<IgnorePaths>(
        PluginSpec::new().with_option(
            PluggableCommandLineOption::multiple("--ignore", "PATTERN")
                .with_help("Ignore files matching PATTERN.")
                .with_help_group(HelpGroup::PreScan),
        ),
    )
}

/// Scan plugin that is always enabled.
#[derive(Debug, Default)]
pub(crate) struct Emails;

impl Plugin for Emails {
    fn is_enabled(&self, _options: &RunOptions) -> bool {
        true
    }

    fn setup(&mut self, _options: &RunOptions) -> Result<(), PluginError> {
        record_setup("emails");
        Ok(())
    }
}

impl ScanPlugin for Emails {
    fn scan_resource(
        &self,
        location: &Path,
        _options: &RunOptions,
    ) -> Result<Map<String, Value>, PluginError> {
        let mut map = Map::new();
        map.insert(
            "emails".to_owned(),
            json!([format!("author@{}", location.display())]),
        );
        Ok(map)
    }
}

/// Scan plugin enabled by `--license`, requiring the email scan first.
#[derive(Debug, Default)]
pub(crate) struct Licenses;

impl Plugin for Licenses {
    fn is_enabled(&self, options: &RunOptions) -> bool {
        options.flag("license")
    }

    fn setup(&mut self, _options: &RunOptions) -> Result<(), PluginError> {
        record_setup("licenses");
        Ok(())
    }
}

impl ScanPlugin for Licenses {
    fn scan_resource(
        &self,
        _location: &Path,
        _options: &RunOptions,
    ) -> Result<Map<String, Value>, PluginError> {
        Ok(Map::new())
    }
}

/// Scan plugin whose setup always fails.
#[derive(Debug, Default)]
pub(crate) struct Broken;

impl Plugin for Broken {
    fn is_enabled(&self, _options: &RunOptions) -> bool {
        true
    }

    fn setup(&mut self, _options: &RunOptions) -> Result<(), PluginError> {
        Err(PluginError::failed("license index is missing"))
    }
}

impl ScanPlugin for Broken {
    fn scan_resource(
        &self,
        _location: &Path,
        _options: &RunOptions,
    ) -> Result<Map<String, Value>, PluginError> {
        Ok(Map::new())
    }
}

/// Post-scan plugin adding a codebase summary.
#[derive(Debug, Default)]
pub(crate) struct Summary;

impl Plugin for Summary {
    fn is_enabled(&self, options: &RunOptions) -> bool {
        options.flag("summary")
    }

    fn setup(&mut self, _options: &RunOptions) -> Result<(), PluginError> {
        record_setup("summary");
        Ok(())
    }
}

impl CodebasePlugin for Summary {
    fn process_codebase(
        &mut self,
        _codebase: &mut dyn Codebase,
        _options: &RunOptions,
    ) -> Result<(), PluginError> {
        Ok(())
    }
}

impl PostScanPlugin for Summary {}

/// Output filter excluding resources whose path contains `test`.
#[derive(Debug, Default)]
pub(crate) struct ExcludeTests;

impl Plugin for ExcludeTests {
    fn is_enabled(&self, options: &RunOptions) -> bool {
        options.flag("exclude_tests")
    }
}

impl CodebasePlugin for ExcludeTests {
    fn process_codebase(
        &mut self,
        codebase: &mut dyn Codebase,
        _options: &RunOptions,
    ) -> Result<(), PluginError> {
        codebase.for_each_resource_mut(&mut |resource| {
            if resource.path().contains("test") {
                resource.set_filtered(true);
            }
        });
        Ok(())
    }
}

impl OutputFilterPlugin for ExcludeTests {}

/// Output plugin writing one JSON document per line.
#[derive(Debug, Default)]
pub(crate) struct JsonLines;

impl Plugin for JsonLines {
    fn is_enabled(&self, options: &RunOptions) -> bool {
        options.is_set("json_lines")
    }
}

impl OutputPlugin for JsonLines {
    fn process_codebase(
        &mut self,
        codebase: &dyn Codebase,
        output: &mut dyn io::Write,
        options: &RunOptions,
    ) -> Result<(), PluginError> {
        for file in get_files(codebase, options) {
            serde_json::to_writer(&mut *output, &file).map_err(io::Error::from)?;
            output.write_all(b"\n")?;
        }
        Ok(())
    }
}

pub(crate) fn json_lines() -> Implementation {
    Implementation::output::<JsonLines>(
        PluginSpec::new().with_option(
            PluggableCommandLineOption::value("--json-lines", "FILE")
                .with_help("Write scan output as JSON Lines to FILE.")
                .with_help_group(HelpGroup::Output),
        ),
    )
}

/// Location provider for a native library.
#[derive(Debug, Default)]
pub(crate) struct Libmagic;

impl Plugin for Libmagic {
    fn is_enabled(&self, _options: &RunOptions) -> bool {
        true
    }
}

impl LocationProviderPlugin for Libmagic {
    fn get_locations(&self) -> IndexMap<String, PathBuf> {
        IndexMap::from([(
            "typecode.libmagic.dll".to_owned(),
            PathBuf::from("/usr/lib/libmagic.so"),
        )])
    }
}

/// A second provider declaring the same location key.
#[derive(Debug, Default)]
pub(crate) struct SystemLibmagic;

impl Plugin for SystemLibmagic {
    fn is_enabled(&self, _options: &RunOptions) -> bool {
        true
    }
}

impl LocationProviderPlugin for SystemLibmagic {
    fn get_locations(&self) -> IndexMap<String, PathBuf> {
        IndexMap::from([
            (
                "typecode.libmagic.db".to_owned(),
                PathBuf::from("/usr/share/misc/magic.mgc"),
            ),
            (
                "typecode.libmagic.dll".to_owned(),
                PathBuf::from("/lib/libmagic.so.1"),
            ),
        ])
    }
}

/// A discoverer populated with one plugin per stage.
pub(crate) fn sample_discoverer() -> StaticDiscoverer {
    StaticDiscoverer::new()
        .with(pre_scan::ENTRYPOINT, "ignore", ignore_paths())
        .with(
            scan::ENTRYPOINT,
            "emails",
            Implementation::scan::<Emails>(PluginSpec::new().with_sort_order(8)),
        )
        .with(
            scan::ENTRYPOINT,
            "licenses",
            Implementation::scan::<Licenses>(
                PluginSpec::new()
                    .with_sort_order(2)
                    .with_option(PluggableCommandLineOption::flag("--license"))
                    .requires_plugin("scan:emails"),
            ),
        )
        .with(
            post_scan::ENTRYPOINT,
            "summary",
            Implementation::post_scan::<Summary>(
                PluginSpec::new()
                    .with_option(PluggableCommandLineOption::flag("--summary"))
                    .requires_resource_attribute("licenses"),
            ),
        )
        .with(
            output_filter::ENTRYPOINT,
            "exclude-tests",
            Implementation::output_filter::<ExcludeTests>(
                PluginSpec::new().with_option(PluggableCommandLineOption::flag("--exclude-tests")),
            ),
        )
        .with(output::ENTRYPOINT, "json-lines", json_lines())
        .with(
            location_provider::ENTRYPOINT,
            "libmagic",
            Implementation::location_provider::<Libmagic>(PluginSpec::new()),
        )
}
