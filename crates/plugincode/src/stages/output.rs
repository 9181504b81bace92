//! Output stage: plugins that write the scan results in some format.
//!
//! Formats that work on serialized files use [`get_files`] to walk the
//! codebase once and produce one mapping per unfiltered resource.

use std::io;
use std::iter::FusedIterator;

use serde_json::{Map, Value};

use super::{Contract, Stage};
use crate::codebase::{Codebase, Resource};
use crate::contract::{Plugin, RunOptions};
use crate::error::PluginError;

/// Stage identifier.
pub const STAGE_ID: &str = "output";

/// Discovery group for output implementations.
pub const ENTRYPOINT: &str = "scancode_output";

/// The output stage.
pub const STAGE: Stage = Stage::new(STAGE_ID, ENTRYPOINT, Contract::Output);

/// Base contract all output plugins implement.
pub trait OutputPlugin: Plugin {
    /// Writes `codebase` to the `output` sink.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] if serialization or writing fails.
    fn process_codebase(
        &mut self,
        codebase: &dyn Codebase,
        output: &mut dyn io::Write,
        options: &RunOptions,
    ) -> Result<(), PluginError>;
}

/// Options recognised by [`get_files`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializationOptions {
    /// Include the extra per-file information fields.
    pub info: bool,
    /// Include timing fields.
    pub timing: bool,
    /// Omit the top-level root resource.
    pub strip_root: bool,
}

impl SerializationOptions {
    /// Reads the `info`, `timing` and `strip_root` flags.
    #[must_use]
    pub fn from_run_options(options: &RunOptions) -> Self {
        Self {
            info: options.flag("info"),
            timing: options.flag("timing"),
            strip_root: options.flag("strip_root"),
        }
    }
}

/// Lazy, one-shot sequence of serialized files.
///
/// Once exhausted it keeps returning `None`.
pub struct Files<'a> {
    resources: std::iter::Fuse<Box<dyn Iterator<Item = &'a dyn Resource> + 'a>>,
    with_info: bool,
    with_timing: bool,
}

impl std::fmt::Debug for Files<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Files")
            .field("with_info", &self.with_info)
            .field("with_timing", &self.with_timing)
            .finish_non_exhaustive()
    }
}

impl Iterator for Files<'_> {
    type Item = Map<String, Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.resources
            .next()
            .map(|resource| resource.to_map(self.with_info, self.with_timing))
    }
}

impl FusedIterator for Files<'_> {}

/// Returns the serialized files of `codebase`, top-down.
///
/// File information is included when `info` is set or the codebase was
/// collected with it.
///
/// # Example
///
/// ```no_run
/// use plugincode::RunOptions;
/// use plugincode::codebase::Codebase;
/// use plugincode::stages::output::get_files;
///
/// fn dump(codebase: &dyn Codebase) {
///     let options = RunOptions::new().with("strip_root", true);
///     for file in get_files(codebase, &options) {
///         let _path = file.get("path");
///     }
/// }
/// ```
#[must_use]
pub fn get_files<'a>(codebase: &'a dyn Codebase, options: &RunOptions) -> Files<'a> {
    let serialization = SerializationOptions::from_run_options(options);
    Files {
        resources: codebase.walk_filtered(serialization.strip_root).fuse(),
        with_info: serialization.info || codebase.with_info(),
        with_timing: serialization.timing,
    }
}
