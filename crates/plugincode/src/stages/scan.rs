//! Scan stage: plugins that collect data for one resource at a time.

use std::path::Path;

use serde_json::{Map, Value};

use super::{Contract, Stage};
use crate::contract::{Plugin, RunOptions};
use crate::error::PluginError;

/// Stage identifier.
pub const STAGE_ID: &str = "scan";

/// Discovery group for scan implementations.
pub const ENTRYPOINT: &str = "scancode_scan";

/// The scan stage.
pub const STAGE: Stage = Stage::new(STAGE_ID, ENTRYPOINT, Contract::Scan);

/// Base contract all scan plugins implement.
pub trait ScanPlugin: Plugin {
    /// Scans the file at `location`, returning a mapping keyed by the
    /// plugin's declared resource attributes.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] if the file cannot be scanned.
    fn scan_resource(
        &self,
        location: &Path,
        options: &RunOptions,
    ) -> Result<Map<String, Value>, PluginError>;
}
