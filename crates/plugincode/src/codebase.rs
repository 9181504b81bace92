//! Interface to the scanned codebase.
//!
//! The codebase and its resources belong to the host pipeline. Plugins and
//! the serialization helpers only see them through these traits.

use serde_json::{Map, Value};

/// A single file or directory entry within a codebase.
pub trait Resource {
    /// Returns the resource path relative to the scan root.
    fn path(&self) -> &str;

    /// Returns `true` when an output filter excluded this resource.
    fn is_filtered(&self) -> bool;

    /// Sets or clears the output filter exclusion flag.
    fn set_filtered(&mut self, filtered: bool);

    /// Serializes the resource and its plugin-contributed attributes.
    ///
    /// `with_info` adds the extra per-file information fields and
    /// `with_timing` adds timing fields.
    fn to_map(&self, with_info: bool, with_timing: bool) -> Map<String, Value>;
}

/// A tree of resources processed by codebase plugins.
pub trait Codebase {
    /// Returns `true` when file information was collected for every resource.
    fn with_info(&self) -> bool {
        false
    }

    /// Walks resources top-down, skipping filtered ones.
    ///
    /// With `skip_root` the top-level root resource is omitted.
    fn walk_filtered(&self, skip_root: bool) -> Box<dyn Iterator<Item = &dyn Resource> + '_>;

    /// Visits every resource top-down, filtered or not, with mutable access.
    fn for_each_resource_mut(&mut self, visit: &mut dyn FnMut(&mut dyn Resource));
}
