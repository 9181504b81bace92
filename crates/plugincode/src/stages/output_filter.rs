//! Output filter stage: plugins that exclude resources from the output.
//!
//! Filters must not modify the codebase beyond setting the filtered flag on
//! resources. [`apply_filter`] runs a filter and, in debug builds, asserts
//! that nothing else changed.

use super::{Contract, Stage};
use crate::codebase::Codebase;
use crate::contract::{CodebasePlugin, RunOptions};
use crate::error::PluginError;

/// Stage identifier.
pub const STAGE_ID: &str = "output_filter";

/// Discovery group for output filter implementations.
pub const ENTRYPOINT: &str = "scancode_output_filter";

/// The output filter stage.
pub const STAGE: Stage = Stage::new(STAGE_ID, ENTRYPOINT, Contract::OutputFilter);

/// Base contract all output filter plugins implement.
///
/// Implementations only ever call
/// [`Resource::set_filtered`](crate::codebase::Resource::set_filtered).
pub trait OutputFilterPlugin: CodebasePlugin {}

/// Runs an output filter over the codebase.
///
/// # Errors
///
/// Returns whatever error the filter's `process_codebase` returns.
///
/// # Panics
///
/// In debug builds, panics if the filter changed anything other than the
/// filtered flag of a resource.
pub fn apply_filter(
    filter: &mut dyn OutputFilterPlugin,
    codebase: &mut dyn Codebase,
    options: &RunOptions,
) -> Result<(), PluginError> {
    #[cfg(debug_assertions)]
    let before = guard::snapshot(codebase);

    filter.process_codebase(codebase, options)?;

    #[cfg(debug_assertions)]
    guard::check_only_flag_changed(&*filter, &before, codebase);
    Ok(())
}

#[cfg(debug_assertions)]
mod guard {
    use serde_json::{Map, Value};

    use super::OutputFilterPlugin;
    use crate::codebase::Codebase;

    const FILTER_FLAG: &str = "is_filtered";

    pub(super) fn check_only_flag_changed(
        filter: &dyn OutputFilterPlugin,
        before: &[Map<String, Value>],
        codebase: &mut dyn Codebase,
    ) {
        let after = snapshot(codebase);
        debug_assert!(
            after.as_slice() == before,
            "output filter {filter:?} modified resources beyond the filtered flag"
        );
    }

    pub(super) fn snapshot(codebase: &mut dyn Codebase) -> Vec<Map<String, Value>> {
        let mut resources = Vec::new();
        codebase.for_each_resource_mut(&mut |resource| {
            let mut map = resource.to_map(true, true);
            map.remove(FILTER_FLAG);
            resources.push(map);
        });
        resources
    }
}
