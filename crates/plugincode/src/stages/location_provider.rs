//! Location providers: plugins that supply paths to native resources such
//! as shared libraries or executables used by other plugins.

use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::debug;

use super::{Contract, Stage};
use crate::contract::{Plugin, RunOptions};
use crate::descriptor::PluginDescriptor;
use crate::error::PluginError;

/// Stage identifier.
pub const STAGE_ID: &str = "location_provider";

/// Discovery group for location provider implementations.
pub const ENTRYPOINT: &str = "scancode_location_provider";

/// The location provider stage.
pub const STAGE: Stage = Stage::new(STAGE_ID, ENTRYPOINT, Contract::LocationProvider);

/// Base contract all location providers implement.
pub trait LocationProviderPlugin: Plugin {
    /// Returns a mapping of location key to path.
    fn get_locations(&self) -> IndexMap<String, PathBuf>;
}

/// Merges the locations of every enabled location provider.
///
/// Descriptors of other contracts are ignored.
///
/// # Errors
///
/// Returns [`PluginError::DuplicateLocation`] when two providers declare the
/// same key.
pub fn collect_locations(
    descriptors: &[PluginDescriptor],
    options: &RunOptions,
) -> Result<IndexMap<String, PathBuf>, PluginError> {
    let mut locations = IndexMap::new();
    for descriptor in descriptors {
        let instance = descriptor.instantiate();
        let Some(provider) = instance.as_location_provider() else {
            continue;
        };
        if !provider.is_enabled(options) {
            continue;
        }
        for (key, path) in provider.get_locations() {
            if locations.contains_key(&key) {
                return Err(PluginError::DuplicateLocation {
                    key,
                    qname: descriptor.qname(),
                });
            }
            debug!(qname = %descriptor, key = %key, path = %path.display(), "location registered");
            locations.insert(key, path);
        }
    }
    Ok(locations)
}
