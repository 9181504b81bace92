//! Discovery of plugin implementations.
//!
//! A [`Discoverer`] enumerates the implementations registered under a
//! discovery group (a stage's entrypoint name). Two implementations ship
//! with the crate:
//!
//! - [`InventoryDiscoverer`] reads [`EntryPoint`] registrations collected at
//!   link time. Crates register entry points with [`register_plugin!`].
//! - [`StaticDiscoverer`] holds an explicit in-memory list, used by tests and
//!   by hosts that assemble their plugin set by hand.
//!
//! [`register_plugin!`]: crate::register_plugin

use thiserror::Error;
use tracing::debug;

use crate::implementation::Implementation;

#[doc(hidden)]
pub use inventory;

/// Errors raised by the discovery mechanism itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// An entry point failed to produce its implementation.
    #[error("failed to load plugin '{name}' from group '{group}': {message}")]
    Load {
        /// Discovery group of the entry point.
        group: String,
        /// Entry point name.
        name: String,
        /// Failure description.
        message: String,
    },

    /// The discovery source could not be enumerated.
    #[error("cannot enumerate plugins in group '{group}': {message}")]
    Unavailable {
        /// Discovery group being enumerated.
        group: String,
        /// Failure description.
        message: String,
    },
}

/// One implementation found under a discovery group.
#[derive(Debug, Clone)]
pub struct DiscoveredPlugin {
    /// Name the implementation was registered under.
    pub name: String,
    /// The implementation.
    pub implementation: Implementation,
}

/// Enumerates the implementations registered under a discovery group.
pub trait Discoverer {
    /// Returns every `(name, implementation)` pair registered under `group`.
    ///
    /// Order is not significant; stage managers sort what they accept.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscoveryError`] when enumeration or loading fails.
    fn discover(&self, group: &str) -> Result<Vec<DiscoveredPlugin>, DiscoveryError>;
}

/// Loader of an [`EntryPoint`].
pub type LoadFn = fn() -> Result<Implementation, DiscoveryError>;

/// A link-time plugin registration.
#[derive(Debug)]
pub struct EntryPoint {
    group: &'static str,
    name: &'static str,
    load: LoadFn,
}

impl EntryPoint {
    /// Declares an entry point named `name` in discovery group `group`.
    #[must_use]
    pub const fn new(group: &'static str, name: &'static str, load: LoadFn) -> Self {
        Self { group, name, load }
    }

    /// Returns the discovery group.
    #[must_use]
    pub const fn group(&self) -> &'static str {
        self.group
    }

    /// Returns the entry point name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Runs the loader.
    ///
    /// # Errors
    ///
    /// Returns whatever the loader returns.
    pub fn load(&self) -> Result<Implementation, DiscoveryError> {
        (self.load)()
    }
}

inventory::collect!(EntryPoint);

/// Registers a plugin implementation under a stage's discovery group.
///
/// # Example
///
/// ```
/// use plugincode::{Implementation, Plugin, PluginSpec, RunOptions, register_plugin};
/// use plugincode::stages::location_provider::{ENTRYPOINT, LocationProviderPlugin};
/// use indexmap::IndexMap;
/// use std::path::PathBuf;
///
/// #[derive(Debug, Default)]
/// struct Libarchive;
///
/// impl Plugin for Libarchive {
///     fn is_enabled(&self, _options: &RunOptions) -> bool {
///         true
///     }
/// }
///
/// impl LocationProviderPlugin for Libarchive {
///     fn get_locations(&self) -> IndexMap<String, PathBuf> {
///         IndexMap::new()
///     }
/// }
///
/// register_plugin!(ENTRYPOINT, "libarchive", || {
///     Ok(Implementation::location_provider::<Libarchive>(PluginSpec::new()))
/// });
/// ```
#[macro_export]
macro_rules! register_plugin {
    ($group:expr, $name:expr, $load:expr $(,)?) => {
        $crate::discovery::inventory::submit! {
            $crate::discovery::EntryPoint::new($group, $name, $load)
        }
    };
}

/// Production discoverer backed by link-time [`EntryPoint`] registrations.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryDiscoverer;

impl InventoryDiscoverer {
    /// Creates the discoverer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Discoverer for InventoryDiscoverer {
    fn discover(&self, group: &str) -> Result<Vec<DiscoveredPlugin>, DiscoveryError> {
        inventory::iter::<EntryPoint>
            .into_iter()
            .filter(|entry_point| entry_point.group() == group)
            .map(|entry_point| {
                debug!(group, name = entry_point.name(), "loading entry point");
                Ok(DiscoveredPlugin {
                    name: entry_point.name().to_owned(),
                    implementation: entry_point.load()?,
                })
            })
            .collect()
    }
}

/// In-memory discoverer returning registrations in insertion order.
///
/// # Example
///
/// ```
/// use plugincode::discovery::{Discoverer, StaticDiscoverer};
///
/// let discoverer = StaticDiscoverer::new();
/// let found = discoverer.discover("scancode_scan").expect("nothing to fail");
/// assert!(found.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticDiscoverer {
    entries: Vec<(String, DiscoveredPlugin)>,
    unavailable: Vec<(String, String)>,
}

impl StaticDiscoverer {
    /// Creates an empty discoverer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an implementation under `group`.
    pub fn register(
        &mut self,
        group: impl Into<String>,
        name: impl Into<String>,
        implementation: Implementation,
    ) {
        self.entries.push((
            group.into(),
            DiscoveredPlugin {
                name: name.into(),
                implementation,
            },
        ));
    }

    /// Registers an implementation, returning the updated discoverer.
    #[must_use]
    pub fn with(
        mut self,
        group: impl Into<String>,
        name: impl Into<String>,
        implementation: Implementation,
    ) -> Self {
        self.register(group, name, implementation);
        self
    }

    /// Makes enumeration of `group` fail with `message`.
    #[must_use]
    pub fn fail_group(mut self, group: impl Into<String>, message: impl Into<String>) -> Self {
        self.unavailable.push((group.into(), message.into()));
        self
    }
}

impl Discoverer for StaticDiscoverer {
    fn discover(&self, group: &str) -> Result<Vec<DiscoveredPlugin>, DiscoveryError> {
        if let Some((_, message)) = self.unavailable.iter().find(|(failed, _)| failed == group) {
            return Err(DiscoveryError::Unavailable {
                group: group.to_owned(),
                message: message.clone(),
            });
        }
        Ok(self
            .entries
            .iter()
            .filter(|(registered, _)| registered == group)
            .map(|(_, plugin)| plugin.clone())
            .collect())
    }
}
