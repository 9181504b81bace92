//! Per-stage discovery, validation and ordering.
//!
//! A [`PluginManager`] owns one stage. Its [`setup`](PluginManager::setup)
//! asks a [`Discoverer`] for every implementation registered under the
//! stage's entrypoint, rejects anything that does not satisfy the stage
//! contract or declares an unrecognized option, stamps the survivors with
//! their identity and orders them by `(sort_order, name)`.
//!
//! Validation is fail-fast: a single bad plugin aborts the whole stage and
//! leaves the manager uninitialized.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::descriptor::{PluginDescriptor, QualifiedName};
use crate::discovery::{DiscoveredPlugin, Discoverer};
use crate::error::PluginError;
use crate::options::{CommandLineOption, as_pluggable};
use crate::stages::Stage;

#[derive(Debug)]
struct Loaded {
    plugins: Vec<PluginDescriptor>,
    options: Vec<Arc<dyn CommandLineOption>>,
}

/// Discovers and orders the plugins of one stage.
///
/// # Example
///
/// ```
/// use plugincode::PluginManager;
/// use plugincode::discovery::StaticDiscoverer;
/// use plugincode::stages::scan;
///
/// let mut manager = PluginManager::new(scan::STAGE);
/// let (plugins, options) = manager
///     .setup(&StaticDiscoverer::new())
///     .expect("an empty stage is valid");
/// assert!(plugins.is_empty());
/// assert!(options.is_empty());
/// assert!(manager.is_initialized());
/// ```
#[derive(Debug)]
pub struct PluginManager {
    stage: Stage,
    loaded: Option<Loaded>,
}

impl PluginManager {
    /// Creates an uninitialized manager for `stage`.
    #[must_use]
    pub const fn new(stage: Stage) -> Self {
        Self {
            stage,
            loaded: None,
        }
    }

    /// Returns the managed stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns `true` once [`setup`](Self::setup) has succeeded.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.loaded.is_some()
    }

    /// Returns the ordered plugins, or an empty slice before setup.
    #[must_use]
    pub fn plugins(&self) -> &[PluginDescriptor] {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.plugins.as_slice())
            .unwrap_or_default()
    }

    /// Returns the plugins' options, or an empty slice before setup.
    #[must_use]
    pub fn options(&self) -> &[Arc<dyn CommandLineOption>] {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.options.as_slice())
            .unwrap_or_default()
    }

    /// Discovers, validates and orders the stage's plugins.
    ///
    /// Idempotent: once initialized, returns the cached result without
    /// consulting `discoverer` again.
    ///
    /// # Errors
    ///
    /// - [`PluginError::Discovery`] when discovery itself fails.
    /// - [`PluginError::InvalidBase`] when an implementation does not satisfy
    ///   the stage contract.
    /// - [`PluginError::InvalidOption`] when a declared option is not a
    ///   [`PluggableCommandLineOption`](crate::options::PluggableCommandLineOption).
    /// - [`PluginError::InvalidQualifiedName`] when a discovered name is blank
    ///   or contains `:`.
    /// - [`PluginError::DuplicatePlugin`] when two implementations share a
    ///   name.
    pub fn setup(
        &mut self,
        discoverer: &dyn Discoverer,
    ) -> Result<(&[PluginDescriptor], &[Arc<dyn CommandLineOption>]), PluginError> {
        if self.loaded.is_none() {
            self.loaded = Some(self.discover(discoverer)?);
        }
        Ok((self.plugins(), self.options()))
    }

    fn discover(&self, discoverer: &dyn Discoverer) -> Result<Loaded, PluginError> {
        let discovered = discoverer.discover(self.stage.entrypoint())?;
        let mut seen = HashSet::with_capacity(discovered.len());
        let mut plugins = Vec::with_capacity(discovered.len());
        for plugin in discovered {
            let descriptor = self.validate(plugin)?;
            if !seen.insert(descriptor.name().to_owned()) {
                return Err(PluginError::DuplicatePlugin {
                    qname: descriptor.qname(),
                });
            }
            debug!(qname = %descriptor, sort_order = descriptor.sort_order(), "plugin accepted");
            plugins.push(descriptor);
        }

        plugins.sort_by(|left, right| left.sort_key().cmp(&right.sort_key()));

        let options = plugins
            .iter()
            .flat_map(|descriptor| descriptor.spec().options().iter().cloned())
            .collect();

        info!(
            stage = %self.stage,
            count = plugins.len(),
            "stage plugins loaded"
        );
        Ok(Loaded { plugins, options })
    }

    fn validate(&self, plugin: DiscoveredPlugin) -> Result<PluginDescriptor, PluginError> {
        let DiscoveredPlugin {
            name,
            implementation,
        } = plugin;
        QualifiedName::new(self.stage.id(), name.as_str())?;
        let qname = || format!("{}:{name}", self.stage.id());

        let expected = self.stage.contract();
        let found = implementation.contract();
        if found != expected {
            return Err(PluginError::InvalidBase {
                qname: qname(),
                expected,
                found,
            });
        }

        if let Some(option) = implementation
            .spec()
            .options()
            .iter()
            .map(Arc::as_ref)
            .find(|option| as_pluggable(*option).is_none())
        {
            return Err(PluginError::InvalidOption {
                qname: qname(),
                option: option.name().to_owned(),
            });
        }

        Ok(PluginDescriptor::new(self.stage, name, implementation))
    }
}
