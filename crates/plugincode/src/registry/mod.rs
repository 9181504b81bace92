//! The plugin registry: one manager per stage.
//!
//! A host constructs a single [`PluginRegistry`] at start-up, registers the
//! stages it runs, and calls [`load_plugins`](PluginRegistry::load_plugins)
//! once before scanning. The registry is read-only afterwards and is passed
//! by reference to whatever needs to enumerate stages or plugins.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::dependencies::{DependencyCheck, check_required_plugins};
use crate::descriptor::PluginDescriptor;
use crate::discovery::Discoverer;
use crate::error::PluginError;
use crate::manager::PluginManager;
use crate::options::CommandLineOption;
use crate::stages::{self, Stage};

/// Directory of stage managers, keyed by stage identifier.
///
/// # Example
///
/// ```
/// use plugincode::PluginRegistry;
/// use plugincode::discovery::StaticDiscoverer;
///
/// let mut registry = PluginRegistry::with_default_stages();
/// let loaded = registry
///     .load_plugins(&StaticDiscoverer::new())
///     .expect("empty stages load");
/// assert_eq!(loaded.stages().count(), 6);
/// assert!(loaded.plugins().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct PluginRegistry {
    managers: IndexMap<&'static str, PluginManager>,
    dependency_check: DependencyCheck,
}

impl PluginRegistry {
    /// Creates a registry with no stages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every stage the crate defines, in pipeline
    /// order followed by location providers.
    #[must_use]
    pub fn with_default_stages() -> Self {
        let mut registry = Self::new();
        for stage in stages::ALL {
            registry
                .managers
                .insert(stage.id(), PluginManager::new(stage));
        }
        registry
    }

    /// Sets how broken requirement declarations are treated.
    #[must_use]
    pub const fn with_dependency_check(mut self, dependency_check: DependencyCheck) -> Self {
        self.dependency_check = dependency_check;
        self
    }

    /// Returns the configured requirement check mode.
    #[must_use]
    pub const fn dependency_check(&self) -> DependencyCheck {
        self.dependency_check
    }

    /// Registers a stage.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicateStage`] if a stage with the same
    /// identifier is already registered.
    pub fn register(&mut self, stage: Stage) -> Result<(), PluginError> {
        if self.managers.contains_key(stage.id()) {
            return Err(PluginError::DuplicateStage {
                stage: stage.id().to_owned(),
            });
        }
        debug!(stage = %stage, entrypoint = stage.entrypoint(), "stage registered");
        self.managers.insert(stage.id(), PluginManager::new(stage));
        Ok(())
    }

    /// Looks up the manager of a stage.
    #[must_use]
    pub fn manager(&self, stage_id: &str) -> Option<&PluginManager> {
        self.managers.get(stage_id)
    }

    /// Returns the registered stages in registration order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.managers.values().map(PluginManager::stage)
    }

    /// Returns the number of registered stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    /// Returns `true` when no stages are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    /// Sets up every stage and aggregates their plugins and options.
    ///
    /// Stages are set up in registration order. Stages set up before a
    /// failing one stay initialized; the aggregate is only returned when
    /// every stage succeeds. Requirement declarations are then validated
    /// according to [`dependency_check`](Self::dependency_check).
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::StageLoad`] naming the stage whose setup
    /// failed, or a requirement error in strict mode.
    pub fn load_plugins(
        &mut self,
        discoverer: &dyn Discoverer,
    ) -> Result<LoadedPlugins, PluginError> {
        let mut loaded = LoadedPlugins::default();
        for (stage_id, manager) in &mut self.managers {
            let stage = manager.stage();
            let (plugins, options) =
                manager
                    .setup(discoverer)
                    .map_err(|source| PluginError::StageLoad {
                        stage: stage.id().to_owned(),
                        source: Box::new(source),
                    })?;
            loaded.stages.insert(
                *stage_id,
                StagePlugins {
                    stage,
                    plugins: plugins.to_vec(),
                    options: options.to_vec(),
                },
            );
        }

        self.dependency_check
            .enforce(|| check_required_plugins(&loaded.plugins()))?;

        info!(
            stages = loaded.stages.len(),
            plugins = loaded.stages.values().map(|stage| stage.plugins.len()).sum::<usize>(),
            "plugins loaded"
        );
        Ok(loaded)
    }
}

/// The plugins and options of one stage.
#[derive(Debug, Clone)]
pub struct StagePlugins {
    stage: Stage,
    plugins: Vec<PluginDescriptor>,
    options: Vec<Arc<dyn CommandLineOption>>,
}

impl StagePlugins {
    /// Returns the stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the plugins in `(sort_order, name)` order.
    #[must_use]
    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    /// Returns the plugins' options.
    #[must_use]
    pub fn options(&self) -> &[Arc<dyn CommandLineOption>] {
        &self.options
    }
}

/// Result of [`PluginRegistry::load_plugins`].
#[derive(Debug, Clone, Default)]
pub struct LoadedPlugins {
    stages: IndexMap<&'static str, StagePlugins>,
}

impl LoadedPlugins {
    /// Returns every stage's plugins, in registration order.
    pub fn stages(&self) -> impl Iterator<Item = &StagePlugins> {
        self.stages.values()
    }

    /// Returns one stage's plugins.
    #[must_use]
    pub fn stage(&self, stage_id: &str) -> Option<&StagePlugins> {
        self.stages.get(stage_id)
    }

    /// Returns every plugin, stage by stage.
    #[must_use]
    pub fn plugins(&self) -> Vec<PluginDescriptor> {
        self.stages
            .values()
            .flat_map(|stage| stage.plugins.iter().cloned())
            .collect()
    }

    /// Returns every option, stage by stage.
    #[must_use]
    pub fn options(&self) -> Vec<Arc<dyn CommandLineOption>> {
        self.stages
            .values()
            .flat_map(|stage| stage.options.iter().cloned())
            .collect()
    }

    /// Looks up a plugin by its `stage:name`.
    #[must_use]
    pub fn get(&self, qname: &str) -> Option<&PluginDescriptor> {
        let (stage_id, name) = qname.split_once(':')?;
        self.stages
            .get(stage_id)?
            .plugins
            .iter()
            .find(|descriptor| descriptor.name() == name)
    }
}
