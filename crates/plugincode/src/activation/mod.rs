//! Activation: turning loaded descriptors into initialized plugin instances.
//!
//! Activation runs once the run options are known. It validates option
//! combinations, instantiates every loaded plugin, keeps the enabled ones,
//! checks that their required plugins are enabled too, and calls `setup`
//! exactly once per plugin with requirements initialized first.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::contract::RunOptions;
use crate::dependencies::setup_positions;
use crate::descriptor::{PluginDescriptor, QualifiedName};
use crate::error::PluginError;
use crate::implementation::PluginInstance;
use crate::options::as_pluggable;

/// An enabled plugin instance together with its identity.
#[derive(Debug)]
pub struct ActivePlugin {
    descriptor: PluginDescriptor,
    instance: PluginInstance,
    initialized: bool,
}

impl ActivePlugin {
    /// Returns the plugin's identity and declarations.
    #[must_use]
    pub const fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    /// Returns `"{stage}:{name}"`.
    #[must_use]
    pub fn qname(&self) -> String {
        self.descriptor.qname()
    }

    /// Returns `true` once `setup` has completed.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns the instance.
    #[must_use]
    pub const fn instance(&self) -> &PluginInstance {
        &self.instance
    }

    /// Returns the instance mutably, for running it.
    pub const fn instance_mut(&mut self) -> &mut PluginInstance {
        &mut self.instance
    }

    fn setup(&mut self, options: &RunOptions) -> Result<(), PluginError> {
        if self.initialized {
            return Ok(());
        }
        self.instance
            .as_plugin_mut()
            .setup(options)
            .map_err(|error| PluginError::Setup {
                qname: self.descriptor.qname(),
                message: error.to_string(),
            })?;
        self.initialized = true;
        debug!(qname = %self.descriptor, "plugin initialized");
        Ok(())
    }
}

/// Checks every recognized option's required and conflicting options.
///
/// # Errors
///
/// Returns [`PluginError::OptionRequires`] or [`PluginError::OptionConflict`]
/// for the first violated option.
pub fn check_options(descriptors: &[PluginDescriptor], options: &RunOptions) -> Result<(), PluginError> {
    descriptors
        .iter()
        .flat_map(|descriptor| descriptor.spec().options())
        .map(Arc::as_ref)
        .filter_map(|option| as_pluggable(option))
        .try_for_each(|option| option.check_dependencies(options))
}

/// Activates the enabled plugins among `descriptors`.
///
/// The result keeps the order of `descriptors`; `setup` runs in requirement
/// order.
///
/// Every call builds fresh instances and sets each of them up, so a run
/// activates once and keeps the returned plugins. Calling again yields a
/// second, independently initialized set.
///
/// # Errors
///
/// - option errors from [`check_options`];
/// - [`PluginError::RequiredPluginDisabled`] when an enabled plugin requires
///   a loaded plugin the options do not enable;
/// - [`PluginError::MissingRequiredPlugin`] when it requires a plugin that
///   was never loaded;
/// - [`PluginError::Setup`] when a plugin's `setup` fails.
pub fn activate(
    descriptors: &[PluginDescriptor],
    options: &RunOptions,
) -> Result<Vec<ActivePlugin>, PluginError> {
    check_options(descriptors, options)?;

    let mut active: Vec<ActivePlugin> = descriptors
        .iter()
        .filter_map(|descriptor| {
            let instance = descriptor.instantiate();
            instance
                .as_plugin()
                .is_enabled(options)
                .then(|| ActivePlugin {
                    descriptor: descriptor.clone(),
                    instance,
                    initialized: false,
                })
        })
        .collect();

    check_required_enabled(descriptors, &active)?;

    let enabled: Vec<PluginDescriptor> = active
        .iter()
        .map(|plugin| plugin.descriptor.clone())
        .collect();
    for position in setup_positions(&enabled)? {
        if let Some(plugin) = active.get_mut(position) {
            plugin.setup(options)?;
        }
    }
    Ok(active)
}

fn check_required_enabled(
    loaded: &[PluginDescriptor],
    active: &[ActivePlugin],
) -> Result<(), PluginError> {
    let loaded_names: HashSet<QualifiedName> =
        loaded.iter().map(PluginDescriptor::qualified_name).collect();
    let enabled_names: HashSet<QualifiedName> = active
        .iter()
        .map(|plugin| plugin.descriptor.qualified_name())
        .collect();

    for plugin in active {
        for required in plugin.descriptor.spec().required_plugins() {
            let required_qname: QualifiedName = required.parse()?;
            if enabled_names.contains(&required_qname) {
                continue;
            }
            let qname = plugin.qname();
            return Err(if loaded_names.contains(&required_qname) {
                PluginError::RequiredPluginDisabled {
                    qname,
                    required: required_qname.to_string(),
                }
            } else {
                PluginError::MissingRequiredPlugin {
                    qname,
                    required: required_qname.to_string(),
                }
            });
        }
    }
    Ok(())
}
