//! Plugin implementations as produced by discovery.
//!
//! An [`Implementation`] pairs a stage-typed [`PluginFactory`] with the
//! plugin's [`PluginSpec`]. The factory variant records which stage contract
//! the implementation satisfies; stage managers compare it with the contract
//! their stage requires.

use std::fmt;

use crate::contract::{CodebasePlugin, Plugin, PluginSpec};
use crate::stages::Contract;
use crate::stages::location_provider::LocationProviderPlugin;
use crate::stages::output::OutputPlugin;
use crate::stages::output_filter::OutputFilterPlugin;
use crate::stages::post_scan::PostScanPlugin;
use crate::stages::pre_scan::PreScanPlugin;
use crate::stages::scan::ScanPlugin;

/// Constructor for a plugin instance, typed by stage contract.
#[derive(Clone, Copy)]
pub enum PluginFactory {
    /// Builds a pre-scan plugin.
    PreScan(fn() -> Box<dyn PreScanPlugin>),
    /// Builds a scan plugin.
    Scan(fn() -> Box<dyn ScanPlugin>),
    /// Builds a post-scan plugin.
    PostScan(fn() -> Box<dyn PostScanPlugin>),
    /// Builds an output filter plugin.
    OutputFilter(fn() -> Box<dyn OutputFilterPlugin>),
    /// Builds an output plugin.
    Output(fn() -> Box<dyn OutputPlugin>),
    /// Builds a location provider.
    LocationProvider(fn() -> Box<dyn LocationProviderPlugin>),
}

impl PluginFactory {
    /// Returns the contract built instances satisfy.
    #[must_use]
    pub const fn contract(&self) -> Contract {
        match self {
            Self::PreScan(_) => Contract::PreScan,
            Self::Scan(_) => Contract::Scan,
            Self::PostScan(_) => Contract::PostScan,
            Self::OutputFilter(_) => Contract::OutputFilter,
            Self::Output(_) => Contract::Output,
            Self::LocationProvider(_) => Contract::LocationProvider,
        }
    }

    /// Builds a fresh plugin instance.
    #[must_use]
    pub fn build(&self) -> PluginInstance {
        match self {
            Self::PreScan(build) => PluginInstance::PreScan(build()),
            Self::Scan(build) => PluginInstance::Scan(build()),
            Self::PostScan(build) => PluginInstance::PostScan(build()),
            Self::OutputFilter(build) => PluginInstance::OutputFilter(build()),
            Self::Output(build) => PluginInstance::Output(build()),
            Self::LocationProvider(build) => PluginInstance::LocationProvider(build()),
        }
    }
}

impl fmt::Debug for PluginFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PluginFactory")
            .field(&self.contract())
            .finish()
    }
}

/// A live plugin instance.
#[derive(Debug)]
pub enum PluginInstance {
    /// A pre-scan plugin.
    PreScan(Box<dyn PreScanPlugin>),
    /// A scan plugin.
    Scan(Box<dyn ScanPlugin>),
    /// A post-scan plugin.
    PostScan(Box<dyn PostScanPlugin>),
    /// An output filter plugin.
    OutputFilter(Box<dyn OutputFilterPlugin>),
    /// An output plugin.
    Output(Box<dyn OutputPlugin>),
    /// A location provider.
    LocationProvider(Box<dyn LocationProviderPlugin>),
}

impl PluginInstance {
    /// Returns the contract this instance satisfies.
    #[must_use]
    pub const fn contract(&self) -> Contract {
        match self {
            Self::PreScan(_) => Contract::PreScan,
            Self::Scan(_) => Contract::Scan,
            Self::PostScan(_) => Contract::PostScan,
            Self::OutputFilter(_) => Contract::OutputFilter,
            Self::Output(_) => Contract::Output,
            Self::LocationProvider(_) => Contract::LocationProvider,
        }
    }

    /// Returns the stage-independent view of the plugin.
    #[must_use]
    pub fn as_plugin(&self) -> &dyn Plugin {
        match self {
            Self::PreScan(plugin) => &**plugin,
            Self::Scan(plugin) => &**plugin,
            Self::PostScan(plugin) => &**plugin,
            Self::OutputFilter(plugin) => &**plugin,
            Self::Output(plugin) => &**plugin,
            Self::LocationProvider(plugin) => &**plugin,
        }
    }

    /// Returns the mutable stage-independent view of the plugin.
    pub fn as_plugin_mut(&mut self) -> &mut dyn Plugin {
        match self {
            Self::PreScan(plugin) => &mut **plugin,
            Self::Scan(plugin) => &mut **plugin,
            Self::PostScan(plugin) => &mut **plugin,
            Self::OutputFilter(plugin) => &mut **plugin,
            Self::Output(plugin) => &mut **plugin,
            Self::LocationProvider(plugin) => &mut **plugin,
        }
    }

    /// Returns the plugin as a codebase plugin, for the contracts that are.
    pub fn as_codebase_plugin_mut(&mut self) -> Option<&mut dyn CodebasePlugin> {
        match self {
            Self::PreScan(plugin) => Some(&mut **plugin),
            Self::PostScan(plugin) => Some(&mut **plugin),
            Self::OutputFilter(plugin) => Some(&mut **plugin),
            Self::Scan(_) | Self::Output(_) | Self::LocationProvider(_) => None,
        }
    }

    /// Returns the scan plugin, if this is one.
    #[must_use]
    pub fn as_scan(&self) -> Option<&dyn ScanPlugin> {
        match self {
            Self::Scan(plugin) => Some(&**plugin),
            _ => None,
        }
    }

    /// Returns the output filter plugin, if this is one.
    pub fn as_output_filter_mut(&mut self) -> Option<&mut dyn OutputFilterPlugin> {
        match self {
            Self::OutputFilter(plugin) => Some(&mut **plugin),
            _ => None,
        }
    }

    /// Returns the output plugin, if this is one.
    pub fn as_output_mut(&mut self) -> Option<&mut dyn OutputPlugin> {
        match self {
            Self::Output(plugin) => Some(&mut **plugin),
            _ => None,
        }
    }

    /// Returns the location provider, if this is one.
    #[must_use]
    pub fn as_location_provider(&self) -> Option<&dyn LocationProviderPlugin> {
        match self {
            Self::LocationProvider(plugin) => Some(&**plugin),
            _ => None,
        }
    }
}

fn boxed_pre_scan<P: PreScanPlugin + Default + 'static>() -> Box<dyn PreScanPlugin> {
    Box::new(P::default())
}

fn boxed_scan<P: ScanPlugin + Default + 'static>() -> Box<dyn ScanPlugin> {
    Box::new(P::default())
}

fn boxed_post_scan<P: PostScanPlugin + Default + 'static>() -> Box<dyn PostScanPlugin> {
    Box::new(P::default())
}

fn boxed_output_filter<P: OutputFilterPlugin + Default + 'static>() -> Box<dyn OutputFilterPlugin>
{
    Box::new(P::default())
}

fn boxed_output<P: OutputPlugin + Default + 'static>() -> Box<dyn OutputPlugin> {
    Box::new(P::default())
}

fn boxed_location_provider<P: LocationProviderPlugin + Default + 'static>()
-> Box<dyn LocationProviderPlugin> {
    Box::new(P::default())
}

/// A discovered plugin implementation: how to build it and what it declares.
///
/// # Example
///
/// ```
/// use plugincode::{Implementation, Plugin, PluginSpec, RunOptions};
/// use plugincode::stages::Contract;
/// use plugincode::stages::location_provider::LocationProviderPlugin;
/// use indexmap::IndexMap;
/// use std::path::PathBuf;
///
/// #[derive(Debug, Default)]
/// struct Libmagic;
///
/// impl Plugin for Libmagic {
///     fn is_enabled(&self, _options: &RunOptions) -> bool {
///         true
///     }
/// }
///
/// impl LocationProviderPlugin for Libmagic {
///     fn get_locations(&self) -> IndexMap<String, PathBuf> {
///         IndexMap::new()
///     }
/// }
///
/// let implementation = Implementation::location_provider::<Libmagic>(PluginSpec::new());
/// assert_eq!(implementation.contract(), Contract::LocationProvider);
/// ```
#[derive(Debug, Clone)]
pub struct Implementation {
    factory: PluginFactory,
    spec: PluginSpec,
}

impl Implementation {
    /// Pairs a factory with its spec.
    #[must_use]
    pub const fn new(factory: PluginFactory, spec: PluginSpec) -> Self {
        Self { factory, spec }
    }

    /// Implementation of a default-constructible pre-scan plugin.
    #[must_use]
    pub fn pre_scan<P: PreScanPlugin + Default + 'static>(spec: PluginSpec) -> Self {
        Self::new(PluginFactory::PreScan(boxed_pre_scan::<P>), spec)
    }

    /// Implementation of a default-constructible scan plugin.
    #[must_use]
    pub fn scan<P: ScanPlugin + Default + 'static>(spec: PluginSpec) -> Self {
        Self::new(PluginFactory::Scan(boxed_scan::<P>), spec)
    }

    /// Implementation of a default-constructible post-scan plugin.
    #[must_use]
    pub fn post_scan<P: PostScanPlugin + Default + 'static>(spec: PluginSpec) -> Self {
        Self::new(PluginFactory::PostScan(boxed_post_scan::<P>), spec)
    }

    /// Implementation of a default-constructible output filter plugin.
    #[must_use]
    pub fn output_filter<P: OutputFilterPlugin + Default + 'static>(spec: PluginSpec) -> Self {
        Self::new(PluginFactory::OutputFilter(boxed_output_filter::<P>), spec)
    }

    /// Implementation of a default-constructible output plugin.
    #[must_use]
    pub fn output<P: OutputPlugin + Default + 'static>(spec: PluginSpec) -> Self {
        Self::new(PluginFactory::Output(boxed_output::<P>), spec)
    }

    /// Implementation of a default-constructible location provider.
    #[must_use]
    pub fn location_provider<P: LocationProviderPlugin + Default + 'static>(
        spec: PluginSpec,
    ) -> Self {
        Self::new(
            PluginFactory::LocationProvider(boxed_location_provider::<P>),
            spec,
        )
    }

    /// Returns the factory.
    #[must_use]
    pub const fn factory(&self) -> &PluginFactory {
        &self.factory
    }

    /// Returns the contract the implementation satisfies.
    #[must_use]
    pub const fn contract(&self) -> Contract {
        self.factory.contract()
    }

    /// Returns the declared class-level data.
    #[must_use]
    pub const fn spec(&self) -> &PluginSpec {
        &self.spec
    }
}
