//! Plugin registration and ordering for multi-stage scanning pipelines.
//!
//! A scan runs in fixed stages: pre-scan, scan, post-scan, output filter and
//! output, with location providers consulted on demand. Each stage has a base
//! contract its plugins implement, and a [`PluginManager`] that discovers the
//! implementations registered for the stage, validates them against the
//! contract and orders them by `(sort_order, name)`.
//!
//! # Architecture
//!
//! - [`contract`] defines the behaviour every plugin shares ([`Plugin`],
//!   [`CodebasePlugin`]) and the class-level data a plugin declares
//!   ([`PluginSpec`]).
//! - [`stages`] defines the stages and their narrower contracts.
//! - [`discovery`] abstracts where implementations come from behind the
//!   [`Discoverer`](discovery::Discoverer) trait.
//! - [`manager`] and [`registry`] run the load phase: one manager per stage,
//!   one registry per process.
//! - [`dependencies`] and [`activation`] validate declared requirements and
//!   initialize enabled plugins in requirement order.
//! - [`options`] and [`codebase`] are the touchpoints with the host's command
//!   surface and codebase model.
//!
//! # Example
//!
//! ```
//! use plugincode::{Implementation, Plugin, PluginRegistry, PluginSpec, RunOptions, activate};
//! use plugincode::discovery::StaticDiscoverer;
//! use plugincode::stages::scan::{self, ScanPlugin};
//! use plugincode::PluginError;
//! use serde_json::{Map, Value};
//! use std::path::Path;
//!
//! #[derive(Debug, Default)]
//! struct Emails;
//!
//! impl Plugin for Emails {
//!     fn is_enabled(&self, options: &RunOptions) -> bool {
//!         options.flag("email")
//!     }
//! }
//!
//! impl ScanPlugin for Emails {
//!     fn scan_resource(
//!         &self,
//!         _location: &Path,
//!         _options: &RunOptions,
//!     ) -> Result<Map<String, Value>, PluginError> {
//!         Ok(Map::new())
//!     }
//! }
//!
//! let discoverer = StaticDiscoverer::new().with(
//!     scan::ENTRYPOINT,
//!     "emails",
//!     Implementation::scan::<Emails>(PluginSpec::new()),
//! );
//!
//! let mut registry = PluginRegistry::with_default_stages();
//! let loaded = registry.load_plugins(&discoverer).expect("plugins load");
//! let active = activate(&loaded.plugins(), &RunOptions::new().with("email", true))
//!     .expect("plugins activate");
//! assert_eq!(active.first().map(|plugin| plugin.qname()).as_deref(), Some("scan:emails"));
//! ```

pub mod activation;
pub mod codebase;
pub mod contract;
pub mod dependencies;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod implementation;
pub mod manager;
pub mod options;
pub mod registry;
pub mod stages;

#[cfg(test)]
mod tests;

pub use self::activation::{ActivePlugin, activate};
pub use self::contract::{
    AttributeKind, AttributeSpec, CodebasePlugin, DEFAULT_SORT_ORDER, Plugin, PluginSpec,
    RunOptions,
};
pub use self::dependencies::DependencyCheck;
pub use self::descriptor::{PluginDescriptor, QualifiedName};
pub use self::error::PluginError;
pub use self::implementation::{Implementation, PluginFactory, PluginInstance};
pub use self::manager::PluginManager;
pub use self::registry::{LoadedPlugins, PluginRegistry, StagePlugins};
