//! The base contract every plugin implements.
//!
//! A plugin is split in two parts:
//!
//! - behaviour, expressed by the [`Plugin`] trait (and the narrower stage
//!   traits built on it), implemented by the plugin type itself;
//! - class-level data, expressed by a [`PluginSpec`] value: sort order,
//!   contributed attributes, options and declared requirements.
//!
//! Identity (`stage` and `name`) is neither: it is assigned by the stage
//! manager at discovery time and lives in a
//! [`PluginDescriptor`](crate::descriptor::PluginDescriptor).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codebase::Codebase;
use crate::error::PluginError;
use crate::options::CommandLineOption;

/// Sort order assigned to plugins that do not choose one.
pub const DEFAULT_SORT_ORDER: i32 = 100;

// ---------------------------------------------------------------------------
// RunOptions
// ---------------------------------------------------------------------------

/// The full set of run-time options passed to every plugin operation.
///
/// Keys are option destination names (`strip_root`, not `--strip-root`).
///
/// # Example
///
/// ```
/// use plugincode::RunOptions;
///
/// let options: RunOptions = [("info", true)].into_iter().collect();
/// assert!(options.flag("info"));
/// assert!(!options.flag("timing"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunOptions {
    values: BTreeMap<String, Value>,
}

impl RunOptions {
    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option value, returning the updated set.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces an option value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the raw value of an option.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns `true` only when the option holds the boolean `true`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(Value::Bool(true)))
    }

    /// Returns the option as a string slice, if it is a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    /// Returns `true` when the option carries a non-empty, non-false value.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        match self.values.get(name) {
            None | Some(Value::Null | Value::Bool(false)) => false,
            Some(Value::String(text)) => !text.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }

    /// Iterates over option names and values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no options are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RunOptions
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Value type of a contributed attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// A string value.
    #[default]
    String,
    /// An integer value.
    Integer,
    /// A floating point value.
    Float,
    /// A boolean value.
    Boolean,
    /// An ordered list of values.
    List,
    /// A nested mapping.
    Mapping,
}

/// Describes one attribute a plugin adds to the codebase or to resources.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeSpec {
    kind: AttributeKind,
    help: String,
}

impl AttributeSpec {
    /// Creates an attribute descriptor.
    #[must_use]
    pub fn new(kind: AttributeKind, help: impl Into<String>) -> Self {
        Self {
            kind,
            help: help.into(),
        }
    }

    /// Returns the attribute value type.
    #[must_use]
    pub const fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Returns the attribute help text.
    #[must_use]
    pub const fn help(&self) -> &str {
        self.help.as_str()
    }
}

// ---------------------------------------------------------------------------
// PluginSpec
// ---------------------------------------------------------------------------

/// Class-level data a plugin author declares alongside the implementation.
///
/// # Example
///
/// ```
/// use plugincode::{AttributeKind, AttributeSpec, PluginSpec};
///
/// let spec = PluginSpec::new()
///     .with_sort_order(10)
///     .with_resource_attribute("emails", AttributeSpec::new(AttributeKind::List, "Emails found"))
///     .requires_plugin("pre_scan:ignore");
/// assert_eq!(spec.sort_order(), 10);
/// assert_eq!(spec.required_plugins(), ["pre_scan:ignore"]);
/// ```
#[derive(Debug, Clone)]
pub struct PluginSpec {
    sort_order: i32,
    codebase_attributes: IndexMap<String, AttributeSpec>,
    resource_attributes: IndexMap<String, AttributeSpec>,
    options: Vec<Arc<dyn CommandLineOption>>,
    required_plugins: Vec<String>,
    required_codebase_attributes: Vec<String>,
    required_resource_attributes: Vec<String>,
}

impl Default for PluginSpec {
    fn default() -> Self {
        Self {
            sort_order: DEFAULT_SORT_ORDER,
            codebase_attributes: IndexMap::new(),
            resource_attributes: IndexMap::new(),
            options: Vec::new(),
            required_plugins: Vec::new(),
            required_codebase_attributes: Vec::new(),
            required_resource_attributes: Vec::new(),
        }
    }
}

impl PluginSpec {
    /// Creates a spec with the default sort order and nothing declared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the relative sort order.
    #[must_use]
    pub const fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Declares an attribute contributed to the codebase.
    #[must_use]
    pub fn with_codebase_attribute(mut self, name: impl Into<String>, spec: AttributeSpec) -> Self {
        self.codebase_attributes.insert(name.into(), spec);
        self
    }

    /// Declares an attribute contributed to each resource.
    #[must_use]
    pub fn with_resource_attribute(mut self, name: impl Into<String>, spec: AttributeSpec) -> Self {
        self.resource_attributes.insert(name.into(), spec);
        self
    }

    /// Declares a command-line option exposed by the plugin.
    #[must_use]
    pub fn with_option(mut self, option: impl CommandLineOption) -> Self {
        self.options.push(Arc::new(option));
        self
    }

    /// Declares a `stage:name` plugin that must run first.
    #[must_use]
    pub fn requires_plugin(mut self, qname: impl Into<String>) -> Self {
        self.required_plugins.push(qname.into());
        self
    }

    /// Declares a codebase attribute that must already be present.
    #[must_use]
    pub fn requires_codebase_attribute(mut self, name: impl Into<String>) -> Self {
        self.required_codebase_attributes.push(name.into());
        self
    }

    /// Declares a resource attribute that must already be present.
    #[must_use]
    pub fn requires_resource_attribute(mut self, name: impl Into<String>) -> Self {
        self.required_resource_attributes.push(name.into());
        self
    }

    /// Returns the relative sort order.
    #[must_use]
    pub const fn sort_order(&self) -> i32 {
        self.sort_order
    }

    /// Returns the contributed codebase attributes in declaration order.
    #[must_use]
    pub const fn codebase_attributes(&self) -> &IndexMap<String, AttributeSpec> {
        &self.codebase_attributes
    }

    /// Returns the contributed resource attributes in declaration order.
    #[must_use]
    pub const fn resource_attributes(&self) -> &IndexMap<String, AttributeSpec> {
        &self.resource_attributes
    }

    /// Returns the declared options.
    #[must_use]
    pub fn options(&self) -> &[Arc<dyn CommandLineOption>] {
        &self.options
    }

    /// Returns the required `stage:name` plugins.
    #[must_use]
    pub fn required_plugins(&self) -> &[String] {
        &self.required_plugins
    }

    /// Returns the required codebase attribute names.
    #[must_use]
    pub fn required_codebase_attributes(&self) -> &[String] {
        &self.required_codebase_attributes
    }

    /// Returns the required resource attribute names.
    #[must_use]
    pub fn required_resource_attributes(&self) -> &[String] {
        &self.required_resource_attributes
    }
}

// ---------------------------------------------------------------------------
// Behaviour
// ---------------------------------------------------------------------------

/// Behaviour shared by every plugin regardless of stage.
///
/// `is_enabled` is separate from `setup` so the driver can compute the full
/// set of active plugins, and check their requirements, before paying for
/// any initialisation.
pub trait Plugin: fmt::Debug {
    /// Returns `true` if the user-selected options enable this plugin.
    ///
    /// Must be free of side effects.
    fn is_enabled(&self, options: &RunOptions) -> bool;

    /// Performs one-time initialisation.
    ///
    /// Called at most once per process, and only when the plugin is enabled.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] on any unrecoverable failure.
    fn setup(&mut self, options: &RunOptions) -> Result<(), PluginError> {
        let _ = options;
        Ok(())
    }
}

/// A plugin that processes a whole codebase at once.
pub trait CodebasePlugin: Plugin {
    /// Processes `codebase`, updating its resources in place.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] if processing fails.
    fn process_codebase(
        &mut self,
        codebase: &mut dyn Codebase,
        options: &RunOptions,
    ) -> Result<(), PluginError>;
}
