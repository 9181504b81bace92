//! Identity of a loaded plugin.
//!
//! Stage managers stamp every accepted implementation with its stage and
//! discovered name, producing an immutable [`PluginDescriptor`]. Plugin
//! types never carry their own identity.

use std::fmt;
use std::str::FromStr;

use crate::contract::PluginSpec;
use crate::error::PluginError;
use crate::implementation::{Implementation, PluginInstance};
use crate::stages::{Contract, Stage};

/// A parsed `stage:name` plugin identifier.
///
/// # Example
///
/// ```
/// use plugincode::QualifiedName;
///
/// let qname: QualifiedName = "scan:emails".parse().expect("valid name");
/// assert_eq!(qname.stage(), "scan");
/// assert_eq!(qname.name(), "emails");
/// assert_eq!(qname.to_string(), "scan:emails");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    stage: String,
    name: String,
}

impl QualifiedName {
    /// Builds a qualified name from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidQualifiedName`] when either part is
    /// empty or contains `:`.
    pub fn new(stage: impl Into<String>, name: impl Into<String>) -> Result<Self, PluginError> {
        let stage = stage.into();
        let name = name.into();
        if !is_valid_part(&stage) || !is_valid_part(&name) {
            return Err(PluginError::InvalidQualifiedName {
                value: format!("{stage}:{name}"),
            });
        }
        Ok(Self { stage, name })
    }

    /// Returns the stage identifier.
    #[must_use]
    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Returns the plugin name within its stage.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.trim().is_empty() && !part.contains(':')
}

impl FromStr for QualifiedName {
    type Err = PluginError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || PluginError::InvalidQualifiedName {
            value: value.to_owned(),
        };
        let (stage, name) = value.split_once(':').ok_or_else(invalid)?;
        Self::new(stage, name).map_err(|_| invalid())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.stage, self.name)
    }
}

/// An accepted plugin: its stage, its discovered name and its implementation.
///
/// Descriptors are values. Cloning one is cheap enough to hand copies to
/// callers, and nothing about a descriptor changes after setup.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    stage: Stage,
    name: String,
    implementation: Implementation,
}

impl PluginDescriptor {
    pub(crate) fn new(stage: Stage, name: impl Into<String>, implementation: Implementation) -> Self {
        Self {
            stage,
            name: name.into(),
            implementation,
        }
    }

    /// Returns the stage the plugin was loaded for.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the discovered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `"{stage}:{name}"`.
    #[must_use]
    pub fn qname(&self) -> String {
        format!("{}:{}", self.stage.id(), self.name)
    }

    /// Returns the qualified name as a value.
    #[must_use]
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName {
            stage: self.stage.id().to_owned(),
            name: self.name.clone(),
        }
    }

    /// Returns the relative sort order declared by the plugin.
    #[must_use]
    pub const fn sort_order(&self) -> i32 {
        self.implementation.spec().sort_order()
    }

    /// Returns the declared class-level data.
    #[must_use]
    pub const fn spec(&self) -> &PluginSpec {
        self.implementation.spec()
    }

    /// Returns the contract the implementation satisfies.
    #[must_use]
    pub const fn contract(&self) -> Contract {
        self.implementation.contract()
    }

    /// Returns the implementation.
    #[must_use]
    pub const fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    /// Builds a fresh, not yet set up, plugin instance.
    #[must_use]
    pub fn instantiate(&self) -> PluginInstance {
        self.implementation.factory().build()
    }

    /// Returns the `(sort_order, name)` key plugins are ordered by.
    #[must_use]
    pub fn sort_key(&self) -> (i32, &str) {
        (self.sort_order(), self.name.as_str())
    }
}

impl fmt::Display for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.stage.id(), self.name)
    }
}
