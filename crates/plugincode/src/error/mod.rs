//! Domain errors raised while loading, validating and running plugins.
//!
//! Every failure in the load phase is a [`PluginError`]. Variants carry the
//! qualified `stage:name` of the offending plugin (or the stage, option or
//! attribute involved) so callers can report the broken extension without
//! parsing messages. I/O errors are wrapped in `Arc` to keep the error small
//! and cloneable.

use std::sync::Arc;

use thiserror::Error;

use crate::discovery::DiscoveryError;
use crate::stages::Contract;

/// Which aggregate a required attribute belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeScope {
    /// Attribute of the codebase as a whole.
    Codebase,
    /// Attribute of each file or directory resource.
    Resource,
}

impl AttributeScope {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Codebase => "codebase",
            Self::Resource => "resource",
        }
    }
}

impl std::fmt::Display for AttributeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors arising from plugin discovery, validation and setup.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A discovered implementation does not satisfy its stage contract.
    #[error("invalid plugin '{qname}': {found} must extend {expected}")]
    InvalidBase {
        /// Qualified name of the rejected plugin.
        qname: String,
        /// Contract required by the stage.
        expected: Contract,
        /// Contract the implementation actually provides.
        found: Contract,
    },

    /// A declared option is not a `PluggableCommandLineOption`.
    #[error("invalid plugin '{qname}': option '{option}' must extend PluggableCommandLineOption")]
    InvalidOption {
        /// Qualified name of the plugin declaring the option.
        qname: String,
        /// Name of the offending option.
        option: String,
    },

    /// Two implementations were discovered under the same name in a stage.
    #[error("duplicate plugin '{qname}'")]
    DuplicatePlugin {
        /// Qualified name registered more than once.
        qname: String,
    },

    /// A stage was registered twice in the same registry.
    #[error("stage '{stage}' is already registered")]
    DuplicateStage {
        /// Stage identifier.
        stage: String,
    },

    /// Loading one stage failed during the aggregate load phase.
    #[error("cannot load plugins for stage '{stage}': {source}")]
    StageLoad {
        /// Stage whose setup failed.
        stage: String,
        /// Underlying failure.
        #[source]
        source: Box<PluginError>,
    },

    /// The discovery mechanism itself failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// A `stage:name` identifier could not be parsed.
    #[error("invalid qualified plugin name '{value}': expected 'stage:name'")]
    InvalidQualifiedName {
        /// Text that failed to parse.
        value: String,
    },

    /// A plugin requires another plugin that was not loaded.
    #[error("plugin '{qname}' requires missing plugin '{required}'")]
    MissingRequiredPlugin {
        /// Qualified name of the dependent plugin.
        qname: String,
        /// Qualified name of the missing requirement.
        required: String,
    },

    /// An enabled plugin requires a plugin that is loaded but not enabled.
    #[error("plugin '{qname}' requires plugin '{required}' which is not enabled")]
    RequiredPluginDisabled {
        /// Qualified name of the dependent plugin.
        qname: String,
        /// Qualified name of the disabled requirement.
        required: String,
    },

    /// The `required_plugins` graph contains a cycle.
    #[error("plugin '{qname}' is part of a required plugins cycle")]
    DependencyCycle {
        /// A plugin on the cycle.
        qname: String,
    },

    /// A required attribute is provided neither by a plugin nor by the caller.
    #[error("plugin '{qname}' requires missing {scope} attribute '{attribute}'")]
    MissingAttribute {
        /// Qualified name of the dependent plugin.
        qname: String,
        /// Aggregate the attribute belongs to.
        scope: AttributeScope,
        /// Attribute name.
        attribute: String,
    },

    /// An option was used without one of the options it requires.
    #[error("option '{option}' requires option '{required}'")]
    OptionRequires {
        /// Option that was set.
        option: String,
        /// Option that must also be set.
        required: String,
    },

    /// Two mutually exclusive options were used together.
    #[error("option '{option}' conflicts with option '{conflicting}'")]
    OptionConflict {
        /// Option that was set.
        option: String,
        /// Option that must not be set alongside it.
        conflicting: String,
    },

    /// A plugin's one-time setup failed.
    #[error("setup failed for plugin '{qname}': {message}")]
    Setup {
        /// Qualified name of the failing plugin.
        qname: String,
        /// Failure description reported by the plugin.
        message: String,
    },

    /// Two location providers declared the same location key.
    #[error("duplicate location key '{key}' declared by plugin '{qname}'")]
    DuplicateLocation {
        /// Location key.
        key: String,
        /// Qualified name of the second provider.
        qname: String,
    },

    /// Failure reported by plugin code.
    #[error("{message}")]
    Failed {
        /// Human-readable failure description.
        message: String,
    },

    /// An I/O error occurred while a plugin wrote its output.
    #[error("I/O error writing plugin output: {0}")]
    Io(#[source] Arc<std::io::Error>),
}

impl PluginError {
    /// Builds the error plugin code returns from `setup` or `process_codebase`.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for PluginError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(Arc::new(error))
    }
}
