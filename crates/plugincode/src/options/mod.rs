//! Command-line options declared by plugins.
//!
//! Plugins expose options through [`PluginSpec::with_option`]. Any type may
//! implement [`CommandLineOption`], but stage managers only accept the
//! recognized contract, [`PluggableCommandLineOption`]; anything else is
//! rejected during setup. The host pipeline owns parsing and wiring these
//! options into its command surface.
//!
//! [`PluginSpec::with_option`]: crate::contract::PluginSpec::with_option

use std::any::Any;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use strum::Display;

use crate::contract::{DEFAULT_SORT_ORDER, RunOptions};
use crate::error::PluginError;

/// An option declared by a plugin.
pub trait CommandLineOption: fmt::Debug + Send + Sync + Any {
    /// Returns the destination name used as the key in [`RunOptions`].
    fn name(&self) -> &str;
}

/// Returns the option as the recognized option contract, if it is one.
#[must_use]
pub fn as_pluggable(option: &dyn CommandLineOption) -> Option<&PluggableCommandLineOption> {
    let any: &dyn Any = option;
    any.downcast_ref::<PluggableCommandLineOption>()
}

/// Section of the help screen an option is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum HelpGroup {
    /// Core options.
    #[strum(serialize = "core")]
    Core,
    /// Primary scan options.
    #[strum(serialize = "primary scans")]
    Scan,
    /// Options tuning scans.
    #[strum(serialize = "scan options")]
    ScanOptions,
    /// Secondary scan options.
    #[strum(serialize = "other scans")]
    OtherScans,
    /// Pre-scan options.
    #[strum(serialize = "pre-scan")]
    PreScan,
    /// Post-scan options.
    #[strum(serialize = "post-scan")]
    PostScan,
    /// Output filter options.
    #[strum(serialize = "output filters")]
    OutputFilter,
    /// Output format options.
    #[strum(serialize = "output formats")]
    Output,
    /// Options controlling output content.
    #[strum(serialize = "output control")]
    OutputControl,
    /// Documentation options.
    #[strum(serialize = "documentation")]
    Documentation,
    /// Everything else.
    #[default]
    #[strum(serialize = "miscellaneous")]
    Miscellaneous,
}

/// Whether an option is a switch or takes a value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum OptionKind {
    /// A boolean switch.
    #[default]
    Flag,
    /// Takes exactly one value.
    Value {
        /// Placeholder shown in help.
        metavar: String,
    },
    /// May be repeated to collect several values.
    Multiple {
        /// Placeholder shown in help.
        metavar: String,
    },
}

/// The option contract stage managers accept.
///
/// # Example
///
/// ```
/// use plugincode::options::{HelpGroup, PluggableCommandLineOption};
///
/// let option = PluggableCommandLineOption::flag("--strip-root")
///     .with_help("Strip the root directory segment of all paths.")
///     .with_help_group(HelpGroup::OutputControl)
///     .conflicts_with("full_root");
/// assert_eq!(option.dest(), "strip_root");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluggableCommandLineOption {
    flags: Vec<String>,
    dest: String,
    #[serde(flatten)]
    kind: OptionKind,
    help: String,
    default: Option<Value>,
    help_group: HelpGroup,
    sort_order: i32,
    required_options: Vec<String>,
    conflicting_options: Vec<String>,
    hidden: bool,
}

impl PluggableCommandLineOption {
    fn with_kind(flag: &str, kind: OptionKind) -> Self {
        Self {
            flags: vec![flag.to_owned()],
            dest: dest_from_flag(flag),
            kind,
            help: String::new(),
            default: None,
            help_group: HelpGroup::default(),
            sort_order: DEFAULT_SORT_ORDER,
            required_options: Vec::new(),
            conflicting_options: Vec::new(),
            hidden: false,
        }
    }

    /// Creates a boolean switch such as `--info`.
    #[must_use]
    pub fn flag(flag: &str) -> Self {
        Self::with_kind(flag, OptionKind::Flag)
    }

    /// Creates an option taking one value.
    #[must_use]
    pub fn value(flag: &str, metavar: impl Into<String>) -> Self {
        Self::with_kind(
            flag,
            OptionKind::Value {
                metavar: metavar.into(),
            },
        )
    }

    /// Creates an option that may be repeated.
    #[must_use]
    pub fn multiple(flag: &str, metavar: impl Into<String>) -> Self {
        Self::with_kind(
            flag,
            OptionKind::Multiple {
                metavar: metavar.into(),
            },
        )
    }

    /// Adds an alternative spelling such as `-i`.
    #[must_use]
    pub fn with_alias(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets the help section.
    #[must_use]
    pub const fn with_help_group(mut self, help_group: HelpGroup) -> Self {
        self.help_group = help_group;
        self
    }

    /// Sets the position within the help section.
    #[must_use]
    pub const fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Declares an option (by destination name) that must also be set.
    #[must_use]
    pub fn requires(mut self, dest: impl Into<String>) -> Self {
        self.required_options.push(dest.into());
        self
    }

    /// Declares an option (by destination name) that must not be set.
    #[must_use]
    pub fn conflicts_with(mut self, dest: impl Into<String>) -> Self {
        self.conflicting_options.push(dest.into());
        self
    }

    /// Hides the option from help output.
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Returns all spellings, primary first.
    #[must_use]
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Returns the primary spelling.
    #[must_use]
    pub fn primary_flag(&self) -> &str {
        self.flags.first().map_or(self.dest.as_str(), String::as_str)
    }

    /// Returns the destination name.
    #[must_use]
    pub const fn dest(&self) -> &str {
        self.dest.as_str()
    }

    /// Returns the option kind.
    #[must_use]
    pub const fn kind(&self) -> &OptionKind {
        &self.kind
    }

    /// Returns `true` for boolean switches.
    #[must_use]
    pub const fn is_flag(&self) -> bool {
        matches!(self.kind, OptionKind::Flag)
    }

    /// Returns the help text.
    #[must_use]
    pub const fn help(&self) -> &str {
        self.help.as_str()
    }

    /// Returns the default value.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the help section.
    #[must_use]
    pub const fn help_group(&self) -> HelpGroup {
        self.help_group
    }

    /// Returns the position within the help section.
    #[must_use]
    pub const fn sort_order(&self) -> i32 {
        self.sort_order
    }

    /// Returns `true` when hidden from help output.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Checks required and conflicting options against the run options.
    ///
    /// Nothing is checked unless this option is itself set.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::OptionRequires`] when a required option is
    /// unset, or [`PluginError::OptionConflict`] when a conflicting option
    /// is set.
    pub fn check_dependencies(&self, options: &RunOptions) -> Result<(), PluginError> {
        if !options.is_set(&self.dest) {
            return Ok(());
        }
        if let Some(required) = self
            .required_options
            .iter()
            .find(|required| !options.is_set(required))
        {
            return Err(PluginError::OptionRequires {
                option: self.primary_flag().to_owned(),
                required: required.clone(),
            });
        }
        if let Some(conflicting) = self
            .conflicting_options
            .iter()
            .find(|conflicting| options.is_set(conflicting))
        {
            return Err(PluginError::OptionConflict {
                option: self.primary_flag().to_owned(),
                conflicting: conflicting.clone(),
            });
        }
        Ok(())
    }
}

impl CommandLineOption for PluggableCommandLineOption {
    fn name(&self) -> &str {
        &self.dest
    }
}

/// Derives `strip_root` from `--strip-root`.
fn dest_from_flag(flag: &str) -> String {
    flag.trim_start_matches('-').replace('-', "_")
}
