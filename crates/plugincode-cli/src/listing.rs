//! Serialisable report of the loaded plugins.

use std::io::{self, Write};

use plugincode::options::{CommandLineOption, as_pluggable};
use plugincode::{LoadedPlugins, PluginDescriptor, StagePlugins};
use serde::Serialize;

/// Every loaded stage with its plugins in load order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    stages: Vec<StageListing>,
}

/// One stage of a [`Listing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageListing {
    stage: &'static str,
    entrypoint: &'static str,
    contract: &'static str,
    plugins: Vec<PluginListing>,
}

/// One plugin of a [`StageListing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginListing {
    qname: String,
    sort_order: i32,
    options: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    requires: Vec<String>,
}

impl Listing {
    /// Builds the listing, optionally narrowed to one stage.
    #[must_use]
    pub fn new(loaded: &LoadedPlugins, stage_filter: Option<&str>) -> Self {
        let stages = loaded
            .stages()
            .filter(|stage| stage_filter.is_none_or(|wanted| stage.stage().id() == wanted))
            .map(StageListing::from)
            .collect();
        Self { stages }
    }

    /// Number of stages listed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` when no stage is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Writes the listing as pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns any serialisation or write failure.
    pub fn write_json(&self, out: &mut impl Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)
    }

    /// Writes the listing as indented text, one plugin per line.
    ///
    /// # Errors
    ///
    /// Returns any write failure.
    pub fn write_human(&self, out: &mut impl Write) -> io::Result<()> {
        for stage in &self.stages {
            writeln!(out, "{} ({})", stage.stage, stage.entrypoint)?;
            if stage.plugins.is_empty() {
                writeln!(out, "  (none)")?;
            }
            for plugin in &stage.plugins {
                write!(out, "  {} [sort_order={}]", plugin.qname, plugin.sort_order)?;
                if !plugin.options.is_empty() {
                    write!(out, " options: {}", plugin.options.join(" "))?;
                }
                if !plugin.requires.is_empty() {
                    write!(out, " requires: {}", plugin.requires.join(", "))?;
                }
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

impl From<&StagePlugins> for StageListing {
    fn from(stage: &StagePlugins) -> Self {
        Self {
            stage: stage.stage().id(),
            entrypoint: stage.stage().entrypoint(),
            contract: stage.stage().contract().as_str(),
            plugins: stage.plugins().iter().map(PluginListing::from).collect(),
        }
    }
}

impl From<&PluginDescriptor> for PluginListing {
    fn from(descriptor: &PluginDescriptor) -> Self {
        Self {
            qname: descriptor.qname(),
            sort_order: descriptor.sort_order(),
            options: descriptor
                .spec()
                .options()
                .iter()
                .map(|option| option_label(&**option))
                .collect(),
            requires: descriptor.spec().required_plugins().to_vec(),
        }
    }
}

fn option_label(option: &dyn CommandLineOption) -> String {
    as_pluggable(option).map_or_else(
        || option.name().to_owned(),
        |pluggable| pluggable.primary_flag().to_owned(),
    )
}
