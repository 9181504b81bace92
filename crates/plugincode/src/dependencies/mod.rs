//! Validation of declared plugin requirements.
//!
//! Plugins declare the plugins they need to run after (`required_plugins`)
//! and the attributes they expect earlier plugins to have produced. The load
//! phase checks that every required plugin exists and that the requirement
//! graph has no cycle; activation uses [`setup_order`] to initialize
//! requirements first and [`check_required_attributes`] once the set of
//! enabled plugins is known.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::descriptor::{PluginDescriptor, QualifiedName};
use crate::error::{AttributeScope, PluginError};

/// How the load phase treats broken requirement declarations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DependencyCheck {
    /// Fail the load phase.
    #[default]
    Strict,
    /// Log a warning and continue.
    Warn,
    /// Skip validation.
    Off,
}

impl DependencyCheck {
    /// Applies the mode to the result of a requirement check.
    ///
    /// # Errors
    ///
    /// Returns the check's error in [`DependencyCheck::Strict`] mode.
    pub fn enforce(self, check: impl FnOnce() -> Result<(), PluginError>) -> Result<(), PluginError> {
        match self {
            Self::Off => Ok(()),
            Self::Strict => check(),
            Self::Warn => {
                if let Err(error) = check() {
                    warn!(%error, "plugin requirements are not satisfied");
                }
                Ok(())
            }
        }
    }
}

/// Requirement graph over a set of descriptors; edges point from a required
/// plugin to the plugins requiring it.
struct RequirementGraph {
    graph: DiGraph<usize, ()>,
    nodes: Vec<NodeIndex>,
}

impl RequirementGraph {
    fn build(descriptors: &[PluginDescriptor]) -> Result<Self, PluginError> {
        let mut graph = DiGraph::with_capacity(descriptors.len(), descriptors.len());
        let nodes: Vec<NodeIndex> = (0..descriptors.len())
            .map(|position| graph.add_node(position))
            .collect();
        let by_qname: HashMap<QualifiedName, NodeIndex> = descriptors
            .iter()
            .zip(&nodes)
            .map(|(descriptor, node)| (descriptor.qualified_name(), *node))
            .collect();

        for (descriptor, node) in descriptors.iter().zip(&nodes) {
            for required in descriptor.spec().required_plugins() {
                let required_qname: QualifiedName = required.parse()?;
                let Some(required_node) = by_qname.get(&required_qname) else {
                    return Err(PluginError::MissingRequiredPlugin {
                        qname: descriptor.qname(),
                        required: required_qname.to_string(),
                    });
                };
                graph.update_edge(*required_node, *node, ());
            }
        }
        Ok(Self { graph, nodes })
    }

    fn position(&self, node: NodeIndex) -> usize {
        self.graph.node_weight(node).copied().unwrap_or_default()
    }

    fn cycle_member(&self, descriptors: &[PluginDescriptor]) -> Option<String> {
        toposort(&self.graph, None).err().map(|cycle| {
            descriptors
                .get(self.position(cycle.node_id()))
                .map(PluginDescriptor::qname)
                .unwrap_or_default()
        })
    }
}

/// Checks that every required plugin is loaded and that requirements are
/// acyclic.
///
/// # Errors
///
/// - [`PluginError::InvalidQualifiedName`] for a malformed requirement.
/// - [`PluginError::MissingRequiredPlugin`] when a requirement names no
///   loaded plugin.
/// - [`PluginError::DependencyCycle`] when plugins require each other.
pub fn check_required_plugins(descriptors: &[PluginDescriptor]) -> Result<(), PluginError> {
    let requirements = RequirementGraph::build(descriptors)?;
    if let Some(qname) = requirements.cycle_member(descriptors) {
        return Err(PluginError::DependencyCycle { qname });
    }
    Ok(())
}

/// Orders descriptors so every plugin follows the plugins it requires.
///
/// Among plugins whose requirements are met, input order wins, so a stage's
/// `(sort_order, name)` order is kept wherever requirements allow.
///
/// # Errors
///
/// Returns the same errors as [`check_required_plugins`].
pub fn setup_order(descriptors: &[PluginDescriptor]) -> Result<Vec<&PluginDescriptor>, PluginError> {
    Ok(setup_positions(descriptors)?
        .into_iter()
        .filter_map(|position| descriptors.get(position))
        .collect())
}

/// Positions of `descriptors` in setup order.
pub(crate) fn setup_positions(descriptors: &[PluginDescriptor]) -> Result<Vec<usize>, PluginError> {
    let requirements = RequirementGraph::build(descriptors)?;
    let graph = &requirements.graph;

    let mut pending: HashMap<NodeIndex, usize> = requirements
        .nodes
        .iter()
        .map(|node| {
            (
                *node,
                graph.neighbors_directed(*node, Direction::Incoming).count(),
            )
        })
        .collect();
    let mut ready: BinaryHeap<Reverse<usize>> = requirements
        .nodes
        .iter()
        .filter(|node| pending.get(*node) == Some(&0))
        .map(|node| Reverse(requirements.position(*node)))
        .collect();

    let mut ordered = Vec::with_capacity(descriptors.len());
    while let Some(Reverse(position)) = ready.pop() {
        ordered.push(position);
        let Some(node) = requirements.nodes.get(position) else {
            continue;
        };
        for dependent in graph.neighbors_directed(*node, Direction::Outgoing) {
            if let Some(count) = pending.get_mut(&dependent) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    ready.push(Reverse(requirements.position(dependent)));
                }
            }
        }
    }

    if ordered.len() < descriptors.len() {
        let qname = requirements.cycle_member(descriptors).unwrap_or_default();
        return Err(PluginError::DependencyCycle { qname });
    }
    Ok(ordered)
}

/// Checks that every attribute an active plugin requires is contributed by
/// another active plugin or supplied by the caller.
///
/// `provided_codebase` and `provided_resource` list attributes the host
/// produces itself, such as the core file information fields.
///
/// # Errors
///
/// Returns [`PluginError::MissingAttribute`] for the first unmet requirement.
pub fn check_required_attributes<'a>(
    active: impl IntoIterator<Item = &'a PluginDescriptor> + Clone,
    provided_codebase: &[&str],
    provided_resource: &[&str],
) -> Result<(), PluginError> {
    let mut codebase: HashSet<&str> = provided_codebase.iter().copied().collect();
    let mut resource: HashSet<&str> = provided_resource.iter().copied().collect();
    for descriptor in active.clone() {
        codebase.extend(descriptor.spec().codebase_attributes().keys().map(String::as_str));
        resource.extend(descriptor.spec().resource_attributes().keys().map(String::as_str));
    }

    for descriptor in active {
        let spec = descriptor.spec();
        let missing = spec
            .required_codebase_attributes()
            .iter()
            .find(|attribute| !codebase.contains(attribute.as_str()))
            .map(|attribute| (AttributeScope::Codebase, attribute))
            .or_else(|| {
                spec.required_resource_attributes()
                    .iter()
                    .find(|attribute| !resource.contains(attribute.as_str()))
                    .map(|attribute| (AttributeScope::Resource, attribute))
            });
        if let Some((scope, attribute)) = missing {
            return Err(PluginError::MissingAttribute {
                qname: descriptor.qname(),
                scope,
                attribute: attribute.clone(),
            });
        }
    }
    Ok(())
}
