//! Stage definitions for the scanning pipeline.
//!
//! Each stage is plain data: an identifier, the discovery group its
//! implementations are registered under, and the [`Contract`] they must
//! satisfy. The stage modules also define the contract traits and any
//! stage-specific helpers.
//!
//! Stages run in the fixed order of [`PIPELINE`]. Location providers are
//! loaded alongside them but are consulted on demand rather than run.

pub mod location_provider;
pub mod output;
pub mod output_filter;
pub mod post_scan;
pub mod pre_scan;
pub mod scan;


use serde::{Deserialize, Serialize};

/// The base contract a stage requires of its plugins.
///
/// # Example
///
/// ```
/// use plugincode::stages::Contract;
///
/// assert_eq!(Contract::OutputFilter.as_str(), "OutputFilterPlugin");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contract {
    /// [`pre_scan::PreScanPlugin`].
    PreScan,
    /// [`scan::ScanPlugin`].
    Scan,
    /// [`post_scan::PostScanPlugin`].
    PostScan,
    /// [`output_filter::OutputFilterPlugin`].
    OutputFilter,
    /// [`output::OutputPlugin`].
    Output,
    /// [`location_provider::LocationProviderPlugin`].
    LocationProvider,
}

impl Contract {
    /// Returns the name of the contract trait.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreScan => "PreScanPlugin",
            Self::Scan => "ScanPlugin",
            Self::PostScan => "PostScanPlugin",
            Self::OutputFilter => "OutputFilterPlugin",
            Self::Output => "OutputPlugin",
            Self::LocationProvider => "LocationProviderPlugin",
        }
    }

    /// Returns `true` for contracts built on
    /// [`CodebasePlugin`](crate::contract::CodebasePlugin).
    #[must_use]
    pub const fn processes_codebase(self) -> bool {
        matches!(self, Self::PreScan | Self::PostScan | Self::OutputFilter)
    }
}

impl std::fmt::Display for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named phase of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stage {
    id: &'static str,
    entrypoint: &'static str,
    contract: Contract,
}

impl Stage {
    /// Defines a stage.
    #[must_use]
    pub const fn new(id: &'static str, entrypoint: &'static str, contract: Contract) -> Self {
        Self {
            id,
            entrypoint,
            contract,
        }
    }

    /// Returns the stage identifier used in qualified plugin names.
    #[must_use]
    pub const fn id(self) -> &'static str {
        self.id
    }

    /// Returns the discovery group implementations are registered under.
    #[must_use]
    pub const fn entrypoint(self) -> &'static str {
        self.entrypoint
    }

    /// Returns the contract implementations must satisfy.
    #[must_use]
    pub const fn contract(self) -> Contract {
        self.contract
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id)
    }
}

/// Stages in execution order: pre-scan, scan, post-scan, output filter, output.
pub const PIPELINE: [Stage; 5] = [
    pre_scan::STAGE,
    scan::STAGE,
    post_scan::STAGE,
    output_filter::STAGE,
    output::STAGE,
];

/// Every stage known to the crate, pipeline stages first.
pub const ALL: [Stage; 6] = [
    pre_scan::STAGE,
    scan::STAGE,
    post_scan::STAGE,
    output_filter::STAGE,
    output::STAGE,
    location_provider::STAGE,
];
