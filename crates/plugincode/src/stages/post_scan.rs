//! Post-scan stage: plugins that summarise or consolidate scan results
//! across the codebase.

use super::{Contract, Stage};
use crate::contract::CodebasePlugin;

/// Stage identifier.
pub const STAGE_ID: &str = "post_scan";

/// Discovery group for post-scan implementations.
pub const ENTRYPOINT: &str = "scancode_post_scan";

/// The post-scan stage.
pub const STAGE: Stage = Stage::new(STAGE_ID, ENTRYPOINT, Contract::PostScan);

/// Base contract all post-scan plugins implement.
pub trait PostScanPlugin: CodebasePlugin {}
