//! Pre-scan stage: plugins that prepare the codebase before scanning, such
//! as ignoring paths or extracting archives.

use super::{Contract, Stage};
use crate::contract::CodebasePlugin;

/// Stage identifier.
pub const STAGE_ID: &str = "pre_scan";

/// Discovery group for pre-scan implementations.
pub const ENTRYPOINT: &str = "scancode_pre_scan";

/// The pre-scan stage.
pub const STAGE: Stage = Stage::new(STAGE_ID, ENTRYPOINT, Contract::PreScan);

/// Base contract all pre-scan plugins implement.
pub trait PreScanPlugin: CodebasePlugin {}
