//! CLI entrypoint for inspecting the plugins linked into the binary.
//!
//! The binary delegates to [`plugincode_cli::run`], which loads
//! configuration, installs telemetry, runs the load phase and renders the
//! requested report.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    plugincode_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
