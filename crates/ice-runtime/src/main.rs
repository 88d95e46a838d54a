//! Entry point for `iceboot`.
//!
//! Delegates to [`ice_runtime::run`], which bootstraps a communicator from the
//! process arguments and reports its resolved state.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    ice_runtime::run(std::env::args_os(), &mut stdout, &mut stderr)
}
