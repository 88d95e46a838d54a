//! Test harness utilities for the bootstrap behavioural suite.

mod engine;
mod loader;
mod logger;
mod reporter;
mod thread_hook;
mod world;

pub use engine::ScriptedEngineFactory;
pub use loader::{FailingPropertiesLoader, TestPropertiesLoader};
pub use logger::RecordingLogger;
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use thread_hook::{HookEvent, RecordingThreadHook};
pub use world::{TestWorld, world};

/// Splits a space-separated token list into owned arguments.
#[must_use]
pub fn tokens(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}
