//! Sink that keeps every line it receives.

use std::sync::{Arc, Mutex};

use crate::logger::Logger;

/// Records formatted lines in memory. Clones made through
/// [`Logger::clone_with_prefix`] share the same buffer.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    prefix: String,
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingLogger {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            lines: Arc::default(),
        }
    }

    /// Captures a copy of the recorded lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .expect("recording logger mutex poisoned")
            .clone()
    }

    fn record(&self, line: String) {
        self.lines
            .lock()
            .expect("recording logger mutex poisoned")
            .push(line);
    }
}

impl Logger for RecordingLogger {
    fn print(&self, message: &str) {
        self.record(format!("print: {message}"));
    }

    fn trace(&self, category: &str, message: &str) {
        self.record(format!("trace[{category}]: {message}"));
    }

    fn warning(&self, message: &str) {
        self.record(format!("warning: {message}"));
    }

    fn error(&self, message: &str) {
        self.record(format!("error: {message}"));
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn clone_with_prefix(&self, prefix: &str) -> Arc<dyn Logger> {
        Arc::new(Self {
            prefix: prefix.to_owned(),
            lines: Arc::clone(&self.lines),
        })
    }
}
