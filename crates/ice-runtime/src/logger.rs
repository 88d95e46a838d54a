//! Diagnostic sinks and the process-wide default sink.
//!
//! Every communicator writes its diagnostics to a [`Logger`]. Callers may
//! supply one through [`InitializationData`](crate::InitializationData);
//! otherwise the communicator binds whatever [`LoggerRegistry::get`] returns
//! when it is constructed. Replacing the registry's sink later does not
//! rebind communicators that already exist.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const LOGGER_TARGET: &str = "ice::logger";

/// Minimal logging capability consumed by the runtime.
pub trait Logger: Send + Sync {
    /// Writes an informational message.
    fn print(&self, message: &str);

    /// Writes a trace message under `category`, e.g. `Network`.
    fn trace(&self, category: &str, message: &str);

    /// Writes a warning.
    fn warning(&self, message: &str);

    /// Writes an error.
    fn error(&self, message: &str);

    /// Prefix attached to every message, possibly empty.
    fn prefix(&self) -> &str;

    /// Returns a sink writing to the same destination under another prefix.
    fn clone_with_prefix(&self, prefix: &str) -> Arc<dyn Logger>;
}

impl fmt::Debug for dyn Logger {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Logger")
            .field("prefix", &self.prefix())
            .finish_non_exhaustive()
    }
}

/// Default sink: forwards messages to `tracing` under the `ice::logger` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingLogger {
    prefix: String,
    timestamps: bool,
}

impl TracingLogger {
    /// Builds a sink with the given prefix and time-stamping enabled.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            timestamps: true,
        }
    }

    /// Enables or disables the `timestamp` field on emitted events.
    #[must_use]
    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Whether emitted events carry a `timestamp` field.
    #[must_use]
    pub fn timestamps(&self) -> bool {
        self.timestamps
    }

    fn timestamp(&self) -> Option<String> {
        if !self.timestamps {
            return None;
        }
        OffsetDateTime::now_utc().format(&Rfc3339).ok()
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("")
    }
}

impl Logger for TracingLogger {
    fn print(&self, message: &str) {
        let timestamp = self.timestamp();
        tracing::info!(
            target: LOGGER_TARGET,
            prefix = %self.prefix,
            timestamp = timestamp.as_deref(),
            "{message}"
        );
    }

    fn trace(&self, category: &str, message: &str) {
        let timestamp = self.timestamp();
        tracing::debug!(
            target: LOGGER_TARGET,
            prefix = %self.prefix,
            timestamp = timestamp.as_deref(),
            category,
            "{message}"
        );
    }

    fn warning(&self, message: &str) {
        let timestamp = self.timestamp();
        tracing::warn!(
            target: LOGGER_TARGET,
            prefix = %self.prefix,
            timestamp = timestamp.as_deref(),
            "{message}"
        );
    }

    fn error(&self, message: &str) {
        let timestamp = self.timestamp();
        tracing::error!(
            target: LOGGER_TARGET,
            prefix = %self.prefix,
            timestamp = timestamp.as_deref(),
            "{message}"
        );
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn clone_with_prefix(&self, prefix: &str) -> Arc<dyn Logger> {
        Arc::new(Self {
            prefix: prefix.to_owned(),
            timestamps: self.timestamps,
        })
    }
}

type LoggerFactory = dyn Fn() -> Arc<dyn Logger> + Send + Sync;

/// Holder of a default sink, constructed lazily on first read.
///
/// `get` and `set` are serialised by one mutex, so concurrent first reads
/// observe a single default instance.
pub struct LoggerRegistry {
    slot: Mutex<Option<Arc<dyn Logger>>>,
    factory: Box<LoggerFactory>,
}

static PROCESS_LOGGERS: Lazy<LoggerRegistry> = Lazy::new(LoggerRegistry::new);

impl LoggerRegistry {
    /// Registry whose default sink is a [`TracingLogger`] with no prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(|| Arc::new(TracingLogger::default()))
    }

    /// Registry using `factory` to build the default sink.
    #[must_use]
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Logger> + Send + Sync + 'static,
    {
        Self {
            slot: Mutex::new(None),
            factory: Box::new(factory),
        }
    }

    /// The registry backing [`process_logger`] and [`set_process_logger`].
    ///
    /// It lives for the remainder of the process once first touched.
    #[must_use]
    pub fn process() -> &'static Self {
        &PROCESS_LOGGERS
    }

    /// Returns the current sink, building the default one when empty.
    #[must_use]
    pub fn get(&self) -> Arc<dyn Logger> {
        let mut slot = self.lock();
        Arc::clone(slot.get_or_insert_with(|| (self.factory)()))
    }

    /// Replaces the current sink. `None` re-arms lazy default construction.
    pub fn set(&self, logger: Option<Arc<dyn Logger>>) {
        *self.lock() = logger;
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<dyn Logger>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoggerRegistry")
            .field("slot", &*self.lock())
            .finish_non_exhaustive()
    }
}

/// Returns the process-wide default sink.
#[must_use]
pub fn process_logger() -> Arc<dyn Logger> {
    LoggerRegistry::process().get()
}

/// Replaces the process-wide default sink.
pub fn set_process_logger(logger: Option<Arc<dyn Logger>>) {
    LoggerRegistry::process().set(logger);
}
