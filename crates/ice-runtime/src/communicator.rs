//! Communicator handle and the engine seam behind it.
//!
//! A communicator is built in two phases. Construction binds the properties
//! and the diagnostic sink and asks an [`EngineFactory`] for the engine; it
//! cannot fail. [`Engine::finish_setup`] then completes the engine and may
//! fail. The engine is destroyed exactly once: when [`Communicator::destroy`]
//! is called, when the last handle is dropped, or when setup fails before any
//! handle exists.

use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use ice_config::Properties;
use thiserror::Error;

use crate::logger::Logger;
use crate::thread_hook::ThreadNotification;

/// Version of the marshaling encoding used by streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodingVersion {
    pub major: u8,
    pub minor: u8,
}

/// The 1.0 encoding.
pub const ENCODING_1_0: EncodingVersion = EncodingVersion { major: 1, minor: 0 };

/// The 1.1 encoding, used unless configured otherwise.
pub const ENCODING_1_1: EncodingVersion = EncodingVersion { major: 1, minor: 1 };

impl Default for EncodingVersion {
    fn default() -> Self {
        ENCODING_1_1
    }
}

impl fmt::Display for EncodingVersion {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}.{}", self.major, self.minor)
    }
}

/// Error returned when an encoding version string is malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed encoding version '{0}', expected <major>.<minor>")]
pub struct ParseEncodingError(String);

impl FromStr for EncodingVersion {
    type Err = ParseEncodingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseEncodingError(value.to_owned());
        let (major, minor) = value.trim().split_once('.').ok_or_else(malformed)?;
        Ok(Self {
            major: major.parse().map_err(|_| malformed())?,
            minor: minor.parse().map_err(|_| malformed())?,
        })
    }
}

/// State bound to a communicator at construction and completed during setup.
#[derive(Debug, Clone)]
pub struct CommunicatorState {
    /// Properties resolved for this communicator.
    pub properties: Properties,
    /// Sink captured at construction.
    pub logger: Arc<dyn Logger>,
    /// Encoding used by streams that do not name one.
    pub default_encoding: EncodingVersion,
    /// Thread hook supplied through the initialisation data.
    pub thread_hook: Option<Arc<dyn ThreadNotification>>,
}

impl CommunicatorState {
    /// Builds the state with the default encoding.
    #[must_use]
    pub fn new(properties: Properties, logger: Arc<dyn Logger>) -> Self {
        Self {
            properties,
            logger,
            default_encoding: EncodingVersion::default(),
            thread_hook: None,
        }
    }
}

/// Opaque failure reported by [`Engine::finish_setup`].
#[derive(Debug, Error)]
#[error("communicator setup failed: {message}")]
pub struct SetupError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl SetupError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error wrapping an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Dispatch engine driven by a communicator.
#[cfg_attr(test, mockall::automock)]
pub trait Engine: Send {
    /// Completes setup. `args` holds the live process arguments; the engine
    /// removes the tokens it consumes. Removals are kept even on failure.
    fn finish_setup(
        &mut self,
        args: &mut Vec<String>,
        state: &mut CommunicatorState,
    ) -> Result<(), SetupError>;

    /// Replaces the engine's thread hook after setup.
    fn install_thread_hook(&mut self, hook: Arc<dyn ThreadNotification>);

    /// Releases engine resources. Called exactly once per engine.
    fn destroy(&mut self);
}

/// Builds engines for new communicators.
pub trait EngineFactory: Send + Sync {
    /// Allocates an engine for `state`. Construction cannot fail.
    fn construct(&self, state: &CommunicatorState) -> Box<dyn Engine>;
}

pub(crate) struct CommunicatorInner {
    state: CommunicatorState,
    engine: Mutex<Box<dyn Engine>>,
    destroyed: AtomicBool,
}

impl CommunicatorInner {
    pub(crate) fn construct(state: CommunicatorState, factory: &dyn EngineFactory) -> Self {
        let engine = factory.construct(&state);
        Self {
            state,
            engine: Mutex::new(engine),
            destroyed: AtomicBool::new(false),
        }
    }

    pub(crate) fn finish_setup(&mut self, args: &mut Vec<String>) -> Result<(), SetupError> {
        let engine = self
            .engine
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        engine.finish_setup(args, &mut self.state)
    }

    fn install_thread_hook(&self, hook: Arc<dyn ThreadNotification>) {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        engine.install_thread_hook(hook);
    }

    fn release(&self) -> bool {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return false;
        }
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        engine.destroy();
        true
    }
}

impl Drop for CommunicatorInner {
    fn drop(&mut self) {
        self.release();
    }
}

/// Handle to a live communicator. Clones share the same instance.
#[derive(Clone)]
pub struct Communicator {
    inner: Arc<CommunicatorInner>,
}

impl Communicator {
    pub(crate) fn from_inner(inner: CommunicatorInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Properties resolved during bootstrap.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.inner.state.properties
    }

    /// Diagnostic sink bound at construction.
    #[must_use]
    pub fn logger(&self) -> Arc<dyn Logger> {
        Arc::clone(&self.inner.state.logger)
    }

    /// Encoding used by streams that do not name one.
    #[must_use]
    pub fn default_encoding(&self) -> EncodingVersion {
        self.inner.state.default_encoding
    }

    /// Destroys the engine. Returns `false` if it was already destroyed.
    pub fn destroy(&self) -> bool {
        self.inner.release()
    }

    /// Returns `true` once the engine has been destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::SeqCst)
    }

    pub(crate) fn install_thread_hook(&self, hook: Arc<dyn ThreadNotification>) {
        self.inner.install_thread_hook(hook);
    }

    /// Returns `true` when both handles refer to the same communicator.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }
}

impl fmt::Debug for Communicator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Communicator")
            .field("properties", &self.inner.state.properties.len())
            .field("default_encoding", &self.inner.state.default_encoding)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
