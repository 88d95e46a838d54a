//! Thread start and stop notification.
//!
//! A hook reaches an engine in one of two ways:
//! [`InitializationData::thread_hook`](crate::InitializationData) before the
//! communicator exists, or [`ThreadHookPlugin`] once it does. Engines call
//! [`ThreadNotification::start`] when their dispatch thread becomes live and
//! [`ThreadNotification::stop`] when it ends, so every `start` is matched by
//! one `stop`.

use std::fmt;
use std::sync::Arc;

use crate::bootstrap::BootstrapError;
use crate::communicator::Communicator;

/// Observer of the runtime's thread lifecycle.
pub trait ThreadNotification: Send + Sync {
    /// Called on the thread that has just started.
    fn start(&self);

    /// Called on the thread that is about to stop.
    fn stop(&self);
}

impl fmt::Debug for dyn ThreadNotification {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("ThreadNotification")
    }
}

/// Plug-in that installs a thread hook on a communicator after bootstrap.
///
/// A hook installed while the engine is running is started straight away.
/// The hook it replaces, if any, is stopped first.
#[derive(Debug)]
pub struct ThreadHookPlugin {
    hook: Arc<dyn ThreadNotification>,
}

impl ThreadHookPlugin {
    /// Installs `hook` on `communicator`.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::InvalidArgument`] when no communicator is
    /// given or when it has already been destroyed.
    pub fn new(
        communicator: Option<&Communicator>,
        hook: Arc<dyn ThreadNotification>,
    ) -> Result<Self, BootstrapError> {
        let communicator = communicator.ok_or_else(|| {
            BootstrapError::InvalidArgument("communicator cannot be null".to_owned())
        })?;
        if communicator.is_destroyed() {
            return Err(BootstrapError::InvalidArgument(
                "communicator has been destroyed".to_owned(),
            ));
        }
        communicator.install_thread_hook(Arc::clone(&hook));
        Ok(Self { hook })
    }

    /// The installed hook.
    #[must_use]
    pub fn hook(&self) -> &Arc<dyn ThreadNotification> {
        &self.hook
    }
}
