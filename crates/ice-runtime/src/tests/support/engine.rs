//! Scripted engine that records lifecycle calls for assertions.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::communicator::{CommunicatorState, Engine, EngineFactory, SetupError};
use crate::engine::LocalEngine;
use crate::logger::Logger;
use crate::thread_hook::ThreadNotification;

/// Calls observed across every engine built by one factory.
#[derive(Debug, Default)]
pub struct EngineLedger {
    pub constructed: usize,
    pub destroyed: usize,
    pub setup_args: Vec<Vec<String>>,
    pub bound_loggers: Vec<Arc<dyn Logger>>,
    pub installed_hooks: usize,
}

/// Factory whose engines strip configured tokens and optionally fail.
///
/// With [`ScriptedEngineFactory::wrap_local`] the scripted steps are skipped
/// and each engine delegates to a [`LocalEngine`] while still recording.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEngineFactory {
    ledger: Arc<Mutex<EngineLedger>>,
    consume: Vec<String>,
    failure: Option<String>,
    local: bool,
}

impl ScriptedEngineFactory {
    /// Makes every engine remove `token` from the arguments during setup.
    pub fn consume(&mut self, token: impl Into<String>) {
        self.consume.push(token.into());
    }

    /// Makes every engine fail setup with `message` after consuming tokens.
    pub fn fail_with(&mut self, message: impl Into<String>) {
        self.failure = Some(message.into());
    }

    /// Makes every engine delegate setup and destroy to a [`LocalEngine`].
    pub fn wrap_local(&mut self) {
        self.local = true;
    }

    /// Locks the shared ledger.
    pub fn ledger(&self) -> MutexGuard<'_, EngineLedger> {
        self.ledger.lock().expect("engine ledger mutex poisoned")
    }
}

impl EngineFactory for ScriptedEngineFactory {
    fn construct(&self, state: &CommunicatorState) -> Box<dyn Engine> {
        let mut ledger = self.ledger();
        ledger.constructed += 1;
        ledger.bound_loggers.push(Arc::clone(&state.logger));
        Box::new(ScriptedEngine {
            ledger: Arc::clone(&self.ledger),
            consume: self.consume.clone(),
            failure: self.failure.clone(),
            local: self.local.then(LocalEngine::default),
        })
    }
}

struct ScriptedEngine {
    ledger: Arc<Mutex<EngineLedger>>,
    consume: Vec<String>,
    failure: Option<String>,
    local: Option<LocalEngine>,
}

impl ScriptedEngine {
    fn record(&self) -> MutexGuard<'_, EngineLedger> {
        self.ledger.lock().expect("engine ledger mutex poisoned")
    }
}

impl Engine for ScriptedEngine {
    fn finish_setup(
        &mut self,
        args: &mut Vec<String>,
        state: &mut CommunicatorState,
    ) -> Result<(), SetupError> {
        self.record().setup_args.push(args.clone());
        if let Some(local) = &mut self.local {
            return local.finish_setup(args, state);
        }
        args.retain(|arg| !self.consume.contains(arg));
        match &self.failure {
            Some(message) => Err(SetupError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn install_thread_hook(&mut self, hook: Arc<dyn ThreadNotification>) {
        self.record().installed_hooks += 1;
        if let Some(local) = &mut self.local {
            local.install_thread_hook(hook);
        }
    }

    fn destroy(&mut self) {
        self.record().destroyed += 1;
        if let Some(local) = &mut self.local {
            local.destroy();
        }
    }
}
