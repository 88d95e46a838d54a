//! Default in-process engine.
//!
//! The local engine performs the setup steps that belong to the runtime
//! itself rather than to a transport: it lets registered plug-ins consume
//! their command-line options, resolves the default encoding and installs
//! telemetry when asked to. Once setup succeeds its dispatch thread counts as
//! started for the thread hook.

use std::sync::Arc;

use ice_config::{DEFAULT_ENCODING_PROPERTY, PLUGIN_PREFIX};

use crate::communicator::{CommunicatorState, Engine, EngineFactory, SetupError};
use crate::telemetry;
use crate::thread_hook::ThreadNotification;

const ENGINE_TARGET: &str = "ice::engine";

/// Factory for [`LocalEngine`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalEngineFactory;

impl EngineFactory for LocalEngineFactory {
    fn construct(&self, _state: &CommunicatorState) -> Box<dyn Engine> {
        Box::new(LocalEngine::default())
    }
}

/// Engine that completes setup without opening any endpoint.
#[derive(Debug, Default)]
pub struct LocalEngine {
    plugins: Vec<String>,
    thread_hook: Option<Arc<dyn ThreadNotification>>,
    running: bool,
}

impl LocalEngine {
    /// Names of the plug-ins seen during setup, in property order.
    #[must_use]
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    // `Ice.Plugin.<name>` registers a plug-in whose options use `--<name>.`.
    // Keys with further dots carry per-language entry points and are skipped.
    fn consume_plugin_options(&mut self, args: &mut Vec<String>, state: &mut CommunicatorState) {
        let registered = state.properties.get_properties_for_prefix(PLUGIN_PREFIX);
        for (key, _) in registered.iter() {
            let Some(name) = key.strip_prefix(PLUGIN_PREFIX) else {
                continue;
            };
            if name.is_empty() || name.contains('.') {
                continue;
            }
            state.properties.parse_command_line_options(name, args);
            self.plugins.push(name.to_owned());
        }
    }

    fn resolve_encoding(state: &mut CommunicatorState) -> Result<(), SetupError> {
        let raw = state.properties.get_property(DEFAULT_ENCODING_PROPERTY);
        if raw.is_empty() {
            return Ok(());
        }
        state.default_encoding = raw.parse().map_err(|error| {
            SetupError::with_source(format!("invalid {DEFAULT_ENCODING_PROPERTY}"), error)
        })?;
        Ok(())
    }
}

impl Engine for LocalEngine {
    fn finish_setup(
        &mut self,
        args: &mut Vec<String>,
        state: &mut CommunicatorState,
    ) -> Result<(), SetupError> {
        self.consume_plugin_options(args, state);
        Self::resolve_encoding(state)?;
        let telemetry = telemetry::initialise(&state.properties)
            .map_err(|error| SetupError::with_source("failed to initialise telemetry", error))?;

        if self.thread_hook.is_none() {
            self.thread_hook.clone_from(&state.thread_hook);
        }
        self.running = true;
        if let Some(hook) = &self.thread_hook {
            hook.start();
        }
        tracing::debug!(
            target: ENGINE_TARGET,
            plugins = ?self.plugins,
            encoding = %state.default_encoding,
            telemetry = telemetry.is_some(),
            "local engine ready"
        );
        state.logger.trace(
            "Bootstrap",
            &format!("communicator ready, {} plug-in(s)", self.plugins.len()),
        );
        Ok(())
    }

    fn install_thread_hook(&mut self, hook: Arc<dyn ThreadNotification>) {
        if self.running {
            if let Some(previous) = &self.thread_hook {
                previous.stop();
            }
            hook.start();
        }
        self.thread_hook = Some(hook);
    }

    fn destroy(&mut self) {
        tracing::debug!(
            target: ENGINE_TARGET,
            plugins = ?self.plugins,
            "local engine destroyed"
        );
        if std::mem::take(&mut self.running)
            && let Some(hook) = &self.thread_hook
        {
            hook.stop();
        }
        self.plugins.clear();
    }
}
