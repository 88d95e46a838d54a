//! Communicator bootstrap orchestration.
//!
//! All entry points run the version gate first, then resolve properties,
//! construct the communicator and complete its setup. The argument forms
//! consume recognised options from the caller's arguments; the
//! initialisation-data form touches neither arguments nor configuration
//! files.

use std::sync::Arc;

use ice_config::{CONFIG_ENV_VAR, ConfigError, Properties};
use thiserror::Error;

use crate::args::{ArgVector, args_to_string_seq, string_seq_to_args};
use crate::communicator::{
    Communicator, CommunicatorInner, CommunicatorState, EngineFactory, SetupError,
};
use crate::engine::LocalEngineFactory;
use crate::health::{BootstrapForm, HealthReporter, StructuredHealthReporter};
use crate::logger::{Logger, LoggerRegistry};
use crate::thread_hook::ThreadNotification;
use crate::version::{IntVersion, VersionMismatch, check_version};

const BOOTSTRAP_TARGET: &str = "ice::bootstrap";

/// Trait abstracting property creation for testability.
pub trait PropertiesLoader: Send + Sync {
    /// Builds properties from `args` layered over `defaults`, removing the
    /// options it recognises from `args`.
    fn create(
        &self,
        args: &mut Vec<String>,
        defaults: Option<Properties>,
    ) -> Result<Properties, ConfigError>;
}

/// Loader that delegates to [`Properties::from_args`], consulting the
/// `ICE_CONFIG` environment variable.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPropertiesLoader;

impl PropertiesLoader for SystemPropertiesLoader {
    fn create(
        &self,
        args: &mut Vec<String>,
        defaults: Option<Properties>,
    ) -> Result<Properties, ConfigError> {
        let config_env = std::env::var(CONFIG_ENV_VAR).ok();
        Properties::from_args(args, defaults, config_env.as_deref())
    }
}

/// Caller-supplied inputs for a new communicator.
#[derive(Debug, Clone, Default)]
pub struct InitializationData {
    /// Base properties. The argument forms layer files and options on top.
    pub properties: Option<Properties>,
    /// Sink for this communicator. Defaults to the registry's current sink.
    pub logger: Option<Arc<dyn Logger>>,
    /// Hook notified when the engine's dispatch thread starts and stops.
    pub thread_hook: Option<Arc<dyn ThreadNotification>>,
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The caller's interface version is not served by this runtime.
    #[error(transparent)]
    VersionMismatch(#[from] VersionMismatch),
    /// A required argument is missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Properties could not be created.
    #[error("failed to create properties: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: ConfigError,
    },
    /// The engine failed to complete setup; the communicator was released.
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Bootstrap orchestrator bound to its collaborators.
pub struct Bootstrap<'a> {
    loader: &'a dyn PropertiesLoader,
    factory: &'a dyn EngineFactory,
    reporter: Arc<dyn HealthReporter>,
    loggers: &'a LoggerRegistry,
}

impl Default for Bootstrap<'static> {
    fn default() -> Self {
        Self {
            loader: &SystemPropertiesLoader,
            factory: &LocalEngineFactory,
            reporter: Arc::new(StructuredHealthReporter),
            loggers: LoggerRegistry::process(),
        }
    }
}

impl<'a> Bootstrap<'a> {
    /// Builds an orchestrator from explicit collaborators.
    #[must_use]
    pub fn new(
        loader: &'a dyn PropertiesLoader,
        factory: &'a dyn EngineFactory,
        reporter: Arc<dyn HealthReporter>,
        loggers: &'a LoggerRegistry,
    ) -> Self {
        Self {
            loader,
            factory,
            reporter,
            loggers,
        }
    }

    /// Bootstraps from an argument array.
    ///
    /// Options consumed by the loader and by the engine are removed from
    /// `argv` and `argc` is updated. Removals made by the engine stay
    /// visible even when setup fails.
    pub fn initialize_argv(
        &self,
        argc: &mut usize,
        argv: &mut [Option<String>],
        init: InitializationData,
        version: IntVersion,
    ) -> Result<Communicator, BootstrapError> {
        self.reporter.bootstrap_starting(BootstrapForm::Argv);
        let result = self.run_argv(argc, argv, init, version);
        self.report(result)
    }

    /// Bootstraps from an argument sequence, writing the unconsumed
    /// arguments back into `args`.
    pub fn initialize_args(
        &self,
        args: &mut Vec<String>,
        init: InitializationData,
        version: IntVersion,
    ) -> Result<Communicator, BootstrapError> {
        self.reporter.bootstrap_starting(BootstrapForm::Sequence);
        let mut vector = ArgVector::new(args);
        let result = {
            let (argc, argv) = vector.parts_mut();
            self.run_argv(argc, argv, init, version)
        };
        *args = vector.to_sequence();
        self.report(result)
    }

    /// Bootstraps from initialisation data alone.
    ///
    /// No configuration file is read and no argument is parsed; properties
    /// default to an empty set.
    pub fn initialize_with(
        &self,
        init: InitializationData,
        version: IntVersion,
    ) -> Result<Communicator, BootstrapError> {
        self.reporter
            .bootstrap_starting(BootstrapForm::InitializationData);
        let result = self.run_with(init, version);
        self.report(result)
    }

    /// Creates properties from an argument array, removing the consumed
    /// options from it.
    pub fn create_properties_argv(
        &self,
        argc: &mut usize,
        argv: &mut [Option<String>],
        defaults: Option<Properties>,
    ) -> Result<Properties, BootstrapError> {
        validate_arguments(*argc, argv)?;
        let mut args = args_to_string_seq(*argc, argv);
        let properties = self
            .loader
            .create(&mut args, defaults)
            .map_err(|source| BootstrapError::Configuration { source })?;
        tracing::debug!(
            target: BOOTSTRAP_TARGET,
            consumed = argc.saturating_sub(args.len()),
            remaining = args.len(),
            "runtime options consumed"
        );
        string_seq_to_args(&args, argc, argv);
        Ok(properties)
    }

    fn run_argv(
        &self,
        argc: &mut usize,
        argv: &mut [Option<String>],
        init: InitializationData,
        version: IntVersion,
    ) -> Result<Communicator, BootstrapError> {
        check_version(version)?;
        let properties = self.create_properties_argv(argc, argv, init.properties)?;
        self.reporter.properties_loaded(&properties);

        let inner = self.construct(properties, init.logger, init.thread_hook);
        let mut args = args_to_string_seq(*argc, argv);
        let result = self.finish_setup(inner, &mut args);
        string_seq_to_args(&args, argc, argv);
        result
    }

    fn run_with(
        &self,
        init: InitializationData,
        version: IntVersion,
    ) -> Result<Communicator, BootstrapError> {
        check_version(version)?;
        let properties = init.properties.unwrap_or_default();
        self.reporter.properties_loaded(&properties);

        let inner = self.construct(properties, init.logger, init.thread_hook);
        self.finish_setup(inner, &mut Vec::new())
    }

    fn construct(
        &self,
        properties: Properties,
        logger: Option<Arc<dyn Logger>>,
        thread_hook: Option<Arc<dyn ThreadNotification>>,
    ) -> CommunicatorInner {
        let logger = logger.unwrap_or_else(|| self.loggers.get());
        let mut state = CommunicatorState::new(properties, logger);
        state.thread_hook = thread_hook;
        CommunicatorInner::construct(state, self.factory)
    }

    // `inner` owns the engine until setup succeeds. Any exit before that,
    // including unwinding, drops it and destroys the engine exactly once.
    fn finish_setup(
        &self,
        mut inner: CommunicatorInner,
        args: &mut Vec<String>,
    ) -> Result<Communicator, BootstrapError> {
        match inner.finish_setup(args) {
            Ok(()) => Ok(Communicator::from_inner(inner)),
            Err(error) => {
                drop(inner);
                self.reporter.communicator_released(&error);
                Err(BootstrapError::Setup(error))
            }
        }
    }

    fn report(
        &self,
        result: Result<Communicator, BootstrapError>,
    ) -> Result<Communicator, BootstrapError> {
        match &result {
            Ok(communicator) => self.reporter.bootstrap_succeeded(communicator),
            Err(error) => self.reporter.bootstrap_failed(error),
        }
        result
    }
}

fn validate_arguments(argc: usize, argv: &[Option<String>]) -> Result<(), BootstrapError> {
    if argc > argv.len() {
        return Err(BootstrapError::InvalidArgument(format!(
            "argument count {argc} exceeds the {} available slots",
            argv.len()
        )));
    }
    if let Some(index) = argv.iter().take(argc).position(Option::is_none) {
        return Err(BootstrapError::InvalidArgument(format!(
            "argument slot {index} is empty"
        )));
    }
    Ok(())
}

/// Bootstraps from an argument array with the default collaborators.
pub fn initialize_argv(
    argc: &mut usize,
    argv: &mut [Option<String>],
    init: InitializationData,
    version: IntVersion,
) -> Result<Communicator, BootstrapError> {
    Bootstrap::default().initialize_argv(argc, argv, init, version)
}

/// Bootstraps from an argument sequence with the default collaborators.
pub fn initialize_args(
    args: &mut Vec<String>,
    init: InitializationData,
    version: IntVersion,
) -> Result<Communicator, BootstrapError> {
    Bootstrap::default().initialize_args(args, init, version)
}

/// Bootstraps from initialisation data with the default collaborators.
pub fn initialize_with(
    init: InitializationData,
    version: IntVersion,
) -> Result<Communicator, BootstrapError> {
    Bootstrap::default().initialize_with(init, version)
}

/// Creates properties from an argument sequence with the system loader.
pub fn create_properties(
    args: &mut Vec<String>,
    defaults: Option<Properties>,
) -> Result<Properties, ConfigError> {
    SystemPropertiesLoader.create(args, defaults)
}

/// Creates properties from an argument array with the system loader.
pub fn create_properties_argv(
    argc: &mut usize,
    argv: &mut [Option<String>],
    defaults: Option<Properties>,
) -> Result<Properties, BootstrapError> {
    Bootstrap::default().create_properties_argv(argc, argv, defaults)
}
