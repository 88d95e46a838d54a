//! BDD test world: owns the collaborators, the caller's arguments and the
//! bootstrap outcome for step functions.

use std::cell::RefCell;
use std::fs;
use std::sync::Arc;

use ice_config::Properties;
use tempfile::TempDir;

use crate::bootstrap::{Bootstrap, BootstrapError, InitializationData};
use crate::communicator::Communicator;
use crate::logger::{Logger, LoggerRegistry};
use crate::version::{IntVersion, RUNTIME_VERSION};

use super::engine::ScriptedEngineFactory;
use super::loader::TestPropertiesLoader;
use super::reporter::RecordingHealthReporter;
use super::tokens;

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    temp_dir: TempDir,
    pub loader: TestPropertiesLoader,
    pub factory: ScriptedEngineFactory,
    pub reporter: Arc<RecordingHealthReporter>,
    pub loggers: LoggerRegistry,
    pub argc: usize,
    pub argv: Vec<Option<String>>,
    pub args: Vec<String>,
    pub init: InitializationData,
    pub version: IntVersion,
    communicator: Option<Communicator>,
    error: Option<BootstrapError>,
}

impl TestWorld {
    /// Builds a world with a healthy loader and engine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temporary directory"),
            loader: TestPropertiesLoader::default(),
            factory: ScriptedEngineFactory::default(),
            reporter: Arc::new(RecordingHealthReporter::default()),
            loggers: LoggerRegistry::new(),
            argc: 0,
            argv: Vec::new(),
            args: Vec::new(),
            init: InitializationData::default(),
            version: RUNTIME_VERSION,
            communicator: None,
            error: None,
        }
    }

    /// Replaces the argument array with `line` followed by a sentinel slot.
    pub fn set_argument_array(&mut self, line: &str) {
        let args = tokens(line);
        self.argc = args.len();
        self.argv = args.into_iter().map(Some).chain([None]).collect();
    }

    /// Writes a property file holding one entry and returns its path.
    pub fn write_config(&self, key: &str, value: &str) -> String {
        let path = self.temp_dir.path().join("config");
        fs::write(&path, format!("{key} = {value}\n")).expect("failed to write configuration");
        path.to_str()
            .expect("temporary path was not valid UTF-8")
            .to_owned()
    }

    /// Sets a property in the initialisation data.
    pub fn set_init_property(&mut self, key: &str, value: &str) {
        self.init
            .properties
            .get_or_insert_with(Properties::new)
            .set_property(key, value);
    }

    /// Runs the argument-array bootstrap.
    pub fn bootstrap_argv(&mut self) {
        let bootstrap = Bootstrap::new(
            &self.loader,
            &self.factory,
            self.reporter.clone(),
            &self.loggers,
        );
        let result = bootstrap.initialize_argv(
            &mut self.argc,
            &mut self.argv,
            self.init.clone(),
            self.version,
        );
        self.record(result);
    }

    /// Runs the sequence bootstrap.
    pub fn bootstrap_args(&mut self) {
        let bootstrap = Bootstrap::new(
            &self.loader,
            &self.factory,
            self.reporter.clone(),
            &self.loggers,
        );
        let result = bootstrap.initialize_args(&mut self.args, self.init.clone(), self.version);
        self.record(result);
    }

    /// Runs the initialisation-data bootstrap.
    pub fn bootstrap_with(&mut self) {
        let bootstrap = Bootstrap::new(
            &self.loader,
            &self.factory,
            self.reporter.clone(),
            &self.loggers,
        );
        let result = bootstrap.initialize_with(self.init.clone(), self.version);
        self.record(result);
    }

    /// Replaces the registry's sink.
    pub fn set_process_sink(&self, logger: Arc<dyn Logger>) {
        self.loggers.set(Some(logger));
    }

    /// Live prefix of the argument array.
    #[must_use]
    pub fn live_arguments(&self) -> Vec<String> {
        self.argv
            .iter()
            .take(self.argc)
            .map(|slot| slot.clone().unwrap_or_default())
            .collect()
    }

    #[must_use]
    pub fn communicator(&self) -> Option<&Communicator> {
        self.communicator.as_ref()
    }

    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.error.as_ref()
    }

    fn record(&mut self, result: Result<Communicator, BootstrapError>) {
        match result {
            Ok(communicator) => self.communicator = Some(communicator),
            Err(error) => self.error = Some(error),
        }
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default test world fixture.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
