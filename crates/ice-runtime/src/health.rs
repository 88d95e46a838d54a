//! Structured health reporting for bootstrap lifecycle events.

use std::fmt;
use std::sync::Arc;

use ice_config::{PROGRAM_NAME_PROPERTY, Properties};

use crate::bootstrap::BootstrapError;
use crate::communicator::{Communicator, SetupError};

/// Entry point through which a bootstrap was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapForm {
    /// Argument count plus slot array.
    Argv,
    /// Caller-owned argument sequence.
    Sequence,
    /// Initialisation data only, no argument handling.
    InitializationData,
}

impl fmt::Display for BootstrapForm {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Argv => "argv",
            Self::Sequence => "sequence",
            Self::InitializationData => "initialization_data",
        };
        formatter.write_str(label)
    }
}

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before the version gate runs.
    fn bootstrap_starting(&self, form: BootstrapForm);

    /// Invoked once the properties for the new communicator are resolved.
    fn properties_loaded(&self, properties: &Properties);

    /// Invoked when a usable communicator is handed to the caller.
    fn bootstrap_succeeded(&self, communicator: &Communicator);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when a constructed communicator is released because its setup
    /// failed.
    fn communicator_released(&self, error: &SetupError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self, form: BootstrapForm) {
        (**self).bootstrap_starting(form);
    }

    fn properties_loaded(&self, properties: &Properties) {
        (**self).properties_loaded(properties);
    }

    fn bootstrap_succeeded(&self, communicator: &Communicator) {
        (**self).bootstrap_succeeded(communicator);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn communicator_released(&self, error: &SetupError) {
        (**self).communicator_released(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self, form: BootstrapForm) {
        tracing::debug!(
            target: "ice::health",
            event = "bootstrap_starting",
            form = %form,
            "starting communicator bootstrap"
        );
    }

    fn properties_loaded(&self, properties: &Properties) {
        tracing::debug!(
            target: "ice::health",
            event = "properties_loaded",
            count = properties.len(),
            program = properties.get_property(PROGRAM_NAME_PROPERTY),
            "properties resolved"
        );
    }

    fn bootstrap_succeeded(&self, communicator: &Communicator) {
        tracing::info!(
            target: "ice::health",
            event = "bootstrap_succeeded",
            properties = communicator.properties().len(),
            encoding = %communicator.default_encoding(),
            "communicator bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "ice::health",
            event = "bootstrap_failed",
            error = %error,
            "communicator bootstrap failed"
        );
    }

    fn communicator_released(&self, error: &SetupError) {
        tracing::warn!(
            target: "ice::health",
            event = "communicator_released",
            reason = %error.message(),
            "released communicator after failed setup"
        );
    }
}
