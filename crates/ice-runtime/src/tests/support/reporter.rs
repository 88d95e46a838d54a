//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;

use ice_config::Properties;

use crate::bootstrap::BootstrapError;
use crate::communicator::{Communicator, SetupError};
use crate::health::{BootstrapForm, HealthReporter};

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting(BootstrapForm),
    /// Properties resolved, with their count.
    PropertiesLoaded(usize),
    BootstrapSucceeded,
    BootstrapFailed(String),
    /// A communicator was released with the setup failure message.
    CommunicatorReleased(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self, form: BootstrapForm) {
        self.record(HealthEvent::BootstrapStarting(form));
    }

    fn properties_loaded(&self, properties: &Properties) {
        self.record(HealthEvent::PropertiesLoaded(properties.len()));
    }

    fn bootstrap_succeeded(&self, _communicator: &Communicator) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn communicator_released(&self, error: &SetupError) {
        self.record(HealthEvent::CommunicatorReleased(error.message().to_owned()));
    }
}
