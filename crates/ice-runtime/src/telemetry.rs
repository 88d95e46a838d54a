//! Process-wide `tracing` subscriber installation.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use ice_config::{LogFormat, LogSettings, Properties, TELEMETRY_ENABLED};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned once telemetry has been installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter directive did not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Another global subscriber was already installed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global subscriber when `Ice.Telemetry` is positive.
///
/// Returns `Ok(None)` when telemetry is not requested. The filter and format
/// come from `Ice.Telemetry.Filter` and `Ice.Telemetry.Format`. Only the first
/// successful installation takes effect; later communicators get a handle
/// whatever settings they carry. A failed attempt leaves the guard unset so a
/// corrected configuration can retry.
pub fn initialise(properties: &Properties) -> Result<Option<TelemetryHandle>, TelemetryError> {
    if properties.get_property_as_int_with_default(TELEMETRY_ENABLED, 0) <= 0 {
        return Ok(None);
    }
    let settings = LogSettings::from_properties(properties);
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(&settings))
        .map(|_| Some(TelemetryHandle))
}

fn install_subscriber(settings: &LogSettings) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&settings.filter)
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match settings.format {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
