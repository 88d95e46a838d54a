use strum::{Display, EnumString};

use crate::Properties;
use crate::defaults::{DEFAULT_LOG_FILTER, TELEMETRY_FILTER, TELEMETRY_FORMAT};

/// Output formats understood by the telemetry subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Telemetry settings resolved from a property set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `tracing` filter directive, e.g. `info` or `ice=debug`.
    pub filter: String,
    /// Requested output format.
    pub format: LogFormat,
}

impl LogSettings {
    /// Reads `Ice.Telemetry.Filter` and `Ice.Telemetry.Format`.
    ///
    /// An unrecognised format falls back to [`LogFormat::default`] and is
    /// reported with a warning rather than failing setup.
    #[must_use]
    pub fn from_properties(properties: &Properties) -> Self {
        let filter = properties.get_property_with_default(TELEMETRY_FILTER, DEFAULT_LOG_FILTER);
        let raw_format = properties.get_property(TELEMETRY_FORMAT);
        let format = if raw_format.is_empty() {
            LogFormat::default()
        } else {
            raw_format.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    target: "ice::config",
                    key = TELEMETRY_FORMAT,
                    value = %raw_format,
                    "unknown log format, using default"
                );
                LogFormat::default()
            })
        };
        Self { filter, format }
    }
}
