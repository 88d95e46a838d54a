//! Property configuration shared by the runtime and its tools.
//!
//! A [`Properties`] value is the configuration object threaded through
//! communicator bootstrap. It is assembled from caller defaults, property
//! files and `--Prefix.Key=Value` command-line options; see
//! [`Properties::from_args`] for the precedence rules.

mod defaults;
mod error;
mod logging;
mod properties;

pub use defaults::{
    CONFIG_ENV_VAR, CONFIG_PROPERTY, DEFAULT_ENCODING_PROPERTY, DEFAULT_LOG_FILTER, PLUGIN_PREFIX,
    PROGRAM_NAME_PROPERTY, RESERVED_PREFIXES, TELEMETRY_ENABLED, TELEMETRY_FILTER,
    TELEMETRY_FORMAT,
};
pub use error::ConfigError;
pub use logging::{LogFormat, LogSettings};
pub use properties::Properties;
