//! Reserved property names and built-in defaults.

/// Property listing the configuration files loaded at start-up.
pub const CONFIG_PROPERTY: &str = "Ice.Config";

/// Environment variable consulted when `Ice.Config` is not given.
pub const CONFIG_ENV_VAR: &str = "ICE_CONFIG";

/// Property holding the program name, taken from `argv[0]` when unset.
pub const PROGRAM_NAME_PROPERTY: &str = "Ice.ProgramName";

/// Property selecting the default encoding for streams.
pub const DEFAULT_ENCODING_PROPERTY: &str = "Ice.Default.EncodingVersion";

/// Prefix of the properties that register plug-ins.
pub const PLUGIN_PREFIX: &str = "Ice.Plugin.";

/// A positive value asks the local engine to install the telemetry subscriber.
pub const TELEMETRY_ENABLED: &str = "Ice.Telemetry";

/// `tracing` filter directive used by the telemetry subscriber.
pub const TELEMETRY_FILTER: &str = "Ice.Telemetry.Filter";

/// Output format used by the telemetry subscriber.
pub const TELEMETRY_FORMAT: &str = "Ice.Telemetry.Format";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Command-line prefixes owned by the runtime and its services.
///
/// Options such as `--Ice.Trace.Network=2` or `--IceSSL.Verify=0` are
/// consumed from the argument list when properties are created.
pub const RESERVED_PREFIXES: &[&str] = &[
    "Ice",
    "IceBox",
    "IceGrid",
    "IcePatch2",
    "IceSSL",
    "IceStorm",
    "Freeze",
    "Glacier2",
];
