//! Communicator bootstrap runtime.
//!
//! The crate turns raw process arguments and caller-supplied configuration
//! into a live [`Communicator`]. Bootstrap runs in a fixed order: the
//! caller's interface version is checked against [`RUNTIME_VERSION`],
//! properties are resolved through a [`PropertiesLoader`], the communicator is
//! constructed with the diagnostic sink from the [`LoggerRegistry`], and its
//! [`Engine`] completes setup. Options consumed along the way are removed
//! from the caller's arguments.
//!
//! A communicator whose setup fails is released before the error reaches the
//! caller, so no half-built handle escapes. Health reporting hooks emit
//! structured telemetry at each stage.
//!
//! Byte streams bound to a communicator are created through the factories in
//! [`stream`].

mod args;
mod bootstrap;
mod cli;
mod communicator;
mod engine;
mod health;
mod logger;
pub mod stream;
pub mod telemetry;
mod thread_hook;
mod version;

pub use args::{ArgVector, args_to_string_seq, compact, string_seq_to_args};
pub use bootstrap::{
    Bootstrap, BootstrapError, InitializationData, PropertiesLoader, SystemPropertiesLoader,
    create_properties, create_properties_argv, initialize_args, initialize_argv, initialize_with,
};
pub use cli::run;
pub use communicator::{
    Communicator, CommunicatorState, ENCODING_1_0, ENCODING_1_1, EncodingVersion, Engine,
    EngineFactory, ParseEncodingError, SetupError,
};
pub use engine::{LocalEngine, LocalEngineFactory};
pub use health::{BootstrapForm, HealthReporter, StructuredHealthReporter};
pub use logger::{Logger, LoggerRegistry, TracingLogger, process_logger, set_process_logger};
pub use stream::{InputStream, OutputStream, StreamError};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use thread_hook::{ThreadHookPlugin, ThreadNotification};
pub use version::{
    IntVersion, RUNTIME_VERSION, VersionMismatch, VersionPolicy, check_compatibility,
    check_version,
};

#[cfg(test)]
mod tests;
