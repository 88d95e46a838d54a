use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while building or querying a property set.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file named by `Ice.Config` or `ICE_CONFIG` could not
    /// be read.
    #[error("failed to read configuration file '{path}': {source}")]
    ReadFile {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A property expected to hold an integer held something else.
    #[error("property '{key}' has non-integer value '{value}'")]
    InvalidInteger { key: String, value: String },
}
