//! Properties loaders for scenarios covering success and failure paths.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use camino::Utf8PathBuf;
use ice_config::{ConfigError, Properties};

use crate::bootstrap::PropertiesLoader;

/// Loader that layers properties like the system loader but takes the
/// configuration-file fallback from a field instead of the environment.
#[derive(Debug, Default)]
pub struct TestPropertiesLoader {
    config_env: Option<String>,
    calls: AtomicUsize,
}

impl TestPropertiesLoader {
    /// Names the configuration file used when `Ice.Config` is absent.
    pub fn set_config_env(&mut self, path: impl Into<String>) {
        self.config_env = Some(path.into());
    }

    /// Number of `create` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PropertiesLoader for TestPropertiesLoader {
    fn create(
        &self,
        args: &mut Vec<String>,
        defaults: Option<Properties>,
    ) -> Result<Properties, ConfigError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Properties::from_args(args, defaults, self.config_env.as_deref())
    }
}

/// Loader that always reports an unreadable configuration file.
#[derive(Debug, Default)]
pub struct FailingPropertiesLoader;

impl PropertiesLoader for FailingPropertiesLoader {
    fn create(
        &self,
        _args: &mut Vec<String>,
        _defaults: Option<Properties>,
    ) -> Result<Properties, ConfigError> {
        Err(ConfigError::ReadFile {
            path: Utf8PathBuf::from("missing.cfg"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        })
    }
}
