//! Ordered key/value property store.
//!
//! Properties are gathered from three layers. Defaults supplied by the caller
//! form the base, configuration files named by `Ice.Config` (or the
//! `ICE_CONFIG` environment variable) override them, and `--Prefix.Key=Value`
//! command-line options override both. Options recognised while building the
//! store are removed from the argument list so the application only sees the
//! arguments it owns.

use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::ConfigError;
use crate::defaults::{CONFIG_PROPERTY, PROGRAM_NAME_PROPERTY, RESERVED_PREFIXES};

const CONFIG_OPTION: &str = "--Ice.Config";

/// A set of string properties keyed by dotted names such as `Ice.Trace.Network`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Creates an empty property set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a property set from process arguments.
    ///
    /// `defaults` seeds the store. `--Ice.Config` options are consumed first;
    /// when none is given and the defaults do not name any files either, the
    /// `config_env` value (normally the `ICE_CONFIG` environment variable) is
    /// consulted. Reserved-prefix options are consumed last so they take
    /// precedence over file contents.
    pub fn from_args(
        args: &mut Vec<String>,
        defaults: Option<Self>,
        config_env: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut properties = defaults.unwrap_or_default();

        let mut config_on_command_line = false;
        args.retain(|arg| {
            if arg != CONFIG_OPTION && !arg.starts_with("--Ice.Config=") {
                return true;
            }
            let option = arg.strip_prefix("--").unwrap_or(arg);
            if option.contains('=') {
                properties.parse_line(option);
            } else {
                properties.parse_line(&format!("{option}=1"));
            }
            config_on_command_line = true;
            false
        });

        if properties.get_property(PROGRAM_NAME_PROPERTY).is_empty()
            && let Some(program) = args.first()
        {
            properties.set_property(PROGRAM_NAME_PROPERTY, program.as_str());
        }

        let load_files =
            config_on_command_line || !properties.entries.contains_key(CONFIG_PROPERTY);
        if load_files {
            properties.load_config_files(config_env)?;
        }

        properties.parse_ice_command_line_options(args);
        Ok(properties)
    }

    fn load_config_files(&mut self, config_env: Option<&str>) -> Result<(), ConfigError> {
        let mut value = self.get_property(CONFIG_PROPERTY).to_owned();
        if value.is_empty() || value == "1" {
            value = config_env.unwrap_or_default().to_owned();
        }
        if value.is_empty() {
            return Ok(());
        }

        let files: Vec<Utf8PathBuf> = value
            .split(',')
            .map(str::trim)
            .filter(|file| !file.is_empty())
            .map(Utf8PathBuf::from)
            .collect();
        for file in &files {
            self.load(file)?;
        }
        self.set_property(CONFIG_PROPERTY, value.as_str());
        Ok(())
    }

    /// Returns the value of `key`, or an empty string when it is unset.
    #[must_use]
    pub fn get_property(&self, key: &str) -> &str {
        self.entries.get(key).map_or("", String::as_str)
    }

    /// Returns the value of `key`, or `default` when it is unset.
    #[must_use]
    pub fn get_property_with_default(&self, key: &str, default: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_owned())
    }

    /// Parses `key` as an integer. Unset keys yield `Ok(None)`.
    pub fn get_property_as_int(&self, key: &str) -> Result<Option<i32>, ConfigError> {
        let Some(value) = self.entries.get(key) else {
            return Ok(None);
        };
        value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidInteger {
                key: key.to_owned(),
                value: value.clone(),
            })
    }

    /// Parses `key` as an integer, falling back to `default` when the key is
    /// unset or malformed.
    #[must_use]
    pub fn get_property_as_int_with_default(&self, key: &str, default: i32) -> i32 {
        match self.get_property_as_int(key) {
            Ok(value) => value.unwrap_or(default),
            Err(error) => {
                tracing::warn!(target: "ice::config", %error, default, "using default value");
                default
            }
        }
    }

    /// Returns every property whose key starts with `prefix`.
    #[must_use]
    pub fn get_properties_for_prefix(&self, prefix: &str) -> Self {
        let entries = self
            .entries
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self { entries }
    }

    /// Sets `key` to `value`. An empty value removes the property.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let key = key.trim();
        if key.is_empty() {
            return;
        }
        let value = value.into();
        if value.is_empty() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_owned(), value);
        }
    }

    /// Renders the store as `--key=value` options.
    #[must_use]
    pub fn get_command_line_options(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(key, value)| format!("--{key}={value}"))
            .collect()
    }

    /// Consumes `--<prefix>.*` options from `args`.
    ///
    /// A bare `--Prefix.Key` is read as `Prefix.Key=1`. Arguments that do not
    /// carry the prefix are left in place, in their original order.
    pub fn parse_command_line_options(&mut self, prefix: &str, args: &mut Vec<String>) {
        let mut option_prefix = format!("--{prefix}");
        if !prefix.is_empty() && !prefix.ends_with('.') {
            option_prefix.push('.');
        }

        args.retain(|arg| {
            if !arg.starts_with(option_prefix.as_str()) {
                return true;
            }
            let option = arg.strip_prefix("--").unwrap_or(arg);
            if option.contains('=') {
                self.parse_line(option);
            } else {
                self.parse_line(&format!("{option}=1"));
            }
            false
        });
    }

    /// Consumes the options of every reserved prefix from `args`.
    pub fn parse_ice_command_line_options(&mut self, args: &mut Vec<String>) {
        for prefix in RESERVED_PREFIXES {
            self.parse_command_line_options(prefix, args);
        }
    }

    /// Loads `key = value` lines from `path`.
    pub fn load(&mut self, path: &Utf8Path) -> Result<(), ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        for line in contents.lines() {
            self.parse_line(line);
        }
        tracing::debug!(target: "ice::config", file = %path, "loaded configuration file");
        Ok(())
    }

    fn parse_line(&mut self, line: &str) {
        let content = line.split_once('#').map_or(line, |(before, _)| before);
        let Some((key, value)) = content.split_once('=') else {
            return;
        };
        self.set_property(key, value.trim());
    }

    /// Number of properties currently set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}
