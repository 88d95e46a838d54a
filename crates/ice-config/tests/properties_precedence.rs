//! Behavioural coverage for the property layering rules.

use std::cell::RefCell;
use std::fs;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use ice_config::{ConfigError, Properties};

struct Harness {
    temp_dir: TempDir,
    args: RefCell<Vec<String>>,
    defaults: RefCell<Option<Properties>>,
    config_env: RefCell<Option<String>>,
    loaded: RefCell<Option<Result<Properties, ConfigError>>>,
}

impl Harness {
    fn new() -> Self {
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self {
            temp_dir,
            args: RefCell::new(vec!["prog".to_owned()]),
            defaults: RefCell::new(None),
            config_env: RefCell::new(None),
            loaded: RefCell::new(None),
        }
    }

    fn write_config(&self, key: &str, value: &str) -> String {
        let path = self.temp_dir.path().join("config");
        if let Err(error) = fs::write(&path, format!("{key} = {value}\n")) {
            panic!("failed to write configuration: {error}");
        }
        match path.to_str() {
            Some(path) => path.to_owned(),
            None => panic!("temporary path is not valid UTF-8"),
        }
    }

    fn properties(&self) -> Properties {
        match self.loaded.borrow().as_ref() {
            Some(Ok(properties)) => properties.clone(),
            Some(Err(error)) => panic!("property creation failed: {error}"),
            None => panic!("properties were not created"),
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a configuration file setting \"{key}\" to \"{value}\"")]
fn given_configuration_file(harness: &Harness, key: String, value: String) {
    let path = harness.write_config(&key, &value);
    harness
        .args
        .borrow_mut()
        .push(format!("--Ice.Config={path}"));
}

#[given("the environment names a configuration file setting \"{key}\" to \"{value}\"")]
fn given_environment_config(harness: &Harness, key: String, value: String) {
    let path = harness.write_config(&key, &value);
    *harness.config_env.borrow_mut() = Some(path);
}

#[given("the defaults set \"{key}\" to \"{value}\"")]
fn given_defaults(harness: &Harness, key: String, value: String) {
    let mut defaults = harness.defaults.borrow_mut();
    defaults
        .get_or_insert_with(Properties::new)
        .set_property(key, value);
}

#[given("the command line sets \"{key}\" to \"{value}\"")]
fn given_command_line_option(harness: &Harness, key: String, value: String) {
    harness.args.borrow_mut().push(format!("--{key}={value}"));
}

#[given("the command line contains \"{argument}\"")]
fn given_command_line_argument(harness: &Harness, argument: String) {
    harness.args.borrow_mut().push(argument);
}

#[when("the properties are created")]
fn when_properties_created(harness: &Harness) {
    let defaults = harness.defaults.borrow_mut().take();
    let config_env = harness.config_env.borrow().clone();
    let result = {
        let mut args = harness.args.borrow_mut();
        Properties::from_args(&mut args, defaults, config_env.as_deref())
    };
    *harness.loaded.borrow_mut() = Some(result);
}

#[then("the property \"{key}\" resolves to \"{value}\"")]
fn then_property_resolves(harness: &Harness, key: String, value: String) {
    assert_eq!(harness.properties().get_property(&key), value);
}

#[then("the remaining arguments are \"{expected}\"")]
fn then_remaining_arguments(harness: &Harness, expected: String) {
    let remaining = harness.args.borrow().join(" ");
    assert_eq!(remaining, expected);
}

#[scenario(
    path = "tests/features/properties_precedence.feature",
    name = "Command-line options override configuration files"
)]
fn command_line_overrides_files(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/properties_precedence.feature",
    name = "Configuration files override caller defaults"
)]
fn files_override_defaults(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/properties_precedence.feature",
    name = "The environment names the configuration file"
)]
fn environment_names_file(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/properties_precedence.feature",
    name = "Application arguments survive property creation"
)]
fn application_arguments_survive(#[from(harness)] harness: Harness) {
    let _ = harness;
}
