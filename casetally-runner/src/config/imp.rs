// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::ConfigReadError;
use camino::{Utf8Path, Utf8PathBuf};
use casetally_metadata::RunHeader;
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::{collections::BTreeSet, io};
use tracing::{debug, warn};

/// The config file path, relative to the working directory, used when none is
/// given explicitly.
pub const DEFAULT_CONFIG_PATH: &str = ".config/casetally.toml";

/// The run name used when none is configured.
pub const DEFAULT_RUN_NAME: &str = "Automated Run %DATE%";

/// The placeholder in run names that is replaced by the current time.
pub const DATE_PLACEHOLDER: &str = "%DATE%";

/// Specifies where to load configuration from.
#[derive(Clone, Copy, Debug)]
pub enum ConfigLocation<'a> {
    /// Look for [`DEFAULT_CONFIG_PATH`] under the given directory. If it
    /// doesn't exist, defaults are used.
    Default(&'a Utf8Path),

    /// Load config from an explicit path.
    ///
    /// Returns an error if the file does not exist.
    Explicit(&'a Utf8Path),
}

/// Reporter configuration, after environment overrides have been applied.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ReporterConfig {
    /// Information about the run.
    #[serde(default)]
    pub run: RunConfig,

    /// Where attachments are staged.
    #[serde(default)]
    pub attachments: AttachmentsConfig,
}

/// The `[run]` table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RunConfig {
    /// The project code results are reported against.
    #[serde(default)]
    pub project_code: Option<String>,

    /// An existing run to report into.
    #[serde(default)]
    pub run_id: Option<String>,

    /// The run name template. `%DATE%` is replaced by the current time.
    #[serde(default)]
    pub name: Option<String>,

    /// A free-form description of the run.
    #[serde(default)]
    pub description: Option<String>,

    /// The environment the run executes in.
    #[serde(default)]
    pub environment_id: Option<u64>,

    /// A title for the top-level suite.
    #[serde(default)]
    pub root_suite_title: Option<String>,
}

/// The `[attachments]` table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct AttachmentsConfig {
    /// The directory attachments are written to. Defaults to the system
    /// temporary directory.
    #[serde(default)]
    pub dir: Option<Utf8PathBuf>,
}

impl ReporterConfig {
    /// Loads config from `location`, then applies overrides from the
    /// process environment.
    pub fn load(location: ConfigLocation<'_>) -> Result<Self, ConfigReadError> {
        Self::load_with(
            location,
            |name| std::env::var(name).ok(),
            &mut DefaultConfigWarnings,
        )
    }

    fn load_with(
        location: ConfigLocation<'_>,
        env: impl Fn(&str) -> Option<String>,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ConfigReadError> {
        let mut config = match location {
            ConfigLocation::Default(dir) => {
                let path = dir.join(DEFAULT_CONFIG_PATH);
                debug!("config: looking for default config at {path}");
                Self::from_path_with_warnings(&path, warnings)?.unwrap_or_default()
            }
            ConfigLocation::Explicit(path) => {
                debug!("config: loading from explicit path {path}");
                Self::from_path_with_warnings(path, warnings)?.ok_or_else(|| {
                    ConfigReadError::FileNotFound {
                        path: path.to_owned(),
                    }
                })?
            }
        };

        config.apply_env(env, warnings);
        Ok(config)
    }

    fn from_path_with_warnings(
        path: &Utf8Path,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Option<Self>, ConfigReadError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("config: file does not exist at {path}");
                return Ok(None);
            }
            Err(error) => {
                return Err(ConfigReadError::Read {
                    path: path.to_owned(),
                    error,
                });
            }
        };

        let (config, unknown) =
            Self::deserialize_toml(&contents).map_err(|error| ConfigReadError::Parse {
                path: path.to_owned(),
                error,
            })?;

        if !unknown.is_empty() {
            warnings.unknown_config_keys(path, &unknown);
        }

        debug!("config: loaded successfully from {path}");
        Ok(Some(config))
    }

    fn deserialize_toml(contents: &str) -> Result<(Self, BTreeSet<String>), toml::de::Error> {
        let deserializer = toml::Deserializer::parse(contents)?;
        let mut unknown = BTreeSet::new();
        let config: ReporterConfig = serde_ignored::deserialize(deserializer, |path| {
            unknown.insert(path.to_string());
        })?;
        Ok((config, unknown))
    }

    fn apply_env(
        &mut self,
        env: impl Fn(&str) -> Option<String>,
        warnings: &mut impl ConfigWarnings,
    ) {
        let env = |name: &str| env(name).filter(|value| !value.is_empty());

        if let Some(value) = env("CASETALLY_PROJECT") {
            self.run.project_code = Some(value);
        }
        if let Some(value) = env("CASETALLY_RUN_ID") {
            self.run.run_id = Some(value);
        }
        if let Some(value) = env("CASETALLY_RUN_NAME") {
            self.run.name = Some(value);
        }
        if let Some(value) = env("CASETALLY_RUN_DESCRIPTION") {
            self.run.description = Some(value);
        }
        if let Some(value) = env("CASETALLY_ENVIRONMENT_ID") {
            match value.parse() {
                Ok(environment_id) => self.run.environment_id = Some(environment_id),
                Err(_) => warnings.invalid_env_value(
                    "CASETALLY_ENVIRONMENT_ID",
                    &value,
                    "a non-negative integer",
                ),
            }
        }
        if let Some(value) = env("CASETALLY_ROOT_SUITE_TITLE") {
            self.run.root_suite_title = Some(value);
        }
        if let Some(value) = env("CASETALLY_ATTACHMENTS_DIR") {
            self.attachments.dir = Some(value.into());
        }
    }

    /// Produces the header for a run starting at `now`.
    pub fn run_header(&self, now: DateTime<FixedOffset>) -> RunHeader {
        let template = self.run.name.as_deref().unwrap_or(DEFAULT_RUN_NAME);
        RunHeader {
            project_code: self.run.project_code.clone(),
            run_id: self.run.run_id.clone(),
            run_name: expand_run_name(template, now),
            run_description: self.run.description.clone(),
            environment_id: self.run.environment_id,
            root_suite_title: self.run.root_suite_title.clone(),
        }
    }

    /// Returns the directory attachments are staged in.
    pub fn attachments_dir(&self) -> Result<Utf8PathBuf, ConfigReadError> {
        match &self.attachments.dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let temp_dir = std::env::temp_dir();
                Utf8PathBuf::try_from(temp_dir)
                    .map_err(|error| ConfigReadError::TempDirNotUtf8 {
                        path: error.into_path_buf(),
                    })
            }
        }
    }
}

/// Replaces every `%DATE%` in `template` with `now`, formatted as RFC 3339
/// with second precision.
pub fn expand_run_name(template: &str, now: DateTime<FixedOffset>) -> String {
    if !template.contains(DATE_PLACEHOLDER) {
        return template.to_owned();
    }
    let date = now.format("%Y-%m-%dT%H:%M:%S%:z").to_string();
    template.replace(DATE_PLACEHOLDER, &date)
}

/// Handles warnings produced while loading config.
trait ConfigWarnings {
    /// Unknown keys were found in a config file.
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>);

    /// An environment variable had a value that couldn't be used.
    fn invalid_env_value(&mut self, name: &str, value: &str, expected: &str);
}

/// Logs warnings using the tracing crate.
struct DefaultConfigWarnings;

impl ConfigWarnings for DefaultConfigWarnings {
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>) {
        let mut unknown_str = String::new();
        let mut keys = unknown.iter();
        match (keys.next(), keys.next()) {
            (Some(key), None) => {
                // Print this on the same line.
                unknown_str.push_str("key: ");
                unknown_str.push_str(key);
            }
            _ => {
                unknown_str.push_str("keys:\n");
                for ignored_key in unknown {
                    unknown_str.push('\n');
                    unknown_str.push_str("  - ");
                    unknown_str.push_str(ignored_key);
                }
            }
        }

        warn!("in config file {config_file}, ignoring unknown configuration {unknown_str}");
    }

    fn invalid_env_value(&mut self, name: &str, value: &str, expected: &str) {
        warn!("ignoring {name}={value:?}: expected {expected}");
    }
}
