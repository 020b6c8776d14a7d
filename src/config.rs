use crate::constants::{DEFAULT_INPUT_GLOB, DEFAULT_OUTPUT_PATH, DEFAULT_VOCAB_BASE_URL};
use crate::error::{PlacenameError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const INPUT_GLOB_ENV: &str = "TEI_INPUT_GLOB";
pub const OUTPUT_PATH_ENV: &str = "TEI_OUTPUT_PATH";
pub const VOCAB_BASE_URL_ENV: &str = "TEI_VOCAB_BASE_URL";

/// What to do when a file fails to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run; no output file is written.
    #[default]
    StopOnFirstError,
    /// Drop the failing file's rows, report the error, keep going.
    SkipFailedFiles,
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub input_glob: String,
    pub output_path: PathBuf,
    pub vocab_base_url: String,
    /// Resolve each identifier once per run instead of once per occurrence.
    pub cache_lookups: bool,
    pub failure_policy: FailurePolicy,
    /// Overrides the HTTP client's default timeout when set.
    pub request_timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_glob: DEFAULT_INPUT_GLOB.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            vocab_base_url: DEFAULT_VOCAB_BASE_URL.to_string(),
            cache_lookups: false,
            failure_policy: FailurePolicy::default(),
            request_timeout_secs: None,
        }
    }
}

impl PipelineConfig {
    /// Load settings from a TOML file. Keys not present keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PlacenameError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults, then the optional file, then `TEI_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(value) = lookup(INPUT_GLOB_ENV) {
            self.input_glob = value;
        }
        if let Some(value) = lookup(OUTPUT_PATH_ENV) {
            self.output_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(VOCAB_BASE_URL_ENV) {
            self.vocab_base_url = value;
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_glob.trim().is_empty() {
            return Err(PlacenameError::Config("input_glob must not be empty".to_string()));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(PlacenameError::Config("output_path must not be empty".to_string()));
        }
        let base = self.vocab_base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(PlacenameError::Config(format!(
                "vocab_base_url must be an http(s) URL, got '{}'",
                self.vocab_base_url
            )));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(PlacenameError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
