//! # CLI Configuration
//!
//! Read from an optional YAML file, then overridden field by field from the
//! environment:
//!
//! - `SHIPCOMPLY_STORE_PATH`
//! - `SHIPCOMPLY_CLASSIFIER_URL`
//! - `SHIPCOMPLY_CLASSIFIER_API_KEY`
//! - `SHIPCOMPLY_CLASSIFIER_MODEL`
//! - `SHIPCOMPLY_CLASSIFIER_ENABLED` (`true`/`false`/`1`/`0`)
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shipcomply_classifier::http::{DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use shipcomply_classifier::HttpClassifierConfig;
use shipcomply_crossborder::{EngineOptions, DEFAULT_CLASSIFIER_DEADLINE};
use shipcomply_store::DEFAULT_STORE_TIMEOUT;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShipcomplyConfig {
    /// JSON file backing the rule store.
    pub store_path: PathBuf,
    pub store_timeout_ms: u64,
    pub classifier: ClassifierSettings,
    pub engine: EngineSettings,
}

impl Default for ShipcomplyConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("shipcomply-store.json"),
            store_timeout_ms: DEFAULT_STORE_TIMEOUT.as_millis() as u64,
            classifier: ClassifierSettings::default(),
            engine: EngineSettings::default(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifierSettings {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl std::fmt::Debug for ClassifierSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierSettings")
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl ClassifierSettings {
    /// HTTP client settings, or `None` when classification is switched off.
    pub fn http_config(&self) -> Option<HttpClassifierConfig> {
        if !self.enabled {
            return None;
        }
        let mut config = HttpClassifierConfig::new(&self.base_url, &self.api_key);
        config.model = self.model.clone();
        config.timeout = Duration::from_millis(self.timeout_ms);
        config.max_retries = self.max_retries;
        Some(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Outer deadline for each classifier call.
    pub classifier_deadline_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            classifier_deadline_ms: DEFAULT_CLASSIFIER_DEADLINE.as_millis() as u64,
        }
    }
}

impl EngineSettings {
    pub fn options(&self) -> EngineOptions {
        EngineOptions {
            classifier_deadline: Duration::from_millis(self.classifier_deadline_ms),
        }
    }
}

impl ShipcomplyConfig {
    /// Load from `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Override fields from `lookup`, which maps a variable name to its value.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup("SHIPCOMPLY_STORE_PATH") {
            self.store_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("SHIPCOMPLY_CLASSIFIER_URL") {
            self.classifier.base_url = url;
        }
        if let Some(key) = lookup("SHIPCOMPLY_CLASSIFIER_API_KEY") {
            self.classifier.api_key = key;
        }
        if let Some(model) = lookup("SHIPCOMPLY_CLASSIFIER_MODEL") {
            self.classifier.model = model;
        }
        if let Some(raw) = lookup("SHIPCOMPLY_CLASSIFIER_ENABLED") {
            self.classifier.enabled =
                parse_flag(&raw).ok_or_else(|| ConfigError::InvalidEnv {
                    var: "SHIPCOMPLY_CLASSIFIER_ENABLED",
                    value: raw.clone(),
                })?;
        }
        Ok(())
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
