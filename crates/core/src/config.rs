use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MODEL_KEY_ENV: &str = "GEMINI_API_KEY";
pub const METADATA_KEY_ENV: &str = "YOUTUBE_API_KEY";

const MODEL_ENV: &str = "TRENDSCOUT_MODEL";
const MODEL_TIMEOUT_ENV: &str = "TRENDSCOUT_MODEL_TIMEOUT";
const METADATA_TIMEOUT_ENV: &str = "TRENDSCOUT_METADATA_TIMEOUT";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub api_base: String,
    pub model: String,
    pub analysis_temperature: f32,
    pub script_temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            analysis_temperature: 0.7,
            script_temperature: 0.8,
            timeout_secs: 90,
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub api_base: String,
    pub max_results: u32,
    pub timeout_secs: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            max_results: 12,
            timeout_secs: 15,
        }
    }
}

impl MetadataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub metadata: MetadataConfig,
    pub ideas_count: usize,
    pub topics_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            metadata: MetadataConfig::default(),
            ideas_count: 8,
            topics_count: 5,
        }
    }
}

/// Get the root config directory for trendscout
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trendscout")
}

/// Get the default config file path
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.json")
}

impl Config {
    /// Defaults, then the config file, then environment overrides.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = get_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            self.model.model = model.trim().to_string();
        }
        if let Some(secs) = lookup(MODEL_TIMEOUT_ENV) {
            self.model.timeout_secs = parse_secs(MODEL_TIMEOUT_ENV, &secs)?;
        }
        if let Some(secs) = lookup(METADATA_TIMEOUT_ENV) {
            self.metadata.timeout_secs = parse_secs(METADATA_TIMEOUT_ENV, &secs)?;
        }
        Ok(())
    }
}

fn parse_secs(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| ConfigError::InvalidEnv {
            var,
            value: value.to_string(),
        })
}

/// Read a credential from the environment, ignoring blank values.
pub fn env_credential(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}
