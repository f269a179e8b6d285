//! YAML configuration with environment and command-line overrides.
//!
//! Precedence, lowest first: built-in defaults, the config file, the
//! `ANTHROPIC_API_KEY` / `OPENAI_API_KEY` environment variables, CLI flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use organizer_engine::oracle::DEFAULT_TAG_BATCH_SIZE;
use organizer_engine::{EnrichOptions, FetchSettings, OracleSettings, ProviderKind};
use organizer_logging::organizer_info;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = ".podcast-organizer.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub provider: String,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub model: Option<String>,
    pub tag_batch_size: usize,
    /// API root override for the selected provider.
    pub base_url: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Claude.to_string(),
            anthropic_api_key: None,
            openai_api_key: None,
            model: None,
            tag_batch_size: DEFAULT_TAG_BATCH_SIZE,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_file: PathBuf::from("podcasts.md"),
        }
    }
}

/// Signed so that bad values survive parsing and are reported by
/// [`Config::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchingConfig {
    pub timeout: i64,
    pub max_concurrent: i64,
}

impl Default for FetchingConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            max_concurrent: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiConfig,
    pub output: OutputConfig,
    pub fetching: FetchingConfig,
}

impl Config {
    /// Load from `explicit`, or from the first config file found in the
    /// current directory or the home directory, then apply the environment.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file just means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                bail!("config file not found: {}", path.display())
            }
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(),
        };

        let mut config = match &path {
            Some(path) => {
                organizer_info!("loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Non-empty API keys from the environment replace the file's keys.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(key) = non_empty("ANTHROPIC_API_KEY") {
            self.ai.anthropic_api_key = Some(key);
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.ai.openai_api_key = Some(key);
        }
    }

    /// Every problem found, in a stable order. AI settings are only checked
    /// when `require_ai` is set.
    pub fn validate(&self, require_ai: bool) -> Vec<String> {
        let mut errors = Vec::new();

        if require_ai {
            match self.ai.provider.parse::<ProviderKind>() {
                Err(_) => errors.push(format!(
                    "Invalid AI provider: {}. Must be 'claude' or 'openai'",
                    self.ai.provider
                )),
                Ok(ProviderKind::Claude) if is_blank(&self.ai.anthropic_api_key) => errors.push(
                    "Claude provider selected but no anthropic_api_key found in config or \
                     ANTHROPIC_API_KEY environment variable"
                        .to_string(),
                ),
                Ok(ProviderKind::OpenAi) if is_blank(&self.ai.openai_api_key) => errors.push(
                    "OpenAI provider selected but no openai_api_key found in config or \
                     OPENAI_API_KEY environment variable"
                        .to_string(),
                ),
                Ok(_) => {}
            }
            if self.ai.tag_batch_size == 0 {
                errors.push("Invalid tag_batch_size: 0. Must be positive".to_string());
            }
        }

        if self.fetching.timeout <= 0 {
            errors.push(format!(
                "Invalid timeout: {}. Must be positive",
                self.fetching.timeout
            ));
        }
        if self.fetching.max_concurrent <= 0 {
            errors.push(format!(
                "Invalid max_concurrent: {}. Must be positive",
                self.fetching.max_concurrent
            ));
        }

        errors
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings::with_timeout_secs(self.fetching.timeout.max(1).unsigned_abs())
    }

    pub fn max_concurrent(&self) -> usize {
        usize::try_from(self.fetching.max_concurrent.max(1)).unwrap_or(1)
    }

    pub fn oracle_settings(&self) -> OracleSettings {
        OracleSettings {
            provider: self.ai.provider.clone(),
            anthropic_api_key: self.ai.anthropic_api_key.clone(),
            openai_api_key: self.ai.openai_api_key.clone(),
            model: self.ai.model.clone(),
            base_url: self.ai.base_url.clone(),
            ..OracleSettings::default()
        }
    }

    pub fn enrich_options(&self) -> EnrichOptions {
        EnrichOptions {
            tag_batch_size: self.ai.tag_batch_size.max(1),
        }
    }
}

/// `./.podcast-organizer.yaml`, then `~/.podcast-organizer.yaml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::home_dir()
        .map(|home| home.join(CONFIG_FILENAME))
        .filter(|path| path.is_file())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
