//! Categorization oracle: the LLM backends that classify and tag podcasts.
//!
//! Backends only implement [`Oracle::complete`]; prompting, batching and
//! response parsing are shared by the provided methods so every backend
//! behaves the same way on partial or malformed answers.
mod anthropic;
mod openai;
pub mod prompt;
pub mod response;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use organizer_core::{Categorization, PodcastRecord, TagBatch};
use organizer_logging::{organizer_debug, organizer_warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use anthropic::{AnthropicOracle, ANTHROPIC_API_URL, DEFAULT_ANTHROPIC_MODEL};
pub use openai::{OpenAiOracle, DEFAULT_OPENAI_MODEL, OPENAI_API_URL};

pub const DEFAULT_TAG_BATCH_SIZE: usize = 25;

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("response contained no text")]
    EmptyResponse,
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Raised while building an oracle, before any request is made.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown AI provider: {0} (expected 'claude' or 'openai')")]
    UnknownProvider(String),
    #[error("{0} provider selected but no API key is configured")]
    MissingCredential(ProviderKind),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Claude,
    OpenAi,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "claude" => Ok(ProviderKind::Claude),
            "openai" => Ok(ProviderKind::OpenAi),
            _ => Err(ConfigError::UnknownProvider(value.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Claude => write!(f, "claude"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

/// Everything needed to build the active backend.
#[derive(Debug, Clone)]
pub struct OracleSettings {
    pub provider: String,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub model: Option<String>,
    /// Overrides the provider's API root, e.g. to point at a local proxy.
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Claude.to_string(),
            anthropic_api_key: None,
            openai_api_key: None,
            model: None,
            base_url: None,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Build the backend selected by `settings.provider`.
pub fn create_oracle(settings: &OracleSettings) -> Result<Box<dyn Oracle>, ConfigError> {
    let provider: ProviderKind = settings.provider.parse()?;
    let model = settings.model.clone().filter(|m| !m.trim().is_empty());

    match provider {
        ProviderKind::Claude => {
            let key = credential(settings.anthropic_api_key.as_deref(), provider)?;
            let mut oracle = AnthropicOracle::new(key, model, settings.timeout)
                .map_err(|err| ConfigError::Client(err.to_string()))?;
            if let Some(base_url) = &settings.base_url {
                oracle = oracle.with_base_url(base_url);
            }
            Ok(Box::new(oracle))
        }
        ProviderKind::OpenAi => {
            let key = credential(settings.openai_api_key.as_deref(), provider)?;
            let mut oracle = OpenAiOracle::new(key, model, settings.timeout)
                .map_err(|err| ConfigError::Client(err.to_string()))?;
            if let Some(base_url) = &settings.base_url {
                oracle = oracle.with_base_url(base_url);
            }
            Ok(Box::new(oracle))
        }
    }
}

fn credential(key: Option<&str>, provider: ProviderKind) -> Result<String, ConfigError> {
    match key.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(ConfigError::MissingCredential(provider)),
    }
}

#[async_trait::async_trait]
pub trait Oracle: Send + Sync {
    /// Provider label used in logs and the enrichment report.
    fn name(&self) -> &str;

    /// Send one prompt and return the raw text of the answer.
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;

    /// Pass 1: assign every record to one category.
    ///
    /// There is no local fallback for categories, so transport and parse
    /// failures are returned to the caller.
    async fn categorize(&self, records: &[PodcastRecord]) -> Result<Categorization, OracleError> {
        let prompt = prompt::categorize_prompt(records);
        let text = self.complete(&prompt).await?;
        response::parse_categorization(&text).inspect_err(|err| {
            organizer_debug!("unparseable categorization from {}: {} ({})", self.name(), err, text);
        })
    }

    /// Pass 2: request tags in consecutive batches of `batch_size`.
    ///
    /// A failed batch is logged and skipped; its records are simply absent
    /// from the result.
    async fn generate_tags_batched(&self, records: &[PodcastRecord], batch_size: usize) -> TagBatch {
        let batch_size = batch_size.max(1);
        let batch_count = records.len().div_ceil(batch_size);
        let mut merged = TagBatch::default();

        for (batch_number, chunk) in records.chunks(batch_size).enumerate() {
            let offset = batch_number * batch_size;
            let prompt = prompt::tag_prompt(chunk, offset);
            let result = match self.complete(&prompt).await {
                Ok(text) => response::parse_tag_batch(&text, offset..offset + chunk.len()),
                Err(err) => Err(err),
            };

            match result {
                Ok(batch) => {
                    organizer_debug!(
                        "tag batch {}/{}: {} of {} podcasts tagged",
                        batch_number + 1,
                        batch_count,
                        batch.tags.len(),
                        chunk.len()
                    );
                    merged.merge(batch);
                }
                Err(err) => {
                    organizer_warn!(
                        "tag batch {}/{} from {} failed, using local tags: {}",
                        batch_number + 1,
                        batch_count,
                        self.name(),
                        err
                    );
                    merged.failed_batches += 1;
                }
            }
        }

        merged
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Send a prepared request and decode the JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, OracleError> {
    let response = request
        .send()
        .await
        .map_err(|err| OracleError::Transport(err.to_string()))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| OracleError::Transport(err.to_string()))?;

    if !status.is_success() {
        return Err(OracleError::Api {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    serde_json::from_slice(&body).map_err(|err| OracleError::MalformedResponse(err.to_string()))
}
