use std::error::Error as StdError;
use std::time::Duration;

use futures_util::StreamExt;
use organizer_core::FetchFailure;

use crate::FetchOutput;

/// Identifying agent; some feed hosts reject requests with the default one.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; Podcast Organizer/1.0; +https://github.com)";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Bounds the whole request, from connect to the last body byte.
    pub timeout: Duration,
    pub redirect_limit: usize,
    /// Bodies larger than this are abandoned mid-download.
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            redirect_limit: 10,
            max_bytes: 10 * 1024 * 1024,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl FetchSettings {
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchFailure>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()?;
        Ok(Self { client, settings })
    }

    /// The message leaves out the URL; it is already on the record.
    fn map_error(&self, err: reqwest::Error) -> FetchFailure {
        if err.is_timeout() {
            return FetchFailure::Timeout(self.settings.timeout);
        }
        FetchFailure::Transport(error_chain(&err.without_url()))
    }

    fn too_large(&self) -> FetchFailure {
        FetchFailure::TooLarge {
            max_bytes: self.settings.max_bytes,
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.map_error(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::HttpStatus(status.as_u16()));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.settings.max_bytes)
        {
            return Err(self.too_large());
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| self.map_error(err))?;
            if bytes.len() as u64 + chunk.len() as u64 > self.settings.max_bytes {
                return Err(self.too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchOutput { bytes })
    }
}

/// The error's message followed by its sources, so DNS and connection
/// details from the underlying resolver survive into the failure text.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
