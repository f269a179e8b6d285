use std::fmt;
use std::time::Duration;

/// A subscription as listed in the OPML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedReference {
    pub title: String,
    pub feed_url: String,
}

impl FeedReference {
    pub fn new(title: impl Into<String>, feed_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            feed_url: feed_url.into(),
        }
    }
}

/// Channel-level metadata recovered from a structurally valid feed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedMetadata {
    pub title: String,
    pub link: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Why a feed could not be turned into metadata.
///
/// The `Display` text is what ends up in the rendered document, and
/// [`classify_failure`](crate::classify_failure) matches transport text
/// against known markers, so its wording is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    HttpStatus(u16),
    Timeout(Duration),
    Transport(String),
    TooLarge { max_bytes: u64 },
    FeedParse(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::HttpStatus(code) => write!(f, "HTTP {code}"),
            FetchFailure::Timeout(after) => write!(f, "Timeout after {}s", after.as_secs_f64()),
            FetchFailure::Transport(message) => write!(f, "Error: {message}"),
            FetchFailure::TooLarge { max_bytes } => {
                write!(f, "Error: response too large (max {max_bytes} bytes)")
            }
            FetchFailure::FeedParse(detail) => write!(f, "Feed parsing error: {detail}"),
        }
    }
}

/// Outcome of the fetch stage: either metadata or a failure, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Fetched(FeedMetadata),
    Failed(FetchFailure),
}

/// One podcast, created by the fetch stage and progressively enriched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastRecord {
    pub original_title: String,
    pub feed_url: String,
    pub status: FeedStatus,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub enhanced_description: Option<String>,
}

impl PodcastRecord {
    pub fn fetched(reference: &FeedReference, metadata: FeedMetadata) -> Self {
        Self::with_status(reference, FeedStatus::Fetched(metadata))
    }

    pub fn failed(reference: &FeedReference, failure: FetchFailure) -> Self {
        Self::with_status(reference, FeedStatus::Failed(failure))
    }

    fn with_status(reference: &FeedReference, status: FeedStatus) -> Self {
        Self {
            original_title: reference.title.clone(),
            feed_url: reference.feed_url.clone(),
            status,
            category: None,
            tags: Vec::new(),
            enhanced_description: None,
        }
    }

    /// True when the feed was fetched and parsed.
    pub fn is_resolvable(&self) -> bool {
        matches!(self.status, FeedStatus::Fetched(_))
    }

    pub fn metadata(&self) -> Option<&FeedMetadata> {
        match &self.status {
            FeedStatus::Fetched(metadata) => Some(metadata),
            FeedStatus::Failed(_) => None,
        }
    }

    pub fn fetch_error(&self) -> Option<&FetchFailure> {
        match &self.status {
            FeedStatus::Fetched(_) => None,
            FeedStatus::Failed(failure) => Some(failure),
        }
    }

    pub fn fetched_title(&self) -> Option<&str> {
        self.metadata().map(|m| m.title.as_str())
    }

    pub fn link(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.link.as_deref())
    }

    pub fn raw_description(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.description.as_deref())
    }

    pub fn image_url(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.image_url.as_deref())
    }

    /// Feed title when it is non-empty, otherwise the subscription title.
    pub fn display_title(&self) -> &str {
        match self.fetched_title() {
            Some(title) if !title.is_empty() => title,
            _ => &self.original_title,
        }
    }

    /// Oracle-supplied description when present, otherwise the feed's own.
    pub fn final_description(&self) -> Option<&str> {
        self.enhanced_description
            .as_deref()
            .or_else(|| self.raw_description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> FeedReference {
        FeedReference::new("From OPML", "https://example.com/feed.xml")
    }

    #[test]
    fn failure_text_is_stable() {
        assert_eq!(FetchFailure::HttpStatus(404).to_string(), "HTTP 404");
        assert_eq!(
            FetchFailure::Timeout(Duration::from_secs(30)).to_string(),
            "Timeout after 30s"
        );
        assert_eq!(
            FetchFailure::Timeout(Duration::from_millis(500)).to_string(),
            "Timeout after 0.5s"
        );
        assert_eq!(
            FetchFailure::Transport("dns error".into()).to_string(),
            "Error: dns error"
        );
        assert_eq!(
            FetchFailure::FeedParse("unexpected EOF".into()).to_string(),
            "Feed parsing error: unexpected EOF"
        );
    }

    #[test]
    fn display_title_falls_back_to_original() {
        let failed = PodcastRecord::failed(&reference(), FetchFailure::HttpStatus(500));
        assert_eq!(failed.display_title(), "From OPML");

        let blank = PodcastRecord::fetched(&reference(), FeedMetadata::default());
        assert_eq!(blank.display_title(), "From OPML");

        let titled = PodcastRecord::fetched(
            &reference(),
            FeedMetadata {
                title: "From Feed".into(),
                ..FeedMetadata::default()
            },
        );
        assert_eq!(titled.display_title(), "From Feed");
    }

    #[test]
    fn enhanced_description_wins() {
        let mut record = PodcastRecord::fetched(
            &reference(),
            FeedMetadata {
                title: "T".into(),
                description: Some("raw".into()),
                ..FeedMetadata::default()
            },
        );
        assert_eq!(record.final_description(), Some("raw"));
        record.enhanced_description = Some("better".into());
        assert_eq!(record.final_description(), Some("better"));
    }

    #[test]
    fn fetched_and_failed_are_exclusive() {
        let ok = PodcastRecord::fetched(&reference(), FeedMetadata::default());
        assert!(ok.is_resolvable());
        assert!(ok.fetched_title().is_some());
        assert!(ok.fetch_error().is_none());

        let failed = PodcastRecord::failed(&reference(), FetchFailure::HttpStatus(404));
        assert!(!failed.is_resolvable());
        assert!(failed.fetched_title().is_none());
        assert!(failed.fetch_error().is_some());
    }
}
