use organizer_core::{FeedMetadata, FeedReference, FetchFailure, PodcastRecord};
use organizer_logging::{organizer_debug, organizer_trace};

use crate::Fetcher;

/// Fetch one feed and turn it into a record. Never fails: every error path
/// ends up as the record's fetch failure.
pub async fn fetch_record(fetcher: &dyn Fetcher, reference: &FeedReference) -> PodcastRecord {
    organizer_trace!("fetching {}", reference.feed_url);
    let result = match fetcher.fetch(&reference.feed_url).await {
        Ok(output) => parse_feed(&output.bytes),
        Err(failure) => Err(failure),
    };

    match result {
        Ok(metadata) => PodcastRecord::fetched(reference, metadata),
        Err(failure) => {
            organizer_debug!("feed {} failed: {}", reference.feed_url, failure);
            PodcastRecord::failed(reference, failure)
        }
    }
}

/// Parse an RSS or Atom document into channel metadata.
///
/// Any parse error is terminal: no partially recovered fields are returned.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMetadata, FetchFailure> {
    match rss::Channel::read_from(bytes) {
        Ok(channel) => Ok(rss_metadata(&channel)),
        Err(rss::Error::InvalidStartTag) => parse_atom(bytes),
        Err(err) => Err(FetchFailure::FeedParse(err.to_string())),
    }
}

fn rss_metadata(channel: &rss::Channel) -> FeedMetadata {
    let itunes = channel.itunes_ext();

    let description = [
        itunes.and_then(|ext| ext.summary()),
        itunes.and_then(|ext| ext.subtitle()),
        Some(channel.description()),
    ]
    .into_iter()
    .flatten()
    .find_map(non_blank);

    let image_url = itunes
        .and_then(|ext| ext.image())
        .and_then(non_blank)
        .or_else(|| channel.image().and_then(|image| non_blank(image.url())));

    FeedMetadata {
        title: channel.title().trim().to_string(),
        link: non_blank(channel.link()),
        description,
        image_url,
    }
}

/// Atom fallback for documents whose root is not `<rss>`. A root that is
/// neither reports the RSS parser's error.
fn parse_atom(bytes: &[u8]) -> Result<FeedMetadata, FetchFailure> {
    let feed = atom_syndication::Feed::read_from(bytes).map_err(|err| match err {
        atom_syndication::Error::InvalidStartTag => {
            FetchFailure::FeedParse(rss::Error::InvalidStartTag.to_string())
        }
        other => FetchFailure::FeedParse(other.to_string()),
    })?;

    let link = feed
        .links()
        .iter()
        .find(|link| link.rel() == "alternate")
        .or_else(|| feed.links().first())
        .and_then(|link| non_blank(link.href()));

    Ok(FeedMetadata {
        title: feed.title().value.trim().to_string(),
        link,
        description: feed.subtitle().and_then(|text| non_blank(&text.value)),
        image_url: feed.logo().or(feed.icon()).and_then(non_blank),
    })
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
