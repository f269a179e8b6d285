use crate::FetchFailure;

/// Rendering-level grouping of fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The feed is gone for good: missing, removed, or its host no longer resolves.
    FeedGone,
    /// Anything else, such as parse errors, timeouts, or server errors.
    Transient,
}

const GONE_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
    "no address associated",
    "connection refused",
];

/// Classify a failure: 404 and 410 by status code, transport errors by
/// matching their text against resolver and connection markers.
pub fn classify_failure(failure: &FetchFailure) -> FailureClass {
    match failure {
        FetchFailure::HttpStatus(404 | 410) => FailureClass::FeedGone,
        FetchFailure::Transport(message) => {
            let text = message.to_lowercase();
            if GONE_MARKERS.iter().any(|marker| text.contains(marker)) {
                FailureClass::FeedGone
            } else {
                FailureClass::Transient
            }
        }
        _ => FailureClass::Transient,
    }
}
