//! Deterministic keyword tags derived from a category label and a title.
//!
//! Used as the fallback whenever the oracle does not provide tags for a
//! podcast, and to normalize the tags it does provide.

/// Words that never make useful tags on their own.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "with", "from", "to", "of", "in", "on", "for", "is",
    "at", "by", "as", "podcast", "podcasts", "show", "episode", "episodes",
];

/// Words removed from titles before keyword extraction.
const TITLE_NOISE: &[&str] = &["podcast", "the"];

pub const DEFAULT_CATEGORY_TAGS: usize = 3;
pub const DEFAULT_TITLE_KEYWORDS: usize = 2;
pub const DEFAULT_TOTAL_TAGS: usize = 5;

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Tags from a category label such as `"Technology & AI"`.
///
/// Two-letter tokens are always kept so acronyms survive.
pub fn tags_from_category(category: &str, max_tags: usize) -> Vec<String> {
    let lowered = category.to_lowercase();
    let words = lowered
        .split(|c: char| matches!(c, '&' | '/' | ',') || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .filter(|word| {
            let len = word.chars().count();
            len == 2 || (len > 2 && !is_stop_word(word))
        });

    unique_prefix(words, max_tags)
}

/// Keywords from a podcast title: whole ASCII-alphabetic words of three or
/// more letters that are not stop-words.
pub fn keywords_from_title(title: &str, max_keywords: usize) -> Vec<String> {
    let keywords = title
        .split(|c: char| !is_word_char(c))
        .filter(|word| {
            !TITLE_NOISE
                .iter()
                .any(|noise| word.eq_ignore_ascii_case(noise))
        })
        .filter(|word| word.len() >= 3 && word.chars().all(|c| c.is_ascii_alphabetic()))
        .map(str::to_ascii_lowercase)
        .filter(|word| !is_stop_word(word));

    unique_prefix(keywords, max_keywords)
}

/// Category tags first, then title keywords that are not already present,
/// up to `max_total_tags`.
pub fn tags_for_podcast(category: &str, title: &str, max_total_tags: usize) -> Vec<String> {
    let mut tags = tags_from_category(category, DEFAULT_CATEGORY_TAGS);

    let remaining = max_total_tags.saturating_sub(tags.len());
    if remaining > 0 {
        for keyword in keywords_from_title(title, remaining) {
            if tags.len() >= max_total_tags {
                break;
            }
            if !tags.contains(&keyword) {
                tags.push(keyword);
            }
        }
    }

    tags
}

/// Lower-case, trim and replace internal spaces with dashes.
pub fn normalize_tag(tag: &str) -> String {
    tag.to_lowercase().trim().replace(' ', "-")
}

/// Normalize every tag and drop empties and duplicates, keeping first-seen order.
pub fn deduplicate_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let normalized = tags
        .iter()
        .map(|tag| normalize_tag(tag.as_ref()))
        .filter(|tag| !tag.is_empty());
    unique_prefix(normalized, usize::MAX)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn unique_prefix<I, S>(items: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut unique: Vec<String> = Vec::new();
    for item in items {
        if unique.len() >= limit {
            break;
        }
        let item = item.into();
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}
