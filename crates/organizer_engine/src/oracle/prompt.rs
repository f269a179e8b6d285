use organizer_core::{PodcastRecord, UNCATEGORIZED};
use serde_json::json;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that organizes podcast collections. Always respond with valid JSON only.";

pub const NO_DESCRIPTION: &str = "No description available";

/// Longest description excerpt sent with a tag request, in characters.
pub const TAG_DESCRIPTION_CHARS: usize = 200;

pub fn categorize_prompt(records: &[PodcastRecord]) -> String {
    let podcasts: Vec<_> = records
        .iter()
        .enumerate()
        .map(|(id, record)| {
            json!({
                "id": id,
                "title": record.display_title(),
                "description": record.raw_description().unwrap_or(NO_DESCRIPTION),
            })
        })
        .collect();
    let listing = serde_json::to_string_pretty(&podcasts).unwrap_or_default();

    format!(
        r#"You are helping organize a podcast collection. I have {count} podcasts that need to be grouped into categories.

Here are the podcasts:

{listing}

Create logical category groupings (e.g., "Technology & AI", "Business & Entrepreneurship", "News & Politics") and assign each podcast to exactly ONE category. Every podcast id must appear exactly once.

Return a JSON object with this structure:

{{
  "categories": {{
    "Category Name 1": [0, 1, 5],
    "Category Name 2": [2, 3, 4]
  }}
}}

Use the podcast ids to reference podcasts. Only return valid JSON, no other text."#,
        count = records.len(),
    )
}

/// Tag prompt for one batch. Ids are offset so they index the full list.
pub fn tag_prompt(batch: &[PodcastRecord], offset: usize) -> String {
    let podcasts: Vec<_> = batch
        .iter()
        .enumerate()
        .map(|(i, record)| {
            json!({
                "id": offset + i,
                "title": record.display_title(),
                "category": record.category.as_deref().unwrap_or(UNCATEGORIZED),
                "description": truncate_chars(
                    record.raw_description().unwrap_or(NO_DESCRIPTION),
                    TAG_DESCRIPTION_CHARS,
                ),
            })
        })
        .collect();
    let listing = serde_json::to_string_pretty(&podcasts).unwrap_or_default();

    format!(
        r#"Generate tags for these {count} podcasts.

{listing}

For each podcast, give 3-5 short, lowercase keyword tags (no '#' prefix) describing its topics. If a description is missing or unclear you may also provide a one-sentence replacement.

Return a JSON object with this structure:

{{
  "tags": {{
    "{first}": ["technology", "ai", "interviews"]
  }},
  "descriptions": {{
    "{first}": "Optional improved description"
  }}
}}

Key both objects by podcast id. "descriptions" may be omitted. Only return valid JSON, no other text."#,
        count = batch.len(),
        first = offset,
    )
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use organizer_core::{FeedMetadata, FeedReference};

    fn record(title: &str, description: Option<String>) -> PodcastRecord {
        PodcastRecord::fetched(
            &FeedReference::new(title, "https://example.com/feed"),
            FeedMetadata {
                title: title.to_string(),
                description,
                ..FeedMetadata::default()
            },
        )
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn categorize_prompt_lists_every_record_with_placeholder() {
        let prompt = categorize_prompt(&[record("A", Some("first".into())), record("B", None)]);
        assert!(prompt.contains("2 podcasts"));
        assert!(prompt.contains("\"id\": 1"));
        assert!(prompt.contains("\"description\": \"first\""));
        assert!(prompt.contains(NO_DESCRIPTION));
    }

    #[test]
    fn tag_prompt_uses_global_ids_category_and_short_description() {
        let mut categorized = record("A", Some("x".repeat(500)));
        categorized.category = Some("Science".into());
        let prompt = tag_prompt(&[categorized, record("B", None)], 25);

        assert!(prompt.contains("\"id\": 25"));
        assert!(prompt.contains("\"id\": 26"));
        assert!(prompt.contains("\"category\": \"Science\""));
        assert!(prompt.contains("\"category\": \"Uncategorized\""));
        assert!(prompt.contains(&"x".repeat(200)));
        assert!(!prompt.contains(&"x".repeat(201)));
    }
}
