use std::collections::BTreeMap;

use crate::{classify_failure, FailureClass, PodcastRecord};

/// Section heading for resolvable podcasts that pass 1 did not assign.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Document for a run without enrichment: successes in input order, then failures.
pub fn render_basic_markdown(records: &[PodcastRecord]) -> String {
    let (successful, failed): (Vec<&PodcastRecord>, Vec<&PodcastRecord>) =
        records.iter().partition(|r| r.is_resolvable());

    let mut doc = String::new();
    doc.push_str("# My Podcasts\n\n");
    doc.push_str(&format!("Total podcasts: {}\n\n", records.len()));
    doc.push_str(&format!("Successfully fetched: {}\n\n", successful.len()));
    doc.push_str(&format!("Failed: {}\n\n", failed.len()));

    if !successful.is_empty() {
        doc.push_str("## Podcasts\n\n");
        for record in &successful {
            push_podcast(&mut doc, record, false);
        }
    }

    if !failed.is_empty() {
        doc.push_str("## Failed to Fetch\n\n");
        doc.push_str("The following podcasts could not be fetched:\n\n");
        for record in &failed {
            push_failure(&mut doc, record);
        }
    }

    doc
}

/// Document grouped by category, with failures split by whether the feed is gone.
pub fn render_enriched_markdown(records: &[PodcastRecord]) -> String {
    let mut groups: BTreeMap<&str, Vec<&PodcastRecord>> = BTreeMap::new();
    let mut uncategorized = Vec::new();
    let mut gone = Vec::new();
    let mut erroring = Vec::new();

    for record in records {
        match (record.fetch_error(), record.category.as_deref()) {
            (Some(failure), _) => match classify_failure(failure) {
                FailureClass::FeedGone => gone.push(record),
                FailureClass::Transient => erroring.push(record),
            },
            (None, Some(category)) => groups.entry(category).or_default().push(record),
            (None, None) => uncategorized.push(record),
        }
    }

    for podcasts in groups.values_mut() {
        podcasts.sort_by_key(|r| r.display_title().to_lowercase());
    }
    uncategorized.sort_by_key(|r| r.display_title().to_lowercase());

    let failed_total = gone.len() + erroring.len();
    let mut doc = String::new();
    doc.push_str("# My Podcasts\n\n");
    doc.push_str(&format!("Total podcasts: {}\n\n", records.len()));
    doc.push_str(&format!("Categories: {}\n\n", groups.len()));
    doc.push_str(&format!("Failed to fetch: {failed_total}\n\n"));

    let mut contents: Vec<(&str, usize)> = groups
        .iter()
        .map(|(label, podcasts)| (*label, podcasts.len()))
        .collect();
    if !uncategorized.is_empty() {
        contents.push((UNCATEGORIZED, uncategorized.len()));
    }
    if !contents.is_empty() {
        doc.push_str("## Contents\n\n");
        for (label, count) in &contents {
            doc.push_str(&format!("- [{label}](#{}) ({count})\n", anchor(label)));
        }
        doc.push('\n');
    }

    for (label, podcasts) in &groups {
        doc.push_str(&format!("## {label}\n\n"));
        for record in podcasts {
            push_podcast(&mut doc, record, true);
        }
    }

    if !uncategorized.is_empty() {
        doc.push_str(&format!("## {UNCATEGORIZED}\n\n"));
        for record in &uncategorized {
            push_podcast(&mut doc, record, true);
        }
    }

    if !gone.is_empty() {
        doc.push_str("## Unavailable Feeds\n\n");
        doc.push_str("These feeds appear to be permanently gone:\n\n");
        for record in &gone {
            push_failure(&mut doc, record);
        }
    }

    if !erroring.is_empty() {
        doc.push_str("## Feeds With Errors\n\n");
        doc.push_str("These feeds could not be read this time and may work on a later run:\n\n");
        for record in &erroring {
            push_failure(&mut doc, record);
        }
    }

    doc
}

fn push_podcast(doc: &mut String, record: &PodcastRecord, enriched: bool) {
    doc.push_str(&format!("### {}\n\n", record.display_title()));

    if enriched && !record.tags.is_empty() {
        let hashtags: Vec<String> = record.tags.iter().map(|t| format!("#{t}")).collect();
        doc.push_str(&format!("{}\n\n", hashtags.join(" ")));
    }
    if let Some(link) = record.link() {
        doc.push_str(&format!("**Link:** {link}\n\n"));
    }
    doc.push_str(&format!("**RSS Feed:** {}\n\n", record.feed_url));

    let description = if enriched {
        record.final_description()
    } else {
        record.raw_description()
    };
    if let Some(description) = description {
        doc.push_str(&format!("**Description:** {description}\n\n"));
    }
    if let Some(image) = record.image_url() {
        doc.push_str(&format!("**Image:** {image}\n\n"));
    }
}

fn push_failure(doc: &mut String, record: &PodcastRecord) {
    let reason = record
        .fetch_error()
        .map(ToString::to_string)
        .unwrap_or_else(|| "Unknown error".to_string());
    doc.push_str(&format!("- **{}**\n", record.original_title));
    doc.push_str(&format!("  - URL: {}\n", record.feed_url));
    doc.push_str(&format!("  - Error: {reason}\n\n"));
}

/// GitHub-style heading anchor.
fn anchor(heading: &str) -> String {
    heading
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}
