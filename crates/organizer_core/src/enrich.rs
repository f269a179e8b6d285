use std::collections::BTreeMap;

use serde::Serialize;

use crate::tags::{deduplicate_tags, tags_for_podcast, DEFAULT_TOTAL_TAGS};
use crate::PodcastRecord;

/// Maximum number of locally synthesized tags per podcast.
pub const FALLBACK_MAX_TAGS: usize = DEFAULT_TOTAL_TAGS;

/// Pass 1 result: category label to the indices assigned to it.
///
/// Labels iterate in sorted order, which makes repeated assignments of the same
/// index deterministic (the last label wins).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Categorization {
    pub categories: BTreeMap<String, Vec<usize>>,
}

/// Pass 2 result, merged across batches and keyed by index into the
/// resolvable records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagBatch {
    pub tags: BTreeMap<usize, Vec<String>>,
    pub descriptions: BTreeMap<usize, String>,
    /// Batches whose request or response failed and were skipped.
    pub failed_batches: usize,
}

impl TagBatch {
    pub fn merge(&mut self, other: TagBatch) {
        self.tags.extend(other.tags);
        self.descriptions.extend(other.descriptions);
        self.failed_batches += other.failed_batches;
    }
}

/// Where a record's tags came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSource {
    Oracle,
    Fallback,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TagCoverage {
    pub oracle: usize,
    pub fallback: usize,
    pub untagged: usize,
    pub enhanced_descriptions: usize,
}

/// Split records into (resolvable, unresolved), preserving relative order.
pub fn partition_resolvable(
    records: Vec<PodcastRecord>,
) -> (Vec<PodcastRecord>, Vec<PodcastRecord>) {
    records.into_iter().partition(PodcastRecord::is_resolvable)
}

/// Assign categories from pass 1. Out-of-range indices are ignored.
///
/// Returns the number of records that ended up with a category.
pub fn apply_categorization(records: &mut [PodcastRecord], categorization: &Categorization) -> usize {
    for (label, indices) in &categorization.categories {
        for &index in indices {
            if let Some(record) = records.get_mut(index) {
                record.category = Some(label.clone());
            }
        }
    }
    records.iter().filter(|r| r.category.is_some()).count()
}

/// Choose tags for one record: the oracle's list when it is non-empty,
/// otherwise synthesized tags if the record has a category.
pub fn resolve_tags(record: &PodcastRecord, oracle_tags: Option<&[String]>) -> (Vec<String>, TagSource) {
    if let Some(tags) = oracle_tags.filter(|tags| !tags.is_empty()) {
        let tags = deduplicate_tags(tags);
        if !tags.is_empty() {
            return (tags, TagSource::Oracle);
        }
    }

    match record.category.as_deref() {
        Some(category) => {
            let synthesized = tags_for_podcast(category, record.display_title(), FALLBACK_MAX_TAGS);
            let tags = deduplicate_tags(&synthesized);
            if tags.is_empty() {
                (tags, TagSource::None)
            } else {
                (tags, TagSource::Fallback)
            }
        }
        None => (Vec::new(), TagSource::None),
    }
}

/// Apply pass 2 to every record, falling back per record.
pub fn apply_tag_batch(records: &mut [PodcastRecord], batch: &TagBatch) -> TagCoverage {
    let mut coverage = TagCoverage::default();

    for (index, record) in records.iter_mut().enumerate() {
        let (tags, source) = resolve_tags(record, batch.tags.get(&index).map(Vec::as_slice));
        record.tags = tags;
        match source {
            TagSource::Oracle => coverage.oracle += 1,
            TagSource::Fallback => coverage.fallback += 1,
            TagSource::None => coverage.untagged += 1,
        }

        if let Some(description) = batch.descriptions.get(&index) {
            let description = description.trim();
            if !description.is_empty() {
                record.enhanced_description = Some(description.to_string());
                coverage.enhanced_descriptions += 1;
            }
        }
    }

    coverage
}
