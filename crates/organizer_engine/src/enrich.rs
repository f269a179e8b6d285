use std::collections::BTreeMap;

use organizer_core::{
    apply_categorization, apply_tag_batch, partition_resolvable, Categorization, PodcastRecord,
    TagCoverage,
};
use organizer_logging::organizer_info;
use serde::Serialize;

use crate::oracle::{Oracle, OracleError, DEFAULT_TAG_BATCH_SIZE};

#[derive(Debug, Clone, Copy)]
pub struct EnrichOptions {
    pub tag_batch_size: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            tag_batch_size: DEFAULT_TAG_BATCH_SIZE,
        }
    }
}

/// Summary of one enrichment call, written to disk on request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EnrichmentReport {
    pub provider: String,
    pub categories: BTreeMap<String, Vec<usize>>,
    pub categorized: usize,
    pub uncategorized: usize,
    pub tags: TagCoverage,
    pub failed_batches: usize,
}

#[derive(Debug, Clone)]
pub struct Enrichment {
    /// Resolvable records first, then unresolved ones, each in input order.
    pub records: Vec<PodcastRecord>,
    pub report: EnrichmentReport,
}

/// Categorize and tag every resolvable record.
///
/// Unresolved records pass through untouched. A categorize failure is
/// returned as-is; tag batch failures degrade to locally synthesized tags.
pub async fn enrich_records(
    records: Vec<PodcastRecord>,
    oracle: &dyn Oracle,
    options: &EnrichOptions,
) -> Result<Enrichment, OracleError> {
    let (mut resolvable, unresolved) = partition_resolvable(records);

    if resolvable.is_empty() {
        organizer_info!("no resolvable podcasts, skipping {}", oracle.name());
        return Ok(Enrichment {
            records: unresolved,
            report: EnrichmentReport {
                provider: oracle.name().to_string(),
                ..EnrichmentReport::default()
            },
        });
    }

    organizer_info!(
        "categorizing {} podcasts with {}",
        resolvable.len(),
        oracle.name()
    );
    let categorization: Categorization = oracle.categorize(&resolvable).await?;
    let categorized = apply_categorization(&mut resolvable, &categorization);
    organizer_info!(
        "{} categories, {} of {} podcasts categorized",
        categorization.categories.len(),
        categorized,
        resolvable.len()
    );

    let batch = oracle
        .generate_tags_batched(&resolvable, options.tag_batch_size)
        .await;
    let coverage = apply_tag_batch(&mut resolvable, &batch);
    organizer_info!(
        "tags: {} from {}, {} synthesized, {} untagged ({} failed batches)",
        coverage.oracle,
        oracle.name(),
        coverage.fallback,
        coverage.untagged,
        batch.failed_batches
    );

    let report = EnrichmentReport {
        provider: oracle.name().to_string(),
        uncategorized: resolvable.len() - categorized,
        categorized,
        categories: categorization.categories,
        tags: coverage,
        failed_batches: batch.failed_batches,
    };

    let mut records = resolvable;
    records.extend(unresolved);
    Ok(Enrichment { records, report })
}
