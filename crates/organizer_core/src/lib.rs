//! Organizer core: pure data model, tag synthesis, enrichment application and
//! Markdown rendering. Nothing in this crate performs I/O.
mod classify;
mod enrich;
mod model;
mod render;
pub mod tags;

pub use classify::{classify_failure, FailureClass};
pub use enrich::{
    apply_categorization, apply_tag_batch, partition_resolvable, resolve_tags, Categorization, TagBatch,
    TagCoverage, TagSource, FALLBACK_MAX_TAGS,
};
pub use model::{FeedMetadata, FeedReference, FeedStatus, FetchFailure, PodcastRecord};
pub use render::{render_basic_markdown, render_enriched_markdown, UNCATEGORIZED};
pub use tags::{deduplicate_tags, normalize_tag, tags_for_podcast};
