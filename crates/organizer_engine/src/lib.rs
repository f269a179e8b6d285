//! Organizer engine: feed fetching, the oracle clients and the enrichment
//! pipeline, plus the file-level inputs and outputs around them.
mod enrich;
mod feed;
mod fetch;
mod opml;
pub mod oracle;
mod orchestrator;
mod persist;
mod report;
mod types;

pub use enrich::{enrich_records, EnrichOptions, Enrichment, EnrichmentReport};
pub use feed::{fetch_record, parse_feed};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, USER_AGENT};
pub use opml::{parse_opml, parse_opml_file, OpmlError};
pub use oracle::{create_oracle, ConfigError, Oracle, OracleError, OracleSettings, ProviderKind};
pub use orchestrator::fetch_all;
pub use persist::{write_file, PersistError};
pub use report::{write_enrichment_report, ReportError};
pub use types::{FetchEvent, FetchOutput, NoopProgress, ProgressSink};
