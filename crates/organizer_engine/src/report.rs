use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::persist::{write_file, PersistError};
use crate::EnrichmentReport;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize enrichment report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Write `report` as pretty JSON. Used for inspection only; nothing reads
/// it back.
pub fn write_enrichment_report(
    path: &Path,
    report: &EnrichmentReport,
) -> Result<PathBuf, ReportError> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(write_file(path, &json)?)
}
