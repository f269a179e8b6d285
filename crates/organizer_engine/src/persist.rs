use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use organizer_logging::organizer_debug;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("output path has no file name: {0}")]
    NoFileName(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Replace the file at `path` with `content`, creating missing parent
/// directories.
///
/// The bytes go to a temp file beside the target, which is then renamed
/// over it, so a reader sees either the old document or the new one.
pub fn write_file(path: &Path, content: &str) -> Result<PathBuf, PersistError> {
    if path.file_name().is_none() {
        return Err(PersistError::NoFileName(path.to_path_buf()));
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|source| PersistError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|err| PersistError::Io(err.error))?;

    organizer_debug!("wrote {} bytes to {}", content.len(), path.display());
    Ok(path.to_path_buf())
}
