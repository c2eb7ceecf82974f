//! Reading the candidate address list from disk.
//!
//! The list is UTF-8 text with one address per line. A missing or unreadable
//! file surfaces as [`ScanError::InputSource`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::error::ScanError;
use crate::matcher::{AddressMatcher, CandidateIndex, MatchResult};

/// Open `path` and stream its lines lazily.
pub fn read_lines(
    path: &Path,
) -> Result<impl Iterator<Item = Result<String, ScanError>>, ScanError> {
    let file = File::open(path).map_err(|source| ScanError::InputSource {
        path: path.to_path_buf(),
        source,
    })?;
    let path = path.to_path_buf();
    Ok(BufReader::new(file).lines().map(move |line| {
        line.map_err(|source| ScanError::InputSource {
            path: path.clone(),
            source,
        })
    }))
}

/// Stream `path` once looking for `target`.
pub fn find_in_file(path: &Path, target: &str) -> Result<MatchResult, ScanError> {
    AddressMatcher::new(target).try_find(read_lines(path)?)
}

/// Stream `path` once, matching every line against all of `targets`.
pub fn find_all_in_file<T: AsRef<str>>(
    path: &Path,
    targets: &[T],
) -> Result<Vec<MatchResult>, ScanError> {
    AddressMatcher::try_find_all(targets, read_lines(path)?)
}

/// Build a [`CandidateIndex`] from `path` on the calling thread.
pub fn load_index_blocking(path: &Path) -> Result<CandidateIndex, ScanError> {
    let index = CandidateIndex::try_from_lines(read_lines(path)?)?;
    info!(
        path = %path.display(),
        lines = index.lines_read(),
        distinct = index.len(),
        "loaded candidate list"
    );
    Ok(index)
}

/// Build a [`CandidateIndex`] from `path` on the blocking pool, giving up
/// after `io_timeout`.
pub async fn load_index(path: PathBuf, io_timeout: Duration) -> Result<CandidateIndex, ScanError> {
    let task = tokio::task::spawn_blocking(move || load_index_blocking(&path));
    match tokio::time::timeout(io_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(ScanError::Worker(join_err.to_string())),
        Err(_) => Err(ScanError::Timeout(io_timeout)),
    }
}
