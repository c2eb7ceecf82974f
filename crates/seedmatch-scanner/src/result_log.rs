//! Append-only log of matched phrases.
//!
//! Each record is `Seed Phrase: <words>\nAddress: <addr>\n\n`. Records are
//! formatted in full and written with a single append while the log's lock
//! is held, so concurrent workers never interleave.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::ScanError;

/// Default directory for the result log.
pub const DEFAULT_OUTPUT_DIR: &str = "Wallet_Phrases1";

/// File name of the result log inside its directory.
pub const RESULT_FILE_NAME: &str = "matched_phrases.txt";

/// A mnemonic phrase paired with the matching address.
#[derive(Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// Space-separated mnemonic words.
    pub phrase: String,
    /// The matched P2PKH address.
    pub address: String,
}

impl MatchRecord {
    /// Create a record.
    pub fn new(phrase: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            address: address.into(),
        }
    }

    /// The exact bytes appended to the log for this record.
    pub fn to_record_string(&self) -> String {
        format!("Seed Phrase: {}\nAddress: {}\n\n", self.phrase, self.address)
    }
}

impl fmt::Debug for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchRecord")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// The result log file. The directory is created on first write.
#[derive(Debug)]
pub struct ResultLog {
    dir: PathBuf,
    path: PathBuf,
    lock: Mutex<()>,
}

impl ResultLog {
    /// A log at `dir/matched_phrases.txt`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let path = dir.join(RESULT_FILE_NAME);
        Self {
            dir,
            path,
            lock: Mutex::new(()),
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    ///
    /// On failure nothing is retained here; the caller keeps the record and
    /// may call `append` again.
    pub fn append(&self, record: &MatchRecord) -> Result<(), ScanError> {
        let text = record.to_record_string();
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        fs::create_dir_all(&self.dir).map_err(|source| self.persistence(source))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.persistence(source))?;
        file.write_all(text.as_bytes())
            .map_err(|source| self.persistence(source))?;
        file.flush().map_err(|source| self.persistence(source))
    }

    fn persistence(&self, source: std::io::Error) -> ScanError {
        ScanError::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for ResultLog {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon \
                          abandon abandon abandon abandon abandon about";
    const ADDRESS: &str = "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA";

    #[test]
    fn test_record_format() {
        let record = MatchRecord::new(PHRASE, ADDRESS);
        assert_eq!(
            record.to_record_string(),
            format!("Seed Phrase: {PHRASE}\nAddress: {ADDRESS}\n\n")
        );
        assert!(!format!("{record:?}").contains("abandon"));
    }

    #[test]
    fn test_append_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(DEFAULT_OUTPUT_DIR);
        let log = ResultLog::new(&dir);
        assert!(!dir.exists());

        log.append(&MatchRecord::new(PHRASE, ADDRESS)).unwrap();
        log.append(&MatchRecord::new("second phrase", ADDRESS)).unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            contents,
            format!(
                "Seed Phrase: {PHRASE}\nAddress: {ADDRESS}\n\n\
                 Seed Phrase: second phrase\nAddress: {ADDRESS}\n\n"
            )
        );
        assert_eq!(log.path(), dir.join(RESULT_FILE_NAME));
    }

    #[test]
    fn test_append_failure_is_persistence_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        // A directory cannot be created beneath a regular file.
        let log = ResultLog::new(tmp.path().join("sub"));
        assert!(matches!(
            log.append(&MatchRecord::new(PHRASE, ADDRESS)),
            Err(ScanError::Persistence { .. })
        ));
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let tmp = tempfile::tempdir().unwrap();
        let log = Arc::new(ResultLog::new(tmp.path()));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let record = MatchRecord::new(format!("phrase {t} {i}"), ADDRESS);
                        log.append(&record).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = fs::read_to_string(log.path()).unwrap();
        let records: Vec<&str> = contents
            .split("\n\n")
            .filter(|r| !r.is_empty())
            .collect();
        assert_eq!(records.len(), 200);
        for record in records {
            let mut lines = record.lines();
            assert!(lines.next().unwrap().starts_with("Seed Phrase: phrase "));
            assert_eq!(lines.next(), Some(format!("Address: {ADDRESS}").as_str()));
            assert_eq!(lines.next(), None);
        }
    }
}
