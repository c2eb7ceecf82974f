//! Error types for scanning operations.

use std::path::PathBuf;
use std::time::Duration;

use seedmatch_primitives::PrimitivesError;

use crate::scanner::ScanReport;

/// Errors that can occur while loading candidates, generating wallets or
/// persisting matches.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The candidate list is missing or unreadable.
    #[error("cannot read candidate list {}: {source}", path.display())]
    InputSource {
        /// Path of the candidate list.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// A match record could not be written to the result log.
    #[error("cannot write result log {}: {source}", path.display())]
    Persistence {
        /// Path of the result log.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// Configuration values are invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A configuration file is not valid JSON for [`ScanConfig`](crate::ScanConfig).
    #[error("cannot parse config file {}: {source}", path.display())]
    ConfigFile {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying parse failure.
        source: serde_json::Error,
    },

    /// An I/O deadline or the run deadline was exceeded.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Key derivation or entropy failure.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),

    /// A worker task panicked or was aborted.
    #[error("worker failed: {0}")]
    Worker(String),

    /// A batch run stopped on an error after doing some work.
    ///
    /// `report` holds everything collected before the failure, including
    /// matches that were found but never written.
    #[error("scan aborted after {} attempt(s): {source}", .report.attempts)]
    Aborted {
        /// Totals collected before the run stopped.
        report: Box<ScanReport>,
        /// The error that stopped the run.
        source: Box<ScanError>,
    },
}

impl ScanError {
    /// The partial report carried by [`ScanError::Aborted`], if any.
    pub fn partial_report(&self) -> Option<&ScanReport> {
        match self {
            ScanError::Aborted { report, .. } => Some(report),
            _ => None,
        }
    }
}
