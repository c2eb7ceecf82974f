//! Scanner configuration.
//!
//! Defaults reproduce the single-address flow: 128-bit entropy, an empty
//! passphrase, path `m/44'/0'/0'/0/0` and one address per seed. Values can
//! be loaded from a JSON file and then overridden field by field.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use seedmatch_primitives::entropy::{DEFAULT_ENTROPY_BITS, VALID_ENTROPY_BITS};
use seedmatch_primitives::DerivationPath;

use crate::error::ScanError;
use crate::result_log::DEFAULT_OUTPUT_DIR;

/// Default derivation path of the first address.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/0'/0'/0/0";

/// Default deadline for loading the candidate list.
pub const DEFAULT_IO_TIMEOUT_SECS: u64 = 30;

/// Settings for a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Candidate address list, one address per line.
    pub candidates: Option<PathBuf>,
    /// Directory holding the result log.
    pub output_dir: PathBuf,
    /// Number of blocking worker tasks.
    pub workers: usize,
    /// Total wallets to generate across all workers. `None` runs until
    /// cancelled or timed out.
    pub max_attempts: Option<u64>,
    /// Wall-clock limit for the whole run, in seconds.
    pub timeout_secs: Option<u64>,
    /// Deadline for loading the candidate list, in seconds.
    pub io_timeout_secs: u64,
    /// Consecutive address indices checked per seed.
    pub addresses_per_seed: u32,
    /// BIP-39 passphrase.
    pub passphrase: String,
    /// Entropy size of generated mnemonics.
    pub entropy_bits: u32,
    /// Path of the first address checked for each seed.
    pub derivation_path: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            candidates: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            max_attempts: None,
            timeout_secs: None,
            io_timeout_secs: DEFAULT_IO_TIMEOUT_SECS,
            addresses_per_seed: 1,
            passphrase: String::new(),
            entropy_bits: DEFAULT_ENTROPY_BITS,
            derivation_path: DEFAULT_DERIVATION_PATH.to_string(),
        }
    }
}

impl ScanConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ScanError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ScanError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&text).map_err(|source| ScanError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set the candidate list.
    pub fn with_candidates(mut self, path: impl Into<PathBuf>) -> Self { self.candidates = Some(path.into()); self }
    /// Set the result directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self { self.output_dir = dir.into(); self }
    /// Set the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self { self.workers = workers; self }
    /// Cap the total attempts.
    pub fn with_max_attempts(mut self, attempts: u64) -> Self { self.max_attempts = Some(attempts); self }
    /// Set the run deadline.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self { self.timeout_secs = Some(secs); self }
    /// Set how many indices to check per seed.
    pub fn with_addresses_per_seed(mut self, count: u32) -> Self { self.addresses_per_seed = count; self }
    /// Set the BIP-39 passphrase.
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self { self.passphrase = passphrase.into(); self }

    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.workers == 0 {
            return Err(ScanError::Config("workers must be at least 1".into()));
        }
        if self.addresses_per_seed == 0 {
            return Err(ScanError::Config(
                "addresses_per_seed must be at least 1".into(),
            ));
        }
        if self.io_timeout_secs == 0 {
            return Err(ScanError::Config("io_timeout_secs must be at least 1".into()));
        }
        if self.timeout_secs == Some(0) {
            return Err(ScanError::Config("timeout_secs must be at least 1".into()));
        }
        if !VALID_ENTROPY_BITS.contains(&(self.entropy_bits as usize)) {
            return Err(ScanError::Config(format!(
                "entropy_bits must be one of {VALID_ENTROPY_BITS:?}, got {}",
                self.entropy_bits
            )));
        }
        self.derivation_path()?;
        Ok(())
    }

    /// The parsed derivation path. It must name at least one step.
    pub fn derivation_path(&self) -> Result<DerivationPath, ScanError> {
        let path: DerivationPath = self.derivation_path.parse()?;
        if path.is_empty() {
            return Err(ScanError::Config(
                "derivation_path must name at least one step".into(),
            ));
        }
        Ok(path)
    }

    /// The run deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// The candidate loading deadline.
    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScanConfig::default();
        config.validate().unwrap();
        assert_eq!(config.addresses_per_seed, 1);
        assert_eq!(config.entropy_bits, 128);
        assert_eq!(config.output_dir, PathBuf::from("Wallet_Phrases1"));
        assert_eq!(
            config.derivation_path().unwrap(),
            DerivationPath::bitcoin_receive()
        );
        assert!(config.workers >= 1);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad = [
            ScanConfig::default().with_workers(0),
            ScanConfig::default().with_addresses_per_seed(0),
            ScanConfig::default().with_timeout_secs(0),
            ScanConfig { entropy_bits: 100, ..Default::default() },
            ScanConfig { io_timeout_secs: 0, ..Default::default() },
            ScanConfig { derivation_path: "m".into(), ..Default::default() },
            ScanConfig { derivation_path: "44'/0'".into(), ..Default::default() },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn test_json_file_with_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"workers": 3, "addresses_per_seed": 5, "candidates": "list.txt"}}"#).unwrap();

        let config = ScanConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.addresses_per_seed, 5);
        assert_eq!(config.candidates, Some(PathBuf::from("list.txt")));
        assert_eq!(config.derivation_path, DEFAULT_DERIVATION_PATH);
        assert_eq!(config.io_timeout(), Duration::from_secs(DEFAULT_IO_TIMEOUT_SECS));
    }

    #[test]
    fn test_json_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            ScanConfig::from_json_file(file.path()),
            Err(ScanError::ConfigFile { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ScanConfig::from_json_file(&dir.path().join("missing.json")),
            Err(ScanError::Config(_))
        ));
    }
}
