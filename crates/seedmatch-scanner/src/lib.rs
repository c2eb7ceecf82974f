#![deny(missing_docs)]

//! # seedmatch-scanner
//!
//! Generates wallets with `seedmatch-primitives`, checks their addresses
//! against a candidate list and appends every hit to a result log.
//!
//! # Example
//!
//! ```no_run
//! use seedmatch_scanner::{ScanConfig, Scanner};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), seedmatch_scanner::ScanError> {
//! let config = ScanConfig::default()
//!     .with_candidates("addresses.txt")
//!     .with_max_attempts(1_000);
//! let scanner = Scanner::from_config(config).await?;
//! let report = scanner.run(CancellationToken::new()).await?;
//! println!("{} attempts, {} matches", report.attempts, report.matches.len());
//! # Ok(())
//! # }
//! ```

pub mod candidates;
pub mod config;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod result_log;
pub mod scanner;
pub mod wallet;


pub use config::ScanConfig;
pub use error::ScanError;
pub use matcher::{AddressMatcher, CandidateIndex, MatchResult};
pub use result_log::{MatchRecord, ResultLog};
pub use scanner::{scan_once, scan_wallet, OnceReport, ScanReport, Scanner};
pub use tokio_util::sync::CancellationToken;
pub use wallet::{DerivedAddress, Wallet, WalletGenerator};
