//! Wallet scanning.
//!
//! [`scan_once`] is the single-shot flow: one wallet, one streaming pass over
//! the candidate file. [`Scanner`] runs the same pipeline on a pool of
//! blocking workers against a pre-built [`CandidateIndex`] until the attempt
//! budget is spent, the deadline passes or the run is cancelled.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use seedmatch_primitives::entropy::{EntropySource, OsEntropy};

use crate::candidates;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::matcher::{CandidateIndex, MatchResult};
use crate::result_log::{MatchRecord, ResultLog};
use crate::wallet::{Wallet, WalletGenerator};

/// Time allowed past the run deadline for workers to finish their current
/// attempt before the run is abandoned.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Outcome of a single-shot scan.
#[derive(Debug)]
pub struct OnceReport {
    /// The generated wallet.
    pub wallet: Wallet,
    /// One result per derived address, in index order.
    pub results: Vec<MatchResult>,
    /// Matches written to the result log.
    pub matches: Vec<MatchRecord>,
    /// Matches that could not be written.
    pub unpersisted: Vec<MatchRecord>,
}

impl OnceReport {
    /// Whether any derived address was found in the candidate list.
    pub fn is_match(&self) -> bool {
        self.results.iter().any(MatchResult::is_match)
    }
}

/// Generate one wallet, stream `candidates` once for all of its addresses
/// and append every match to `log`.
///
/// A write failure is logged and the record returned in
/// [`OnceReport::unpersisted`]; it does not abort the scan.
pub fn scan_once<S: EntropySource>(
    generator: &WalletGenerator<S>,
    candidates: &Path,
    log: &ResultLog,
) -> Result<OnceReport, ScanError> {
    scan_wallet(generator.generate()?, candidates, log)
}

/// Match an already generated `wallet` against `candidates` in one pass.
///
/// The whole list is read before anything is persisted, so a read error
/// leaves no match behind.
pub fn scan_wallet(
    wallet: Wallet,
    candidates: &Path,
    log: &ResultLog,
) -> Result<OnceReport, ScanError> {
    let targets: Vec<&str> = wallet
        .addresses()
        .iter()
        .map(|derived| derived.address.as_str())
        .collect();
    let results = candidates::find_all_in_file(candidates, &targets)?;

    let mut report = OnceReport {
        wallet,
        results: Vec::new(),
        matches: Vec::new(),
        unpersisted: Vec::new(),
    };
    for (derived, result) in report.wallet.addresses().iter().zip(&results) {
        if !result.is_match() {
            continue;
        }
        info!(
            address = %derived.address,
            path = %derived.path,
            occurrences = result.count(),
            "candidate matched"
        );
        let record = MatchRecord::new(report.wallet.phrase(), derived.address.to_string());
        match log.append(&record) {
            Ok(()) => report.matches.push(record),
            Err(e) => {
                warn!(error = %e, address = %derived.address, "failed to persist match");
                report.unpersisted.push(record);
            }
        }
    }
    report.results = results;
    Ok(report)
}

/// Totals from a batch run.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Wallets generated across all workers.
    pub attempts: u64,
    /// Matches written to the result log.
    pub matches: Vec<MatchRecord>,
    /// Matches that could not be written, or were found after cancellation.
    /// They can be retried with [`ResultLog::append`].
    pub unpersisted: Vec<MatchRecord>,
    /// Whether the caller cancelled the run.
    pub cancelled: bool,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct WorkerOutcome {
    attempts: u64,
    matches: Vec<MatchRecord>,
    unpersisted: Vec<MatchRecord>,
    error: Option<ScanError>,
}

impl ScanReport {
    fn merge(&mut self, outcome: WorkerOutcome) {
        self.attempts += outcome.attempts;
        self.matches.extend(outcome.matches);
        self.unpersisted.extend(outcome.unpersisted);
    }
}

/// Batch scanner over a shared candidate index.
pub struct Scanner<S = OsEntropy> {
    config: ScanConfig,
    generator: Arc<WalletGenerator<S>>,
    index: Arc<CandidateIndex>,
    log: Arc<ResultLog>,
}

impl Scanner<OsEntropy> {
    /// Validate `config`, load its candidate list and open its result log.
    pub async fn from_config(config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        let path = config
            .candidates
            .clone()
            .ok_or_else(|| ScanError::Config("no candidate list given".into()))?;
        let index = candidates::load_index(path, config.io_timeout()).await?;
        let log = ResultLog::new(config.output_dir.clone());
        Self::with_source(config, OsEntropy, Arc::new(index), Arc::new(log))
    }
}

impl<S: EntropySource + 'static> Scanner<S> {
    /// Build a scanner from its parts.
    pub fn with_source(
        config: ScanConfig,
        source: S,
        index: Arc<CandidateIndex>,
        log: Arc<ResultLog>,
    ) -> Result<Self, ScanError> {
        config.validate()?;
        let generator = WalletGenerator::with_source(source)
            .with_passphrase(config.passphrase.clone())
            .with_entropy_bits(config.entropy_bits)
            .with_path(&config.derivation_path()?)?
            .with_addresses_per_seed(config.addresses_per_seed);
        Ok(Self {
            config,
            generator: Arc::new(generator),
            index,
            log,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The result log matches are appended to.
    pub fn log(&self) -> &ResultLog {
        &self.log
    }

    /// Run the workers until the attempt budget is spent, the deadline
    /// passes or `cancel` fires.
    ///
    /// Cancellation is checked before each attempt and again before a match
    /// is persisted. A worker error, or the run outliving its deadline plus
    /// a grace period, stops the other workers and returns
    /// [`ScanError::Aborted`] with everything collected so far.
    pub async fn run(&self, cancel: CancellationToken) -> Result<ScanReport, ScanError> {
        let started = Instant::now();
        let stop = cancel.child_token();
        let claimed = Arc::new(AtomicU64::new(0));
        let deadline = self.config.timeout().map(|limit| started + limit);

        info!(
            workers = self.config.workers,
            max_attempts = ?self.config.max_attempts,
            timeout_secs = ?self.config.timeout_secs,
            addresses_per_seed = self.config.addresses_per_seed,
            candidates = self.index.len(),
            "starting scan"
        );

        let mut set = JoinSet::new();
        for id in 0..self.config.workers {
            let worker = Worker {
                id,
                generator: Arc::clone(&self.generator),
                index: Arc::clone(&self.index),
                log: Arc::clone(&self.log),
                stop: stop.clone(),
                claimed: Arc::clone(&claimed),
                budget: self.config.max_attempts,
                deadline,
            };
            set.spawn_blocking(move || worker.run());
        }

        let mut report = ScanReport::default();
        let failure = match self.config.timeout() {
            Some(limit) => {
                let collecting = collect(&mut set, &stop, &mut report);
                match tokio::time::timeout(limit + SHUTDOWN_GRACE, collecting).await {
                    Ok(failure) => failure,
                    Err(_) => {
                        stop.cancel();
                        warn!(limit_secs = limit.as_secs(), "workers did not stop in time");
                        Some(ScanError::Timeout(limit))
                    }
                }
            }
            None => collect(&mut set, &stop, &mut report).await,
        };

        report.cancelled = cancel.is_cancelled();
        report.elapsed = started.elapsed();
        if let Some(source) = failure {
            warn!(
                error = %source,
                attempts = report.attempts,
                matches = report.matches.len(),
                unpersisted = report.unpersisted.len(),
                "scan aborted"
            );
            return Err(ScanError::Aborted {
                report: Box::new(report),
                source: Box::new(source),
            });
        }
        info!(
            attempts = report.attempts,
            matches = report.matches.len(),
            unpersisted = report.unpersisted.len(),
            cancelled = report.cancelled,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "scan finished"
        );
        Ok(report)
    }
}

/// Merge worker outcomes into `report` as they finish. Returns the first
/// worker error; outcomes of failed workers are merged too.
async fn collect(
    set: &mut JoinSet<WorkerOutcome>,
    stop: &CancellationToken,
    report: &mut ScanReport,
) -> Option<ScanError> {
    let mut failure = None;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(mut outcome) => {
                if let Some(e) = outcome.error.take() {
                    stop.cancel();
                    failure = failure.or(Some(e));
                }
                report.merge(outcome);
            }
            Err(join_err) => {
                stop.cancel();
                failure = failure.or(Some(ScanError::Worker(join_err.to_string())));
            }
        }
    }
    failure
}

struct Worker<S> {
    id: usize,
    generator: Arc<WalletGenerator<S>>,
    index: Arc<CandidateIndex>,
    log: Arc<ResultLog>,
    stop: CancellationToken,
    claimed: Arc<AtomicU64>,
    budget: Option<u64>,
    deadline: Option<Instant>,
}

impl<S: EntropySource> Worker<S> {
    fn run(self) -> WorkerOutcome {
        let mut outcome = WorkerOutcome::default();
        while self.next_attempt() {
            let wallet = match self.generator.generate() {
                Ok(wallet) => wallet,
                Err(e) => {
                    outcome.error = Some(e.into());
                    break;
                }
            };
            outcome.attempts += 1;
            debug!(worker = self.id, address = %wallet.first_address(), "attempt");

            for derived in wallet.addresses() {
                if !self.index.contains(derived.address.as_str()) {
                    continue;
                }
                info!(
                    worker = self.id,
                    address = %derived.address,
                    path = %derived.path,
                    "candidate matched"
                );
                let record = MatchRecord::new(wallet.phrase(), derived.address.to_string());
                if self.stop.is_cancelled() {
                    warn!(address = %derived.address, "cancelled before the match was persisted");
                    outcome.unpersisted.push(record);
                    continue;
                }
                match self.log.append(&record) {
                    Ok(()) => outcome.matches.push(record),
                    Err(e) => {
                        warn!(error = %e, address = %derived.address, "failed to persist match");
                        outcome.unpersisted.push(record);
                    }
                }
            }
        }
        outcome
    }

    /// Claim the next attempt, or report that this worker should stop.
    fn next_attempt(&self) -> bool {
        if self.stop.is_cancelled() {
            return false;
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return false;
        }
        match self.budget {
            Some(budget) => self.claimed.fetch_add(1, Ordering::Relaxed) < budget,
            None => true,
        }
    }
}
