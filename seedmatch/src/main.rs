use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use seedmatch::primitives::{DerivationPath, Mnemonic};
use seedmatch::scanner::logging::{init_logging, LogFormat};
use seedmatch::scanner::{
    scan_wallet, CancellationToken, MatchRecord, ResultLog, ScanConfig, ScanError, Scanner,
    WalletGenerator,
};

mod commands;

use commands::Commands;

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"), about = env!("CARGO_PKG_DESCRIPTION"), version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[arg(long, global = true, help = "Log format on stderr: text or json [env: SEEDMATCH_LOG_FORMAT]")]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format.unwrap_or_else(LogFormat::from_env));

    match cli.command {
        Commands::Once {
            candidates,
            output_dir,
            passphrase,
        } => once(candidates, output_dir, passphrase).await,
        Commands::Batch {
            candidates,
            config,
            output_dir,
            workers,
            attempts,
            timeout_secs,
            addresses_per_seed,
            passphrase,
        } => {
            let mut config = match config {
                Some(path) => ScanConfig::from_json_file(&path)?,
                None => ScanConfig::default(),
            };
            if let Some(path) = candidates {
                config.candidates = Some(path);
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(n) = workers {
                config.workers = n;
            }
            if let Some(n) = attempts {
                config.max_attempts = Some(n);
            }
            if let Some(secs) = timeout_secs {
                config.timeout_secs = Some(secs);
            }
            if let Some(n) = addresses_per_seed {
                config.addresses_per_seed = n;
            }
            if let Some(p) = passphrase {
                config.passphrase = p;
            }
            batch(config).await
        }
        Commands::Derive {
            mnemonic,
            passphrase,
            path,
            count,
        } => derive(&mnemonic, passphrase, &path, count),
    }
}

async fn once(candidates: Option<PathBuf>, output_dir: PathBuf, passphrase: String) -> Result<()> {
    let generator = WalletGenerator::new().with_passphrase(passphrase);
    let wallet = generator.generate()?;
    println!("Seed Phrase: {}", wallet.phrase());
    println!("Bitcoin Address: {}", wallet.first_address());

    let candidates = match candidates {
        Some(path) => path,
        None => prompt_for_path()?,
    };
    let log = ResultLog::new(output_dir);
    let log_path = log.path().to_path_buf();

    let report = tokio::task::spawn_blocking(move || scan_wallet(wallet, &candidates, &log))
        .await
        .context("scan task failed")??;

    if !report.is_match() {
        println!("No match found.");
        return Ok(());
    }
    for record in &report.matches {
        println!("Match found for {}, saved to {}", record.address, log_path.display());
    }
    report_unpersisted(&report.unpersisted)
}

async fn batch(config: ScanConfig) -> Result<()> {
    let scanner = Scanner::from_config(config).await?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping workers");
            trigger.cancel();
        }
    });

    let (report, failure) = match scanner.run(cancel).await {
        Ok(report) => (report, None),
        Err(ScanError::Aborted { report, source }) => (*report, Some(*source)),
        Err(e) => return Err(e.into()),
    };
    println!(
        "Generated {} wallets in {:.1}s, {} match(es) saved to {}",
        report.attempts,
        report.elapsed.as_secs_f64(),
        report.matches.len(),
        scanner.log().path().display()
    );

    let mut still_unpersisted = Vec::new();
    for record in report.unpersisted {
        if let Err(e) = scanner.log().append(&record) {
            warn!(error = %e, address = %record.address, "retry failed");
            still_unpersisted.push(record);
        }
    }
    report_unpersisted(&still_unpersisted)?;
    match failure {
        Some(e) => Err(e).context("scan aborted"),
        None => Ok(()),
    }
}

fn derive(mnemonic: &str, passphrase: String, path: &str, count: u32) -> Result<()> {
    let mnemonic: Mnemonic = mnemonic.parse().context("invalid mnemonic")?;
    let path: DerivationPath = path.parse().context("invalid derivation path")?;
    let generator = WalletGenerator::new()
        .with_passphrase(passphrase)
        .with_path(&path)?
        .with_addresses_per_seed(count);

    let wallet = generator.derive(mnemonic)?;
    for derived in wallet.addresses() {
        println!("{}  {}", derived.path, derived.address);
    }
    Ok(())
}

/// Print matches that could not be saved so they are not lost, then fail.
fn report_unpersisted(records: &[MatchRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    for record in records {
        print!("{}", record.to_record_string());
    }
    bail!("{} match(es) could not be written to the result log", records.len())
}

fn prompt_for_path() -> Result<PathBuf> {
    print!("Enter the path to the candidate address list: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("cannot read from stdin")?;
    let path = line.trim();
    if path.is_empty() {
        bail!("no candidate list given");
    }
    Ok(PathBuf::from(path))
}
