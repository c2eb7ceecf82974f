use std::path::PathBuf;

use clap::Subcommand;
use seedmatch::scanner::result_log::DEFAULT_OUTPUT_DIR;

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one wallet and look for its address in a candidate list
    Once {
        #[arg(short, long, help = "Candidate address list, one per line (prompted if omitted)")]
        candidates: Option<PathBuf>,
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, help = "Directory for matched phrases")]
        output_dir: PathBuf,
        #[arg(short, long, default_value = "", help = "BIP-39 passphrase")]
        passphrase: String,
    },
    /// Generate wallets on several workers until a limit is reached
    Batch {
        #[arg(short, long, help = "Candidate address list, one per line")]
        candidates: Option<PathBuf>,
        #[arg(long, help = "JSON configuration file; flags override its values")]
        config: Option<PathBuf>,
        #[arg(short, long, help = "Directory for matched phrases")]
        output_dir: Option<PathBuf>,
        #[arg(short, long, help = "Number of worker threads")]
        workers: Option<usize>,
        #[arg(short, long, help = "Total wallets to generate")]
        attempts: Option<u64>,
        #[arg(short, long, help = "Stop after this many seconds")]
        timeout_secs: Option<u64>,
        #[arg(long, help = "Consecutive address indices to check per wallet")]
        addresses_per_seed: Option<u32>,
        #[arg(short, long, help = "BIP-39 passphrase")]
        passphrase: Option<String>,
    },
    /// Recompute the addresses of a known mnemonic
    Derive {
        #[arg(short, long, help = "Mnemonic phrase")]
        mnemonic: String,
        #[arg(short, long, default_value = "", help = "BIP-39 passphrase")]
        passphrase: String,
        #[arg(long, default_value = "m/44'/0'/0'/0/0", help = "Path of the first address")]
        path: String,
        #[arg(short, long, default_value = "1", help = "Number of consecutive addresses")]
        count: u32,
    },
}
