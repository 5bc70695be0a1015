//! Textseal CLI - Passphrase-based text encryption
//!
//! Encrypts text into a base64 envelope, or decrypts an envelope back into
//! text, using PBKDF2-HMAC-SHA256 key derivation and AES-256-GCM.

use clap::{ArgGroup, Parser};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use textseal::Result;
use textseal::kdf::KdfParams;
use textseal::passphrase::passphrase_reader;
use textseal::sealer::Sealer;
use textseal::text_ops::{self, Mode};

#[derive(Parser)]
#[command(name = "textseal")]
#[command(version)]
#[command(about = "Passphrase-based text encryption.", long_about = None)]
#[command(group(
    ArgGroup::new("passphrase_source")
        .required(true)
        .multiple(true)
        .args(["passphrase", "passphrase_file"])
))]
struct Cli {
    /// Input text (plain text if encrypting, envelope if decrypting). If
    /// absent, read from stdin.
    #[arg(short, long, value_name = "TEXT")]
    input: Option<String>,

    /// Passphrase to use for encryption/decryption. An empty value counts
    /// as not given.
    #[arg(short, long, value_name = "PASSPHRASE")]
    passphrase: Option<String>,

    /// File containing the passphrase, used when --passphrase is absent.
    /// Use - to read from stdin. If both passphrase and input come from
    /// stdin, the passphrase is read first.
    #[arg(long, visible_alias = "pf", value_name = "FILE")]
    passphrase_file: Option<PathBuf>,

    /// Decrypt instead of encrypt
    #[arg(short, long)]
    decrypt: bool,

    /// Use the legacy 1000-iteration key derivation, for envelopes
    /// written by older tools
    #[arg(long, conflicts_with = "iterations")]
    legacy: bool,

    /// PBKDF2 iteration count (must match between encrypt and decrypt)
    #[arg(long, value_name = "N")]
    iterations: Option<u32>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    init_telemetry(&cli.log_level);

    match run(cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e.chain_message());
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let params = if cli.legacy {
        KdfParams::legacy()
    } else if let Some(iterations) = cli.iterations {
        KdfParams::new(iterations)?
    } else {
        KdfParams::default()
    };
    let sealer = Sealer::new(params);

    let mode = if cli.decrypt {
        Mode::Decrypt
    } else {
        Mode::Encrypt
    };
    let mut reader = passphrase_reader(cli.passphrase, cli.passphrase_file)?;

    text_ops::run(mode, cli.input, &mut io::stdin(), &mut *reader, &sealer)
}

/// Logs go to stderr so stdout carries only the result.
fn init_telemetry(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_ansi(false),
        )
        .init();
}
