// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Reality CLI
//!
//! Command-line front end for the pipeline benchmarks.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reality_stages::{CipherAlgorithm, CipherMode, DigestAlgorithm};

mod commands;
mod contents;

/// Reality - multi-threaded pipeline benchmarks for ciphers, digests and zlib
#[derive(Parser)]
#[command(name = "reality")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file path (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging and per-thread output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Seconds each worker keeps looping (0 selects the default of 3)
    #[arg(short = 'r', long, global = true)]
    pub seconds: Option<u64>,

    /// Number of worker threads (defaults to the logical CPU count)
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Also save each report as JSON into this directory
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

/// Where the benchmark input comes from.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Input file path or http(s) URL
    #[arg(conflicts_with = "random")]
    pub source: Option<String>,

    /// Use this many random bytes instead (e.g. 64K, 10M, 1G)
    #[arg(short = 'u', long, value_parser = contents::parse_human_size)]
    pub random: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt then decrypt the input with AES or ChaCha20-Poly1305
    Cipher {
        #[command(flatten)]
        source: SourceArgs,

        /// Cipher algorithm (aes, aes-gcm, chacha20-poly1305, ...)
        #[arg(short, long)]
        algorithm: Option<CipherAlgorithm>,

        /// AES mode (cbc, cfb, ofb, ctr, gcm, ccm)
        #[arg(short, long)]
        mode: Option<CipherMode>,

        /// Key size in bits
        #[arg(short, long)]
        key_bits: Option<u16>,
    },

    /// Hash the input with a message digest
    Digest {
        #[command(flatten)]
        source: SourceArgs,

        /// Digest algorithm (md5, sha1, sha256, sha3-512, ripemd160, blake3, crc32, ...)
        #[arg(short, long)]
        algorithm: Option<DigestAlgorithm>,
    },

    /// Compress and decompress the input with zlib at several levels
    Zlib {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Validate a settings file
    Validate {
        /// Path to the settings file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    // Dispatch to command handlers
    match &cli.command {
        Commands::Cipher {
            source,
            algorithm,
            mode,
            key_bits,
        } => commands::cipher::execute(&cli, source, *algorithm, *mode, *key_bits).await,
        Commands::Digest { source, algorithm } => {
            commands::digest::execute(&cli, source, *algorithm).await
        }
        Commands::Zlib { source } => commands::zlib::execute(&cli, source).await,
        Commands::Validate { file } => commands::validate::execute(file).await,
    }
}
