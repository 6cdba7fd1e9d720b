// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `reality cipher` command - Encrypt/decrypt round trip benchmark.

use std::sync::Arc;

use reality_core::Stage;
use reality_stages::{CipherAlgorithm, CipherKit, CipherMode, CipherSettings};
use tracing::{info, warn};

use super::{load_input, run_job, Job, RunOptions};
use crate::{Cli, SourceArgs};

/// Merge flag overrides into the configured cipher.
///
/// Changing AES mode keeps the configured key size. Switching between AES and
/// ChaCha20-Poly1305 without a key size falls back to that cipher's default.
pub fn select_cipher(
    configured: CipherSettings,
    algorithm: Option<CipherAlgorithm>,
    mode: Option<CipherMode>,
    key_bits: Option<u16>,
) -> anyhow::Result<CipherSettings> {
    let algorithm = match (algorithm, mode) {
        (Some(alg), Some(mode)) => Some(alg.with_mode(mode)?),
        (None, Some(mode)) => Some(configured.algorithm.with_mode(mode)?),
        (alg, None) => alg,
    };
    let key_bits = match (algorithm, key_bits) {
        (Some(CipherAlgorithm::Aes(_)), None)
            if matches!(configured.algorithm, CipherAlgorithm::Aes(_)) =>
        {
            Some(configured.key_bits)
        }
        (_, bits) => bits,
    };
    let settings = match (algorithm, key_bits) {
        (None, None) => configured,
        (None, Some(bits)) => CipherSettings::new(configured.algorithm, Some(bits))?,
        (Some(alg), bits) => CipherSettings::new(alg, bits)?,
    };
    Ok(settings)
}

pub async fn execute(
    cli: &Cli,
    source: &SourceArgs,
    algorithm: Option<CipherAlgorithm>,
    mode: Option<CipherMode>,
    key_bits: Option<u16>,
) -> anyhow::Result<()> {
    let options = RunOptions::resolve(cli)?;
    let settings = select_cipher(options.stages.cipher, algorithm, mode, key_bits)?;
    let input = load_input(source).await?;

    let kit = CipherKit::generate(settings)?;
    info!(cipher = %settings.label(), "Generated key material");

    let stages: Vec<Box<dyn Stage>> = vec![
        Box::new(kit.encrypt_stage()),
        Box::new(kit.decrypt_stage()),
    ];

    let report = run_job(
        Job {
            name: settings.label(),
            stages,
            input: Arc::clone(&input),
            verify: Some(input),
            threads: options.run.threads,
        },
        &options,
    )
    .await?;

    if !report.is_clean() {
        warn!(cipher = %settings.label(), "Round trip did not reproduce the input");
    }
    Ok(())
}
