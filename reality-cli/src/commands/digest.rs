// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `reality digest` command - Message digest benchmark.

use std::sync::Arc;

use reality_core::ByteBuffer;
use reality_stages::{DigestAlgorithm, DigestStage};
use tracing::{info, warn};

use super::{load_input, run_job, Job, RunOptions};
use crate::{Cli, SourceArgs};

pub async fn execute(
    cli: &Cli,
    source: &SourceArgs,
    algorithm: Option<DigestAlgorithm>,
) -> anyhow::Result<()> {
    let options = RunOptions::resolve(cli)?;
    let algorithm = algorithm.unwrap_or(options.stages.digest);
    let input = load_input(source).await?;

    let stage = DigestStage::new(algorithm);
    let expected = stage.digest(input.as_slice())?;
    let digest_hex = hex::encode(&expected);

    info!(algorithm = %algorithm, digest = %digest_hex, "Reference digest computed");
    options.announce(format!("{}: {}", algorithm, digest_hex));

    let report = run_job(
        Job {
            name: algorithm.to_string(),
            stages: vec![Box::new(stage)],
            input,
            verify: Some(Arc::new(ByteBuffer::new(expected))),
            threads: options.run.threads,
        },
        &options,
    )
    .await?;

    if !report.is_clean() {
        warn!(algorithm = %algorithm, "Digest runs did not match the reference digest");
    }
    Ok(())
}
