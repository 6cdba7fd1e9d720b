// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `reality zlib` command - Compression and decompression benchmark suite.
//!
//! Every level in [`ZlibLevel::SUITE`] is measured single-threaded and then
//! with the configured thread count, followed by decompression of the
//! best-compressed input.

use std::sync::Arc;

use anyhow::bail;
use reality_core::{ByteBuffer, Stage, ThreadCount};
use reality_report::format_ratio;
use reality_stages::{DeflateStage, InflateStage, ZlibLevel};
use tracing::{info, warn};

use super::{load_input, run_job, Job, RunOptions};
use crate::{Cli, SourceArgs};

/// Thread counts to measure: one, then the configured count when it differs.
pub fn thread_sweep(configured: ThreadCount) -> Vec<ThreadCount> {
    let mut sweep = vec![ThreadCount::MIN];
    if configured.get() > 1 {
        sweep.push(configured);
    }
    sweep
}

fn thread_heading(threads: ThreadCount) -> String {
    match threads.get() {
        1 => "1 thread:".to_string(),
        n => format!("{} threads:", n),
    }
}

/// Compress at best compression and check the round trip before timing anything.
pub fn sanity_check(input: &ByteBuffer) -> anyhow::Result<ByteBuffer> {
    let compressed = DeflateStage::new(ZlibLevel::BEST).deflate(input.as_slice())?;
    let restored = InflateStage::new().inflate(&compressed)?;
    if restored != input.as_slice() {
        bail!("zlib round trip did not reproduce the input");
    }
    Ok(ByteBuffer::new(compressed))
}

/// Run `make_stage` once per thread count in the sweep.
async fn sweep(
    label: &str,
    make_stage: impl Fn() -> Box<dyn Stage>,
    input: &Arc<ByteBuffer>,
    expected: &Arc<ByteBuffer>,
    options: &RunOptions,
) -> anyhow::Result<bool> {
    let mut clean = true;
    for threads in thread_sweep(options.run.threads) {
        options.announce(thread_heading(threads));
        let report = run_job(
            Job {
                name: format!("{} ({})", label, threads),
                stages: vec![make_stage()],
                input: Arc::clone(input),
                verify: Some(Arc::clone(expected)),
                threads,
            },
            options,
        )
        .await?;
        clean &= report.is_clean();
    }
    Ok(clean)
}

pub async fn execute(cli: &Cli, source: &SourceArgs) -> anyhow::Result<()> {
    let options = RunOptions::resolve(cli)?;
    let input = load_input(source).await?;

    let best = Arc::new(sanity_check(&input)?);
    info!(
        input = input.len(),
        compressed = best.len(),
        ratio = %format_ratio(best.len() as u64, input.len() as u64),
        "zlib round trip verified"
    );

    let mut clean = true;
    for level in ZlibLevel::SUITE {
        options.announce(format!(
            "Running {} compression for {}:",
            level, options.run.deadline
        ));
        let expected = if level == ZlibLevel::BEST {
            Arc::clone(&best)
        } else {
            Arc::new(ByteBuffer::new(
                DeflateStage::new(level).deflate(input.as_slice())?,
            ))
        };
        clean &= sweep(
            &format!("deflate {}", level),
            || Box::new(DeflateStage::new(level)),
            &input,
            &expected,
            &options,
        )
        .await?;
    }

    options.announce(format!("Running decompression for {}:", options.run.deadline));
    clean &= sweep(
        "inflate",
        || Box::new(InflateStage::new()),
        &best,
        &input,
        &options,
    )
    .await?;

    if !clean {
        warn!("zlib suite produced unverified output");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_sweep() {
        assert_eq!(thread_sweep(ThreadCount::MIN), vec![ThreadCount::MIN]);
        let four = ThreadCount::new(4).unwrap();
        assert_eq!(thread_sweep(four), vec![ThreadCount::MIN, four]);
    }

    #[test]
    fn test_thread_heading() {
        assert_eq!(thread_heading(ThreadCount::MIN), "1 thread:");
        assert_eq!(thread_heading(ThreadCount::new(8).unwrap()), "8 threads:");
    }

    #[test]
    fn test_sanity_check_returns_best_compression() {
        let input = ByteBuffer::new(b"abcabcabc".repeat(200));
        let compressed = sanity_check(&input).unwrap();
        assert!(compressed.len() < input.len());

        let restored = InflateStage::new().inflate(compressed.as_slice()).unwrap();
        assert_eq!(restored, input.as_slice());
    }
}
