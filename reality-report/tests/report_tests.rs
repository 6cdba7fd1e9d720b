// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Reports built from live harness runs.

use std::time::Duration;

use reality_core::{run_benchmark, ByteBuffer, FnStage, RunConfig, StageError};
use reality_report::{BenchmarkReport, JsonReporter, RunConfigSummary, TextRenderer};
use tempfile::TempDir;

fn summary(config: &RunConfig<'_>, threads: usize, deadline_ms: u64) -> RunConfigSummary {
    RunConfigSummary {
        threads,
        deadline_ms,
        input_bytes: config.input().len(),
        verified_against: config.verification().map(ByteBuffer::len),
    }
}

#[test]
fn test_report_reflects_run() {
    let input = ByteBuffer::new(vec![7u8; 2048]);
    let config = RunConfig::new(&input)
        .threads(2)
        .deadline(Duration::from_millis(20))
        .stage(FnStage::new("reverse", |input: &ByteBuffer| {
            let mut data = input.as_slice().to_vec();
            data.reverse();
            Ok(ByteBuffer::new(data))
        }))
        .stage(FnStage::new("truncate", |input: &ByteBuffer| {
            ByteBuffer::try_from_slice(&input.as_slice()[..512])
        }))
        .verify_against(&input);

    let result = run_benchmark(&config).unwrap();
    let report =
        BenchmarkReport::from_run("reverse-truncate", &result, &summary(&config, 2, 20), true);

    assert_eq!(report.stages.len(), 2);
    assert_eq!(report.stages[0].name, "reverse");
    assert_eq!(report.stages[1].sample_output_bytes, 512);
    assert_eq!(report.stages[1].ratio, Some(0.25));
    assert!(report.verdicts.succeeded);
    // Truncated output never matches the full input.
    assert!(!report.verdicts.verified);
    assert!(report.verdicts.deterministic);
    assert_eq!(report.loops.total, result.statistics().total_loops());
    assert_eq!(report.threads.as_ref().map(Vec::len), Some(2));
    assert_eq!(report.config.verified_against, Some(2048));
}

#[test]
fn test_failed_stage_report_and_round_trip() {
    let input = ByteBuffer::new(vec![1u8; 64]);
    let config = RunConfig::new(&input)
        .threads(1)
        .deadline(Duration::from_millis(10))
        .stage(FnStage::new("reject", |_: &ByteBuffer| {
            Err(StageError::InvalidInput {
                reason: "unsupported".to_string(),
            })
        }));

    let result = run_benchmark(&config).unwrap();
    let report = BenchmarkReport::from_run("reject", &result, &summary(&config, 1, 10), false);
    assert!(!report.verdicts.succeeded);
    assert_eq!(report.stages[0].output_bytes, 0);

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let reporter = JsonReporter::new(temp_dir.path()).unwrap();
    let path = reporter.save(&report).unwrap();
    let loaded = JsonReporter::load(&path).unwrap();

    assert_eq!(loaded.name, "reject");
    assert_eq!(loaded.loops.total, report.loops.total);
    assert_eq!(loaded.verdicts, report.verdicts);
    assert_eq!(reporter.list_reports().unwrap(), vec![path]);

    let text = TextRenderer::new(false).render(&loaded);
    assert!(text.contains("Succeeded: NO"));
    assert!(text.contains("[0] reject"));
}
