// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end tests for the benchmark harness.
//!
//! These tests drive `run_benchmark` with small in-process stages and check
//! the recorded hierarchy through the statistics API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reality_core::{
    run_benchmark, ByteBuffer, ConfigurationError, Direction, FnStage, HarnessError, RunConfig,
    SettingsLoader, StageError, StageSelector,
};
use tempfile::TempDir;

fn payload(len: usize) -> ByteBuffer {
    ByteBuffer::new((0..len).map(|i| (i % 251) as u8).collect())
}

fn identity(name: &'static str) -> FnStage<impl Fn(&ByteBuffer) -> Result<ByteBuffer, StageError>> {
    FnStage::new(name, |input: &ByteBuffer| ByteBuffer::try_from_slice(input.as_slice()))
}

/// Scenario A: single identity stage verified against its own input.
#[test]
fn test_identity_stage_single_thread() {
    let input = payload(1024);
    let config = RunConfig::new(&input)
        .threads(1)
        .deadline(Duration::from_millis(100))
        .stage(identity("noop"))
        .verify_against(&input);

    let result = run_benchmark(&config).expect("run should succeed");
    let stats = result.statistics();

    assert_eq!(result.thread_count(), 1);
    assert!(stats.loop_count(0) >= 1);
    assert!(stats.is_all_verified());
    assert!(stats.is_all_succeeded());
    assert_eq!(
        stats.total_bytes(0, Direction::Output),
        (stats.loop_count(0) * input.len()) as u64
    );
}

/// Scenario B: a stage that never produces output.
#[test]
fn test_always_failing_stage() {
    let input = payload(64);
    let config = RunConfig::new(&input)
        .threads(1)
        .deadline(Duration::from_millis(20))
        .stage(FnStage::new("broken", |_: &ByteBuffer| {
            Err(StageError::Codec {
                stage: "broken",
                message: "no output".to_string(),
            })
        }));

    let result = run_benchmark(&config).expect("stage failures are not run failures");
    let stats = result.statistics();

    assert!(!stats.is_all_succeeded());
    assert!(stats.loop_count(0) >= 1);
    assert!(result
        .loops()
        .flat_map(|l| l.stage_runs.iter())
        .all(|r| r.output_bytes == 0 && !r.succeeded));
}

/// Scenario C: four threads, grow then shrink back to the input.
#[test]
fn test_double_then_halve_round_trip() {
    let input = payload(4096);
    let config = RunConfig::new(&input)
        .threads(4)
        .deadline(Duration::from_secs(1))
        .stage(FnStage::new("double", |input: &ByteBuffer| {
            let mut data = Vec::with_capacity(input.len() * 2);
            data.extend_from_slice(input.as_slice());
            data.extend_from_slice(input.as_slice());
            Ok(ByteBuffer::new(data))
        }))
        .stage(FnStage::new("halve", |input: &ByteBuffer| {
            ByteBuffer::try_from_slice(&input.as_slice()[..input.len() / 2])
        }))
        .verify_against(&input);

    let result = run_benchmark(&config).expect("run should succeed");
    let stats = result.statistics();

    assert_eq!(result.thread_count(), 4);
    for thread in 0..4 {
        assert!(stats.loop_count(thread) >= 1);
        assert!(result.threads[thread].loops.iter().all(|l| l.verified));
    }
    assert!(stats.is_all_verified());
    assert!(stats.is_all_succeeded());
    assert!(stats.is_deterministic());
    assert_eq!(stats.sample_bytes(0, Direction::Output), 8192);
    assert_eq!(stats.sample_bytes(1, Direction::Output), 4096);
}

/// Scenario D: output size changes between calls on the same input.
#[test]
fn test_varying_output_size_is_not_deterministic() {
    let input = payload(16);
    let calls = AtomicUsize::new(0);
    let config = RunConfig::new(&input)
        .threads(1)
        .deadline(Duration::from_millis(50))
        .stage(FnStage::new("jitter", move |input: &ByteBuffer| {
            let n = calls.fetch_add(1, Ordering::Relaxed);
            ByteBuffer::try_from_slice(&input.as_slice()[..1 + n % 2])
        }));

    let result = run_benchmark(&config).expect("run should succeed");
    let stats = result.statistics();

    assert!(stats.loop_count(0) >= 2);
    assert!(!stats.is_deterministic());
}

#[test]
fn test_every_loop_has_every_stage_in_order() {
    let input = payload(32);
    let mut config = RunConfig::new(&input)
        .threads(3)
        .deadline(Duration::from_millis(30));
    for name in ["s0", "s1", "s2", "s3", "s4"] {
        config = config.stage(identity(name));
    }

    let result = run_benchmark(&config).expect("run should succeed");

    assert_eq!(result.stage_names, vec!["s0", "s1", "s2", "s3", "s4"]);
    for record in result.loops() {
        assert_eq!(record.stage_runs.len(), 5);
        assert!(record
            .stage_runs
            .iter()
            .all(|r| r.succeeded && r.input_bytes == 32 && r.output_bytes == 32));
    }
}

#[test]
fn test_live_buffers_bounded_for_long_pipeline() {
    let input = payload(256);
    let mut config = RunConfig::new(&input)
        .threads(2)
        .deadline(Duration::from_millis(30));
    for _ in 0..12 {
        config = config.stage(identity("copy"));
    }

    let result = run_benchmark(&config).expect("run should succeed");

    for thread in &result.threads {
        assert_eq!(thread.peak_live_buffers, 2);
    }
}

#[test]
fn test_encode_decode_round_trip() {
    let input = ByteBuffer::from(&b"round trip through a reversible transform"[..]);
    let config = RunConfig::new(&input)
        .threads(2)
        .deadline(Duration::from_millis(50))
        .stage(FnStage::new("xor-encode", |input: &ByteBuffer| {
            Ok(ByteBuffer::new(input.as_slice().iter().map(|b| b ^ 0x5a).collect()))
        }))
        .stage(FnStage::new("xor-decode", |input: &ByteBuffer| {
            Ok(ByteBuffer::new(input.as_slice().iter().map(|b| b ^ 0x5a).collect()))
        }))
        .verify_against(&input);

    let result = run_benchmark(&config).expect("run should succeed");
    let stats = result.statistics();
    assert!(stats.is_all_verified());
    assert!(stats.is_all_succeeded());
}

#[test]
fn test_verification_mismatch_is_recorded_not_raised() {
    let input = payload(8);
    let expected = payload(9);
    let config = RunConfig::new(&input)
        .threads(1)
        .deadline(Duration::from_millis(10))
        .stage(identity("noop"))
        .verify_against(&expected);

    let result = run_benchmark(&config).expect("mismatch is data, not an error");
    let stats = result.statistics();
    assert!(!stats.is_all_verified());
    assert!(stats.is_all_succeeded());
}

#[test]
fn test_configuration_rejected_before_any_stage_runs() {
    let input = payload(8);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let config = RunConfig::new(&input)
        .threads(0)
        .deadline(Duration::from_millis(10))
        .stage(FnStage::new("counted", move |input: &ByteBuffer| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(input.clone())
        }));

    let err = run_benchmark(&config).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Configuration(ConfigurationError::ZeroThreads)
    ));
    assert_eq!(calls.load(Ordering::Relaxed), 0);

    let empty = ByteBuffer::default();
    let err = run_benchmark(&RunConfig::new(&empty).stage(identity("noop"))).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Configuration(ConfigurationError::EmptyInput)
    ));
}

#[test]
fn test_allocation_failure_aborts_run() {
    let input = payload(8);
    let config = RunConfig::new(&input)
        .threads(2)
        .deadline(Duration::from_millis(10))
        .stage(FnStage::new("huge", |_: &ByteBuffer| {
            ByteBuffer::try_zeroed(usize::MAX)
        }));

    let err = run_benchmark(&config).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::AllocationFailure { stage: 0, .. }
    ));
}

#[test]
fn test_panicking_stage_fails_run() {
    let input = payload(8);
    let config = RunConfig::new(&input)
        .threads(1)
        .deadline(Duration::from_millis(10))
        .stage(FnStage::new("panics", |_: &ByteBuffer| -> Result<ByteBuffer, StageError> {
            panic!("stage bug")
        }));

    let err = run_benchmark(&config).unwrap_err();
    assert!(matches!(err, HarnessError::WorkerPanicked { thread: 0 }));
}

#[test]
fn test_each_worker_runs_to_its_deadline() {
    let input = payload(8);
    let deadline = Duration::from_millis(40);
    let config = RunConfig::new(&input)
        .threads(2)
        .deadline(deadline)
        .stage(FnStage::new("sleepy", |input: &ByteBuffer| {
            std::thread::sleep(Duration::from_millis(5));
            Ok(input.clone())
        }));

    let start = Instant::now();
    let result = run_benchmark(&config).expect("run should succeed");
    assert!(start.elapsed() >= deadline);

    let stats = result.statistics();
    // Each worker's summed stage time reaches roughly its deadline.
    assert!(stats.wall_clock_usec(StageSelector::All) >= 30_000);
    assert!(stats.avg_latency_usec(StageSelector::Stage(0)) >= 5_000.0);
}

#[test]
fn test_statistics_are_idempotent() {
    let input = payload(128);
    let config = RunConfig::new(&input)
        .threads(2)
        .deadline(Duration::from_millis(20))
        .stage(identity("noop"));

    let result = run_benchmark(&config).expect("run should succeed");
    let stats = result.statistics();

    assert_eq!(stats.total_loops(), stats.total_loops());
    assert_eq!(
        stats.avg_latency_usec(StageSelector::All),
        stats.avg_latency_usec(StageSelector::All)
    );
    assert_eq!(
        stats.stdev_latency_usec(StageSelector::Stage(0)),
        stats.stdev_latency_usec(StageSelector::Stage(0))
    );
    assert_eq!(
        stats.wall_clock_usec(StageSelector::All),
        stats.wall_clock_usec(StageSelector::All)
    );
    assert_eq!(stats.is_deterministic(), stats.is_deterministic());
}

#[test]
fn test_settings_file_drives_run() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("reality.yaml");
    std::fs::write(
        &path,
        r#"
run:
  duration_ms: 15
  threads: 2
"#,
    )
    .expect("Failed to write settings");

    let settings = SettingsLoader::load_file(&path).expect("settings should load");
    let input = payload(16);
    let config = RunConfig::new(&input)
        .with_settings(&settings)
        .stage(identity("noop"));

    let result = run_benchmark(&config).expect("run should succeed");
    assert_eq!(result.thread_count(), 2);
}

#[test]
fn test_result_serializes_to_json() {
    let input = payload(4);
    let config = RunConfig::new(&input)
        .threads(1)
        .deadline(Duration::from_millis(5))
        .stage(identity("noop"));

    let result = run_benchmark(&config).expect("run should succeed");
    let json = serde_json::to_string(&result).expect("serializable");
    assert!(json.contains("\"stage_names\":[\"noop\"]"));
    assert!(json.contains("\"peak_live_buffers\":1"));
}
