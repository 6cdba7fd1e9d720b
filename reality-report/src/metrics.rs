// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Report types summarizing a completed run.
//!
//! Everything here is derived from a [`RunResult`] through its statistics
//! view, plus the machine description captured at report time.

use chrono::{DateTime, Utc};
use reality_core::{Direction, RunResult, StageSelector, Statistics};
use serde::{Deserialize, Serialize};
use sysinfo::System;

/// Latency distribution over whole-microsecond samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    /// Number of samples
    pub samples: usize,
    /// Minimum observed latency in microseconds
    pub min_usec: u64,
    /// Maximum observed latency in microseconds
    pub max_usec: u64,
    /// Arithmetic mean latency in microseconds
    pub mean_usec: f64,
    /// Median (p50) latency in microseconds
    pub median_usec: u64,
    /// 95th percentile latency in microseconds
    pub p95_usec: u64,
    /// 99th percentile latency in microseconds
    pub p99_usec: u64,
    /// Population standard deviation in microseconds
    pub std_dev_usec: f64,
}

impl LatencySummary {
    /// Summarize a set of latency samples (in microseconds).
    ///
    /// Mean and deviation come from the statistics engine so the report and
    /// the query API always agree; the order statistics are computed here.
    pub fn from_samples(mut samples: Vec<u64>, mean_usec: f64, std_dev_usec: f64) -> Self {
        if samples.is_empty() {
            return Self {
                samples: 0,
                min_usec: 0,
                max_usec: 0,
                mean_usec: 0.0,
                median_usec: 0,
                p95_usec: 0,
                p99_usec: 0,
                std_dev_usec: 0.0,
            };
        }

        samples.sort_unstable();
        let len = samples.len();

        Self {
            samples: len,
            min_usec: samples[0],
            max_usec: samples[len - 1],
            mean_usec,
            median_usec: samples[len / 2],
            p95_usec: samples[(len as f64 * 0.95) as usize],
            p99_usec: samples[(len as f64 * 0.99) as usize],
            std_dev_usec,
        }
    }

    /// Summarize the selected stage(s) of a run.
    pub fn for_selector(stats: &Statistics<'_>, selector: StageSelector) -> Self {
        Self::from_samples(
            stats.latency_samples_usec(selector),
            stats.avg_latency_usec(selector),
            stats.stdev_latency_usec(selector),
        )
    }

    /// Format latency in human-readable form (auto-selects μs/ms/s).
    pub fn format_latency(usec: f64) -> String {
        if usec < 1_000.0 {
            format!("{:.2}μs", usec)
        } else if usec < 1_000_000.0 {
            format!("{:.2}ms", usec / 1_000.0)
        } else {
            format!("{:.2}s", usec / 1_000_000.0)
        }
    }
}

/// Per-stage totals and rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    /// Position in the pipeline
    pub index: usize,
    /// Stage label
    pub name: String,
    /// Per-loop latency of this stage
    pub latency: LatencySummary,
    /// Longest thread's summed time in this stage
    pub wall_clock_usec: u64,
    /// Bytes consumed across all loops and threads
    pub input_bytes: u64,
    /// Bytes produced across all loops and threads
    pub output_bytes: u64,
    /// Input size of the first recorded run
    pub sample_input_bytes: usize,
    /// Output size of the first recorded run
    pub sample_output_bytes: usize,
    /// Input bytes per second, when any time was measured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_bytes_per_sec: Option<f64>,
    /// Output bytes per second, when any time was measured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_bytes_per_sec: Option<f64>,
    /// Output size over input size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
}

impl StageSummary {
    pub fn collect(stats: &Statistics<'_>, index: usize, name: &str) -> Self {
        let input_bytes = stats.total_bytes(index, Direction::Input);
        let output_bytes = stats.total_bytes(index, Direction::Output);

        Self {
            index,
            name: name.to_string(),
            latency: LatencySummary::for_selector(stats, StageSelector::Stage(index)),
            wall_clock_usec: stats.wall_clock_usec(StageSelector::Stage(index)),
            input_bytes,
            output_bytes,
            sample_input_bytes: stats.sample_bytes(index, Direction::Input),
            sample_output_bytes: stats.sample_bytes(index, Direction::Output),
            input_bytes_per_sec: stats.throughput_bytes_per_sec(index, Direction::Input),
            output_bytes_per_sec: stats.throughput_bytes_per_sec(index, Direction::Output),
            ratio: (input_bytes > 0).then(|| output_bytes as f64 / input_bytes as f64),
        }
    }
}

/// Loop counts across the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopSummary {
    pub total: usize,
    pub avg_per_thread: f64,
    pub std_dev_per_thread: f64,
    /// Longest thread's summed loop time
    pub wall_clock_usec: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ops_per_sec: Option<f64>,
}

/// Pass/fail checks over every recorded loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdicts {
    pub succeeded: bool,
    pub verified: bool,
    pub deterministic: bool,
}

/// One worker's share of the run. Only present in verbose reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub thread: usize,
    pub loops: usize,
    pub peak_live_buffers: usize,
    /// Summed loop time of this worker
    pub elapsed_usec: u64,
}

/// The configuration a report was produced with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfigSummary {
    pub threads: usize,
    pub deadline_ms: u64,
    pub input_bytes: usize,
    pub verified_against: Option<usize>,
}

/// System information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of logical CPUs
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Complete report for one benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Suite identifier, e.g. `aes-128-gcm` or `zlib-best`
    pub name: String,
    /// Harness version
    pub version: String,
    /// Timestamp when the report was built
    pub timestamp: DateTime<Utc>,
    /// System information
    pub system_info: SystemInfo,
    pub config: RunConfigSummary,
    pub loops: LoopSummary,
    pub verdicts: Verdicts,
    /// One entry per pipeline stage, in order
    pub stages: Vec<StageSummary>,
    /// Whole-loop latency across all stages
    pub all_stages: LatencySummary,
    /// Per-worker breakdown (verbose reports only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<Vec<ThreadSummary>>,
}

impl BenchmarkReport {
    /// Summarize a completed run.
    pub fn from_run(
        name: impl Into<String>,
        result: &RunResult,
        config: &RunConfigSummary,
        verbose: bool,
    ) -> Self {
        let stats = result.statistics();

        let stages = result
            .stage_names
            .iter()
            .enumerate()
            .map(|(index, stage)| StageSummary::collect(&stats, index, stage))
            .collect();

        let threads = verbose.then(|| {
            result
                .threads
                .iter()
                .enumerate()
                .map(|(thread, t)| ThreadSummary {
                    thread,
                    loops: t.loops.len(),
                    peak_live_buffers: t.peak_live_buffers,
                    elapsed_usec: t.loops.iter().map(|l| l.elapsed_usec()).sum(),
                })
                .collect()
        });

        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            config: config.clone(),
            loops: LoopSummary {
                total: stats.total_loops(),
                avg_per_thread: stats.avg_loops_per_thread(),
                std_dev_per_thread: stats.stdev_loops_per_thread(),
                wall_clock_usec: stats.wall_clock_usec(StageSelector::All),
                ops_per_sec: stats.ops_per_sec(),
            },
            verdicts: Verdicts {
                succeeded: stats.is_all_succeeded(),
                verified: stats.is_all_verified(),
                deterministic: stats.is_deterministic(),
            },
            stages,
            all_stages: LatencySummary::for_selector(&stats, StageSelector::All),
            threads,
        }
    }

    /// Whether every check passed.
    pub fn is_clean(&self) -> bool {
        self.verdicts.succeeded && self.verdicts.verified
    }
}
