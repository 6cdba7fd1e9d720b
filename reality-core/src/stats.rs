// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Statistics and verification queries over a completed [`RunResult`].
//!
//! Every query is a pure function of the stored hierarchy. Standard deviations
//! use population variance; latency samples are whole microseconds.

use serde::{Deserialize, Serialize};

use crate::result::{LoopRecord, RunResult, StageRun};

/// Which stage(s) a latency query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageSelector {
    /// A single stage by configuration index.
    Stage(usize),
    /// All stages of a loop, summed.
    All,
}

/// Which side of a stage a byte query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Input,
    Output,
}

impl StageRun {
    fn bytes(&self, direction: Direction) -> usize {
        match direction {
            Direction::Input => self.input_bytes,
            Direction::Output => self.output_bytes,
        }
    }
}

impl LoopRecord {
    fn selected_usec(&self, selector: StageSelector) -> Option<u64> {
        match selector {
            StageSelector::Stage(k) => self.stage_runs.get(k).map(StageRun::elapsed_usec),
            StageSelector::All => Some(self.elapsed_usec()),
        }
    }
}

/// Read-only query view over a run.
#[derive(Debug, Clone, Copy)]
pub struct Statistics<'a> {
    result: &'a RunResult,
}

impl<'a> Statistics<'a> {
    pub fn new(result: &'a RunResult) -> Self {
        Self { result }
    }

    /// Loops completed by one thread. Unknown threads have zero loops.
    pub fn loop_count(&self, thread: usize) -> usize {
        self.result.thread(thread).map_or(0, |t| t.loops.len())
    }

    pub fn total_loops(&self) -> usize {
        self.result.threads.iter().map(|t| t.loops.len()).sum()
    }

    pub fn avg_loops_per_thread(&self) -> f64 {
        mean(self.result.threads.iter().map(|t| t.loops.len() as f64))
    }

    pub fn stdev_loops_per_thread(&self) -> f64 {
        population_stdev(self.result.threads.iter().map(|t| t.loops.len() as f64))
    }

    /// Every stage run in every loop succeeded.
    pub fn is_all_succeeded(&self) -> bool {
        self.result
            .loops()
            .all(|l| l.stage_runs.iter().all(|r| r.succeeded))
    }

    /// Every loop's final output matched the verification buffer.
    pub fn is_all_verified(&self) -> bool {
        self.result.loops().all(|l| l.verified)
    }

    /// Each stage produced the same output size on every loop of a thread.
    ///
    /// Compared against the thread's first loop only; threads are not
    /// cross-checked against each other.
    pub fn is_deterministic(&self) -> bool {
        self.result.threads.iter().all(|thread| {
            let Some((first, rest)) = thread.loops.split_first() else {
                return true;
            };
            rest.iter().all(|l| {
                l.stage_runs.len() == first.stage_runs.len()
                    && l.stage_runs
                        .iter()
                        .zip(&first.stage_runs)
                        .all(|(run, reference)| run.output_bytes == reference.output_bytes)
            })
        })
    }

    /// Bytes into or out of one stage across all loops and threads.
    pub fn total_bytes(&self, stage: usize, direction: Direction) -> u64 {
        self.result
            .loops()
            .filter_map(|l| l.stage_runs.get(stage))
            .map(|r| r.bytes(direction) as u64)
            .sum()
    }

    /// Byte count of the first recorded run of a stage.
    pub fn sample_bytes(&self, stage: usize, direction: Direction) -> usize {
        self.result
            .loops()
            .find_map(|l| l.stage_runs.get(stage))
            .map_or(0, |r| r.bytes(direction))
    }

    /// Per-loop elapsed microseconds for the selector, over all threads.
    pub fn latency_samples_usec(&self, selector: StageSelector) -> Vec<u64> {
        self.result
            .loops()
            .filter_map(|l| l.selected_usec(selector))
            .collect()
    }

    pub fn avg_latency_usec(&self, selector: StageSelector) -> f64 {
        mean(self.latency_samples_usec(selector).into_iter().map(|u| u as f64))
    }

    pub fn stdev_latency_usec(&self, selector: StageSelector) -> f64 {
        population_stdev(self.latency_samples_usec(selector).into_iter().map(|u| u as f64))
    }

    /// The longest-running thread's summed interval for the selector.
    ///
    /// Workers run concurrently, so this models the wall-clock duration of
    /// the run as a whole.
    pub fn wall_clock_usec(&self, selector: StageSelector) -> u64 {
        self.result
            .threads
            .iter()
            .map(|t| {
                t.loops
                    .iter()
                    .filter_map(|l| l.selected_usec(selector))
                    .sum::<u64>()
            })
            .max()
            .unwrap_or(0)
    }

    /// Stage throughput in bytes per second. `None` when no time was measured.
    pub fn throughput_bytes_per_sec(&self, stage: usize, direction: Direction) -> Option<f64> {
        per_second(
            self.total_bytes(stage, direction) as f64,
            self.wall_clock_usec(StageSelector::Stage(stage)),
        )
    }

    /// Completed pipeline passes per second across all threads.
    pub fn ops_per_sec(&self) -> Option<f64> {
        per_second(
            self.total_loops() as f64,
            self.wall_clock_usec(StageSelector::All),
        )
    }
}

fn per_second(amount: f64, usec: u64) -> Option<f64> {
    if usec == 0 {
        return None;
    }
    Some(amount / usec as f64 * 1_000_000.0)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

fn population_stdev(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values.iter().copied());
    let variance = values
        .iter()
        .map(|&x| {
            let diff = x - avg;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
