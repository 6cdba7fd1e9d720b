// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Result hierarchy: run → thread → loop → stage run.
//!
//! Pure data. Built by the executor, read by [`Statistics`].

use std::time::Duration;

use serde::Serialize;

use crate::stats::Statistics;

/// One stage's execution within a single loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageRun {
    pub elapsed: Duration,
    pub succeeded: bool,
    pub input_bytes: usize,
    pub output_bytes: usize,
}

impl StageRun {
    pub fn succeeded(elapsed: Duration, input_bytes: usize, output_bytes: usize) -> Self {
        Self {
            elapsed,
            succeeded: true,
            input_bytes,
            output_bytes,
        }
    }

    /// A failed run carries no byte counts.
    pub fn failed(elapsed: Duration) -> Self {
        Self {
            elapsed,
            succeeded: false,
            input_bytes: 0,
            output_bytes: 0,
        }
    }

    /// Elapsed time in whole microseconds.
    pub fn elapsed_usec(&self) -> u64 {
        self.elapsed.as_micros() as u64
    }
}

/// One full pass through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopRecord {
    pub stage_runs: Vec<StageRun>,
    pub verified: bool,
}

impl LoopRecord {
    /// Summed elapsed microseconds of every stage in this loop.
    pub fn elapsed_usec(&self) -> u64 {
        self.stage_runs.iter().map(StageRun::elapsed_usec).sum()
    }
}

/// Every loop one worker completed, in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThreadResult {
    pub loops: Vec<LoopRecord>,
    /// Most stage-output buffers alive at once on this worker.
    pub peak_live_buffers: usize,
}

/// Root of the hierarchy. One entry per worker, in spawn order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub stage_names: Vec<String>,
    pub threads: Vec<ThreadResult>,
}

impl RunResult {
    pub fn new(stage_names: Vec<String>, threads: Vec<ThreadResult>) -> Self {
        Self {
            stage_names,
            threads,
        }
    }

    pub fn stage_count(&self) -> usize {
        self.stage_names.len()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    pub fn thread(&self, index: usize) -> Option<&ThreadResult> {
        self.threads.get(index)
    }

    /// Every loop record across all threads, thread by thread.
    pub fn loops(&self) -> impl Iterator<Item = &LoopRecord> {
        self.threads.iter().flat_map(|t| t.loops.iter())
    }

    /// Read-only query view over this result.
    pub fn statistics(&self) -> Statistics<'_> {
        Statistics::new(self)
    }
}
