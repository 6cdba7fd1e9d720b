// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Concurrency coordinator.
//!
//! Spawns one worker per configured thread over the same read-only input,
//! verification buffer and pipeline, then joins them in spawn order.

use std::io;
use std::thread::{self, ScopedJoinHandle};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::executor::TimedLoopExecutor;
use crate::result::{RunResult, ThreadResult};

type WorkerHandle<'scope> = ScopedJoinHandle<'scope, HarnessResult<ThreadResult>>;

/// Run a benchmark to completion.
///
/// The configuration is validated before any worker starts. A failure in any
/// worker fails the whole run; no partial result is returned.
pub fn run_benchmark(config: &RunConfig<'_>) -> HarnessResult<RunResult> {
    let (threads, deadline) = config.validate()?;
    let pipeline = config.pipeline();
    let input = config.input();
    let verify = config.verification();

    info!(
        stages = ?pipeline,
        threads = threads.get(),
        deadline = %deadline,
        input_bytes = input.len(),
        verify = verify.is_some(),
        "Starting benchmark run"
    );
    let started = Instant::now();

    let chains = thread::scope(|scope| -> HarnessResult<Vec<ThreadResult>> {
        let handles = spawn_workers(threads.get(), |index| {
            thread::Builder::new()
                .name(format!("reality-worker-{}", index))
                .spawn_scoped(scope, move || {
                    debug!(thread = index, "Worker started");
                    TimedLoopExecutor::new(index, pipeline, input, verify, deadline.duration())
                        .run()
                })
        })?;
        join_workers(handles)
    })?;

    let result = RunResult::new(pipeline.names(), chains);

    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        loops = result.statistics().total_loops(),
        "Benchmark run complete"
    );

    Ok(result)
}

/// Spawn `count` workers in index order.
///
/// If a spawn fails, the workers already running are joined before the
/// spawn error is returned.
fn spawn_workers<'scope, F>(
    count: usize,
    mut spawn: F,
) -> HarnessResult<Vec<WorkerHandle<'scope>>>
where
    F: FnMut(usize) -> io::Result<WorkerHandle<'scope>>,
{
    let mut handles = Vec::with_capacity(count);
    for index in 0..count {
        match spawn(index) {
            Ok(handle) => handles.push(handle),
            Err(source) => {
                warn!(thread = index, error = %source, "Worker spawn failed");
                if let Err(e) = join_workers(handles) {
                    debug!(error = %e, "Earlier worker also failed");
                }
                return Err(HarnessError::WorkerSpawn {
                    thread: index,
                    source,
                });
            }
        }
    }
    Ok(handles)
}

/// Join every worker, then report the first failure in spawn order.
fn join_workers(handles: Vec<WorkerHandle<'_>>) -> HarnessResult<Vec<ThreadResult>> {
    let joined: Vec<_> = handles
        .into_iter()
        .enumerate()
        .map(|(index, handle)| {
            handle
                .join()
                .unwrap_or_else(|_| Err(HarnessError::WorkerPanicked { thread: index }))
        })
        .collect();

    joined.into_iter().collect()
}
