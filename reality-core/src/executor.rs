// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Timed loop executor.
//!
//! Runs one worker's repeated pipeline passes until its deadline has elapsed.
//! Stage outputs are chained into the next stage's input while at most two
//! stage-output buffers are alive at any time:
//!
//! - the output just produced, and
//! - the previous stage's input, released at the start of the next stage.
//!
//! The shared input is borrowed and never released here.

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::buffer::ByteBuffer;
use crate::error::{HarnessError, HarnessResult};
use crate::pipeline::Pipeline;
use crate::result::{LoopRecord, StageRun, ThreadResult};

/// The value flowing into the next stage.
enum Carried<'a> {
    /// The caller-owned shared input.
    Shared(&'a ByteBuffer),
    /// An output this worker produced and owns.
    Owned(ByteBuffer),
    /// An earlier stage failed; downstream stages get nothing.
    Absent,
}

impl<'a> Carried<'a> {
    fn as_buffer(&self) -> Option<&ByteBuffer> {
        match self {
            Carried::Shared(buf) => Some(buf),
            Carried::Owned(buf) => Some(buf),
            Carried::Absent => None,
        }
    }

    /// The owned buffer, if any. Shared input is never handed out for release.
    fn into_owned(self) -> Option<ByteBuffer> {
        match self {
            Carried::Owned(buf) => Some(buf),
            Carried::Shared(_) | Carried::Absent => None,
        }
    }
}

/// One worker's timed loop over a shared pipeline.
pub struct TimedLoopExecutor<'a> {
    thread: usize,
    pipeline: &'a Pipeline,
    input: &'a ByteBuffer,
    verify: Option<&'a ByteBuffer>,
    deadline: Duration,
    live_buffers: usize,
    peak_live_buffers: usize,
}

impl<'a> TimedLoopExecutor<'a> {
    pub fn new(
        thread: usize,
        pipeline: &'a Pipeline,
        input: &'a ByteBuffer,
        verify: Option<&'a ByteBuffer>,
        deadline: Duration,
    ) -> Self {
        Self {
            thread,
            pipeline,
            input,
            verify,
            deadline,
            live_buffers: 0,
            peak_live_buffers: 0,
        }
    }

    /// Loop until the deadline, measured from this call, has elapsed.
    ///
    /// The deadline is checked only after an iteration completes, so at least
    /// one loop is always recorded and the last one may overrun.
    pub fn run(mut self) -> HarnessResult<ThreadResult> {
        let mut loops: Vec<LoopRecord> = Vec::new();
        let start = Instant::now();

        loop {
            let record = self.run_once()?;
            loops.try_reserve(1).map_err(|_| HarnessError::AllocationFailure {
                thread: self.thread,
                stage: self.pipeline.len(),
                requested: std::mem::size_of::<LoopRecord>(),
            })?;
            loops.push(record);

            if start.elapsed() >= self.deadline {
                break;
            }
        }

        debug!(
            thread = self.thread,
            loops = loops.len(),
            peak_live_buffers = self.peak_live_buffers,
            "Worker finished"
        );

        Ok(ThreadResult {
            loops,
            peak_live_buffers: self.peak_live_buffers,
        })
    }

    /// Execute every stage once, chaining outputs into inputs.
    pub fn run_once(&mut self) -> HarnessResult<LoopRecord> {
        let stage_count = self.pipeline.len();
        let mut stage_runs = Vec::new();
        stage_runs
            .try_reserve_exact(stage_count)
            .map_err(|_| HarnessError::AllocationFailure {
                thread: self.thread,
                stage: 0,
                requested: stage_count * std::mem::size_of::<StageRun>(),
            })?;

        let pipeline = self.pipeline;
        let mut current = Carried::Shared(self.input);
        let mut pending: Option<ByteBuffer> = None;

        for (index, stage) in pipeline.iter().enumerate() {
            // The input of the previous stage: that call has returned.
            if let Some(consumed) = pending.take() {
                self.release(consumed);
            }

            let start = Instant::now();
            let outcome = current.as_buffer().map(|input| stage.transform(input));
            let elapsed = start.elapsed();

            let output = match outcome {
                Some(Ok(buf)) => {
                    self.acquire();
                    Some(buf)
                }
                Some(Err(e)) if e.is_fatal() => {
                    warn!(thread = self.thread, stage = stage.name(), error = %e, "Worker aborted");
                    return Err(HarnessError::from_stage(self.thread, index, e));
                }
                Some(Err(e)) => {
                    debug!(thread = self.thread, stage = stage.name(), error = %e, "Stage failed");
                    None
                }
                None => {
                    trace!(thread = self.thread, stage = stage.name(), "Skipped, no input");
                    None
                }
            };

            let run = match (current.as_buffer(), output.as_ref()) {
                (Some(input), Some(out)) => StageRun::succeeded(elapsed, input.len(), out.len()),
                _ => StageRun::failed(elapsed),
            };
            stage_runs.push(run);

            pending = current.into_owned();
            current = output.map_or(Carried::Absent, Carried::Owned);
        }

        if let Some(consumed) = pending.take() {
            self.release(consumed);
        }

        let verified = match current {
            Carried::Owned(out) => {
                let verified = self.verify.map_or(true, |expected| *expected == out);
                self.release(out);
                verified
            }
            // Only reachable with an empty pipeline, which validation rejects.
            Carried::Shared(input) => self.verify.map_or(true, |expected| expected == input),
            Carried::Absent => self.verify.is_none(),
        };

        Ok(LoopRecord {
            stage_runs,
            verified,
        })
    }

    fn acquire(&mut self) {
        self.live_buffers += 1;
        self.peak_live_buffers = self.peak_live_buffers.max(self.live_buffers);
    }

    fn release(&mut self, buf: ByteBuffer) {
        drop(buf);
        self.live_buffers -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StageError;
    use crate::pipeline::FnStage;

    fn append(name: &'static str, byte: u8) -> Box<dyn crate::pipeline::Stage> {
        Box::new(FnStage::new(name, move |input: &ByteBuffer| {
            let mut data = input.as_slice().to_vec();
            data.push(byte);
            Ok(ByteBuffer::new(data))
        }))
    }

    #[test]
    fn test_outputs_chain_into_inputs() {
        let mut pipeline = Pipeline::new();
        pipeline.push(append("a", b'a'));
        pipeline.push(append("b", b'b'));
        pipeline.push(append("c", b'c'));

        let input = ByteBuffer::from(&b"x"[..]);
        let expected = ByteBuffer::from(&b"xabc"[..]);
        let mut executor =
            TimedLoopExecutor::new(0, &pipeline, &input, Some(&expected), Duration::from_millis(1));

        let record = executor.run_once().unwrap();
        assert!(record.verified);
        let sizes: Vec<_> = record
            .stage_runs
            .iter()
            .map(|r| (r.input_bytes, r.output_bytes))
            .collect();
        assert_eq!(sizes, vec![(1, 2), (2, 3), (3, 4)]);
        assert_eq!(executor.live_buffers, 0);
        assert_eq!(executor.peak_live_buffers, 2);
    }

    #[test]
    fn test_failure_propagates_downstream() {
        let mut pipeline = Pipeline::new();
        pipeline.push(Box::new(FnStage::new("fail", |_: &ByteBuffer| {
            Err(StageError::InvalidInput {
                reason: "always".to_string(),
            })
        })));
        pipeline.push(append("after", b'z'));

        let input = ByteBuffer::from(&b"x"[..]);
        let mut executor =
            TimedLoopExecutor::new(0, &pipeline, &input, None, Duration::from_millis(1));

        let record = executor.run_once().unwrap();
        assert_eq!(record.stage_runs.len(), 2);
        assert!(record.stage_runs.iter().all(|r| !r.succeeded));
        // No verification buffer configured: nothing to mismatch.
        assert!(record.verified);
    }

    #[test]
    fn test_failed_final_stage_is_unverified() {
        let mut pipeline = Pipeline::new();
        pipeline.push(Box::new(FnStage::new("fail", |_: &ByteBuffer| {
            Err(StageError::Codec {
                stage: "fail",
                message: "corrupt".to_string(),
            })
        })));

        let input = ByteBuffer::from(&b"x"[..]);
        let mut executor =
            TimedLoopExecutor::new(0, &pipeline, &input, Some(&input), Duration::from_millis(1));
        assert!(!executor.run_once().unwrap().verified);
    }

    #[test]
    fn test_allocation_failure_is_fatal() {
        let mut pipeline = Pipeline::new();
        pipeline.push(append("ok", b'o'));
        pipeline.push(Box::new(FnStage::new("oom", |_: &ByteBuffer| {
            Err(StageError::Allocation { requested: 64 })
        })));

        let input = ByteBuffer::from(&b"x"[..]);
        let executor = TimedLoopExecutor::new(3, &pipeline, &input, None, Duration::from_millis(1));
        let err = executor.run().unwrap_err();
        assert!(matches!(
            err,
            HarnessError::AllocationFailure {
                thread: 3,
                stage: 1,
                requested: 64
            }
        ));
    }

    #[test]
    fn test_runs_until_deadline() {
        let mut pipeline = Pipeline::new();
        pipeline.push(append("a", b'a'));

        let input = ByteBuffer::from(&b"x"[..]);
        let deadline = Duration::from_millis(20);
        let start = Instant::now();
        let result = TimedLoopExecutor::new(0, &pipeline, &input, None, deadline)
            .run()
            .unwrap();

        assert!(start.elapsed() >= deadline);
        assert!(!result.loops.is_empty());
        assert_eq!(result.peak_live_buffers, 1);
    }
}
