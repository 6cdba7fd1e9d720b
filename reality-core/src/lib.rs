// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Reality Core Library
//!
//! The benchmark harness: runs an ordered pipeline of transform stages against
//! a fixed input on several worker threads until a deadline, records every
//! stage run, and answers latency, throughput and verification queries over
//! the recorded hierarchy.

pub mod buffer;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod result;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use buffer::ByteBuffer;
pub use config::{RunConfig, RunSettings, SettingsLoader, DEFAULT_DEADLINE};
pub use coordinator::run_benchmark;
pub use error::{ConfigurationError, HarnessError, HarnessResult, StageError};
pub use pipeline::{FnStage, Pipeline, Stage};
pub use result::{LoopRecord, RunResult, StageRun, ThreadResult};
pub use stats::{Direction, StageSelector, Statistics};
pub use types::{Deadline, ThreadCount};
