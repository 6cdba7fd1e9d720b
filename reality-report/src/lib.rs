// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Reality Reporting
//!
//! Turns a completed [`reality_core::RunResult`] into a serializable
//! [`BenchmarkReport`], saves reports as timestamped JSON files and renders
//! them as text.

pub mod metrics;
pub mod render;
pub mod reporter;

pub use metrics::{
    BenchmarkReport, LatencySummary, LoopSummary, RunConfigSummary, StageSummary, SystemInfo,
    ThreadSummary, Verdicts,
};
pub use render::{format_bytes, format_rate, format_ratio, RenderedReport, TextRenderer};
pub use reporter::{to_json, JsonReporter, ReporterError};
