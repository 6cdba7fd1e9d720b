// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for the Reality harness.
//!
//! Only configuration problems and unrecoverable worker failures are errors.
//! A stage that fails or an output that does not verify is recorded in the
//! result hierarchy and never surfaces here.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for a benchmark run.
#[derive(Debug, Error)]
pub enum HarnessError {
    // =========================================================================
    // Configuration Errors - Rejected Before Any Worker Starts
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Settings file not found: {path}")]
    SettingsNotFound { path: PathBuf },

    #[error("Settings parse error: {message}")]
    SettingsParse { message: String },

    // =========================================================================
    // Worker Errors - Abort The Whole Run
    // =========================================================================
    #[error("Allocation failure on worker {thread} at stage {stage}: {requested} bytes")]
    AllocationFailure {
        thread: usize,
        stage: usize,
        requested: usize,
    },

    #[error("Worker {thread} aborted at stage {stage}: {source}")]
    StageAborted {
        thread: usize,
        stage: usize,
        #[source]
        source: StageError,
    },

    #[error("Failed to spawn worker {thread}: {source}")]
    WorkerSpawn {
        thread: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker {thread} panicked")]
    WorkerPanicked { thread: usize },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    /// Wrap a fatal stage failure raised on `thread` at pipeline index `stage`.
    pub fn from_stage(thread: usize, stage: usize, error: StageError) -> Self {
        match error {
            StageError::Allocation { requested } => HarnessError::AllocationFailure {
                thread,
                stage,
                requested,
            },
            source => HarnessError::StageAborted {
                thread,
                stage,
                source,
            },
        }
    }
}

/// Invalid run configuration. The run never starts.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Pipeline has no stages")]
    EmptyPipeline,

    #[error("Thread count must be greater than 0")]
    ZeroThreads,

    #[error("Deadline must be greater than 0")]
    ZeroDeadline,

    #[error("Input buffer is empty")]
    EmptyInput,

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Failure reported by a transform stage.
///
/// `Allocation` is fatal to the worker. Every other variant is recorded as an
/// unsuccessful stage run and the loop carries on.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Could not allocate {requested} bytes")]
    Allocation { requested: usize },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("{stage} failed: {message}")]
    Codec {
        stage: &'static str,
        message: String,
    },
}

impl StageError {
    /// Whether this failure must stop the worker.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StageError::Allocation { .. })
    }
}

/// Result type alias using HarnessError.
pub type HarnessResult<T> = Result<T, HarnessError>;
