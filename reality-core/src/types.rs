// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated run parameters.
//!
//! Each type checks its invariant at creation time so a constructed value is
//! always usable by the coordinator.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Maximum number of worker threads per run.
pub const MAX_THREADS: usize = 1024;
/// Maximum deadline: one hour.
pub const MAX_DEADLINE: Duration = Duration::from_secs(3600);

/// Validated worker thread count (1..=MAX_THREADS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct ThreadCount(usize);

impl ThreadCount {
    /// A single worker.
    pub const MIN: ThreadCount = ThreadCount(1);

    /// Create a new ThreadCount with validation.
    pub fn new(threads: usize) -> Result<Self, ConfigurationError> {
        if threads == 0 {
            return Err(ConfigurationError::ZeroThreads);
        }
        if threads > MAX_THREADS {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "threads",
                value: threads.to_string(),
                reason: format!("Must be between 1 and {}", MAX_THREADS),
            });
        }
        Ok(Self(threads))
    }

    /// One thread per logical CPU, falling back to two.
    pub fn logical_cpus() -> Self {
        match num_cpus::get() {
            0 => Self(2),
            n => Self(n.min(MAX_THREADS)),
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for ThreadCount {
    type Error = ConfigurationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ThreadCount> for usize {
    fn from(threads: ThreadCount) -> Self {
        threads.0
    }
}

/// Validated per-worker deadline (0 < deadline <= MAX_DEADLINE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline(Duration);

impl Deadline {
    /// Create a new Deadline with validation.
    pub fn new(duration: Duration) -> Result<Self, ConfigurationError> {
        if duration.is_zero() {
            return Err(ConfigurationError::ZeroDeadline);
        }
        if duration > MAX_DEADLINE {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "deadline",
                value: format!("{}ms", duration.as_millis()),
                reason: format!("Must not exceed {}s", MAX_DEADLINE.as_secs()),
            });
        }
        Ok(Self(duration))
    }

    /// Create without validation (for compile-time constants).
    pub(crate) const fn new_unchecked(duration: Duration) -> Self {
        Self(duration)
    }

    /// Create from milliseconds for convenience.
    pub fn from_millis(ms: u64) -> Result<Self, ConfigurationError> {
        Self::new(Duration::from_millis(ms))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}
