// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Run configuration.
//!
//! [`RunConfig`] is the programmatic contract handed to
//! [`run_benchmark`](crate::run_benchmark). [`SettingsLoader`] reads the `run`
//! section of a YAML settings file; stage crates read their own sections from
//! the same file.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::buffer::ByteBuffer;
use crate::error::{ConfigurationError, HarnessError, HarnessResult};
use crate::pipeline::{Pipeline, Stage};
use crate::types::{Deadline, ThreadCount};

/// Deadline applied when nothing else is configured.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(3);

/// Everything a benchmark run needs.
///
/// The input and verification buffers are borrowed: the caller owns them for
/// the whole run and the harness never mutates or frees them.
#[derive(Debug)]
pub struct RunConfig<'a> {
    pipeline: Pipeline,
    input: &'a ByteBuffer,
    verify: Option<&'a ByteBuffer>,
    threads: usize,
    deadline: Duration,
}

impl<'a> RunConfig<'a> {
    /// Start a configuration over `input` with default threads and deadline.
    pub fn new(input: &'a ByteBuffer) -> Self {
        Self {
            pipeline: Pipeline::new(),
            input,
            verify: None,
            threads: ThreadCount::logical_cpus().get(),
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Set the number of worker threads.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the per-worker deadline.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Append a stage to the pipeline.
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.pipeline.push(Box::new(stage));
        self
    }

    /// Append an already boxed stage to the pipeline.
    pub fn boxed_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.pipeline.push(stage);
        self
    }

    /// Require every loop's final output to equal `expected`.
    pub fn verify_against(mut self, expected: &'a ByteBuffer) -> Self {
        self.verify = Some(expected);
        self
    }

    /// Apply thread count and deadline from loaded settings.
    pub fn with_settings(self, settings: &RunSettings) -> Self {
        self.threads(settings.threads.get())
            .deadline(settings.deadline.duration())
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn input(&self) -> &'a ByteBuffer {
        self.input
    }

    pub fn verification(&self) -> Option<&'a ByteBuffer> {
        self.verify
    }

    /// Check the configuration. Called before any worker is spawned.
    pub fn validate(&self) -> Result<(ThreadCount, Deadline), ConfigurationError> {
        if self.pipeline.is_empty() {
            return Err(ConfigurationError::EmptyPipeline);
        }
        if self.input.is_empty() {
            return Err(ConfigurationError::EmptyInput);
        }
        let threads = ThreadCount::new(self.threads)?;
        let deadline = Deadline::new(self.deadline)?;
        Ok((threads, deadline))
    }
}

/// Raw `run` section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawRunSettings {
    #[serde(default = "default_duration_ms")]
    duration_ms: u64,
    #[serde(default)]
    threads: Option<usize>,
}

fn default_duration_ms() -> u64 {
    DEFAULT_DEADLINE.as_millis() as u64
}

impl Default for RawRunSettings {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            threads: None,
        }
    }
}

/// Raw settings file. Sections owned by other crates are ignored here.
#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default)]
    run: RawRunSettings,
}

/// Validated run settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub deadline: Deadline,
    pub threads: ThreadCount,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            deadline: Deadline::new_unchecked(DEFAULT_DEADLINE),
            threads: ThreadCount::logical_cpus(),
        }
    }
}

/// Settings loader with strict validation.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load and validate run settings from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> HarnessResult<RunSettings> {
        let content = Self::read_file(path)?;
        Self::load_string(&content)
    }

    /// Load and validate run settings from a YAML string.
    pub fn load_string(content: &str) -> HarnessResult<RunSettings> {
        let raw: RawSettings =
            serde_yaml::from_str(content).map_err(|e| HarnessError::SettingsParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Ok(Self::validate(raw.run)?)
    }

    /// Read a settings file, mapping a missing file to `SettingsNotFound`.
    pub fn read_file(path: impl AsRef<Path>) -> HarnessResult<String> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HarnessError::SettingsNotFound {
                path: path.to_path_buf(),
            });
        }

        std::fs::read_to_string(path).map_err(|e| HarnessError::Io {
            context: "reading settings file",
            source: e,
        })
    }

    fn validate(raw: RawRunSettings) -> Result<RunSettings, ConfigurationError> {
        let deadline = Deadline::from_millis(raw.duration_ms).map_err(|e| {
            ConfigurationError::InvalidFieldValue {
                field: "duration_ms",
                value: raw.duration_ms.to_string(),
                reason: e.to_string(),
            }
        })?;

        let threads = match raw.threads {
            Some(n) => ThreadCount::new(n)?,
            None => ThreadCount::logical_cpus(),
        };

        Ok(RunSettings { deadline, threads })
    }
}
