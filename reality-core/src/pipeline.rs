// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Transform stages and the ordered pipeline they form.

use std::fmt;

use crate::buffer::ByteBuffer;
use crate::error::StageError;

/// A black-box transform under benchmark.
///
/// Implementations must be shareable across worker threads; any keys or
/// algorithm choices are fixed at construction time.
pub trait Stage: Send + Sync {
    /// Short label used in logs and reports.
    fn name(&self) -> &str;

    /// Transform `input` into a newly allocated buffer.
    fn transform(&self, input: &ByteBuffer) -> Result<ByteBuffer, StageError>;
}

/// Adapter turning a named closure into a [`Stage`].
pub struct FnStage<F> {
    name: String,
    f: F,
}

impl<F> FnStage<F>
where
    F: Fn(&ByteBuffer) -> Result<ByteBuffer, StageError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&ByteBuffer) -> Result<ByteBuffer, StageError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, input: &ByteBuffer) -> Result<ByteBuffer, StageError> {
        (self.f)(input)
    }
}

/// Ordered, immutable list of stages. Each stage's output feeds the next.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage at the end of the pipeline.
    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Stage> {
        self.stages.iter().map(|s| s.as_ref())
    }

    /// Stage labels in configuration order.
    pub fn names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name().to_string()).collect()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.stages.iter().map(|s| s.name())).finish()
    }
}

impl FromIterator<Box<dyn Stage>> for Pipeline {
    fn from_iter<I: IntoIterator<Item = Box<dyn Stage>>>(iter: I) -> Self {
        Self {
            stages: iter.into_iter().collect(),
        }
    }
}
