// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Owned byte buffers flowing between pipeline stages.

use std::fmt;

use crate::error::StageError;

/// An owned, sized block of bytes. Immutable once produced.
///
/// Stages receive their input by shared reference and hand back a freshly
/// allocated buffer that the caller owns.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl ByteBuffer {
    /// Wrap an existing vector without copying.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Allocate `len` zeroed bytes, reporting allocation failure as a
    /// fatal stage error instead of aborting the process.
    pub fn try_zeroed(len: usize) -> Result<Self, StageError> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| StageError::Allocation { requested: len })?;
        data.resize(len, 0);
        Ok(Self { data })
    }

    /// Copy a slice into a new buffer using the fallible allocation path.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, StageError> {
        let mut data = Vec::new();
        data.try_reserve_exact(bytes.len())
            .map_err(|_| StageError::Allocation {
                requested: bytes.len(),
            })?;
        data.extend_from_slice(bytes);
        Ok(Self { data })
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning the underlying bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

// Contents can be megabytes; print only the size.
impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.data.len())
            .finish()
    }
}
