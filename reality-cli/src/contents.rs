// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark input acquisition: a local file, an HTTP(S) URL or random bytes.

use std::fmt;
use std::path::PathBuf;

use rand::RngCore;
use reality_core::ByteBuffer;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while acquiring benchmark input.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Content from {0} is empty")]
    Empty(String),

    #[error("Invalid size '{0}': expected a number with optional K, M or G suffix")]
    InvalidSize(String),

    #[error("No input given: pass a file or URL, or --random <size>")]
    MissingSource,
}

/// Where benchmark input comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(String),
    Random(usize),
}

impl Source {
    /// Pick a source from the positional argument or a random size.
    ///
    /// A random size wins over a positional argument.
    pub fn resolve(location: Option<&str>, random: Option<usize>) -> Result<Self, ContentError> {
        match (random, location) {
            (Some(size), _) => Ok(Source::Random(size)),
            (None, Some(loc)) if loc.starts_with("http://") || loc.starts_with("https://") => {
                Ok(Source::Url(loc.to_string()))
            }
            (None, Some(loc)) => Ok(Source::File(PathBuf::from(loc))),
            (None, None) => Err(ContentError::MissingSource),
        }
    }

    /// Load the content. Empty content is rejected.
    pub async fn acquire(&self) -> Result<ByteBuffer, ContentError> {
        let data = match self {
            Source::File(path) => tokio::fs::read(path).await.map_err(|e| ContentError::Read {
                path: path.clone(),
                source: e,
            })?,
            Source::Url(url) => fetch(url).await?,
            Source::Random(size) => random_bytes(*size),
        };

        if data.is_empty() {
            return Err(ContentError::Empty(self.to_string()));
        }

        info!(source = %self, bytes = data.len(), "Input acquired");
        Ok(ByteBuffer::new(data))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
            Source::Random(size) => write!(f, "random({} bytes)", size),
        }
    }
}

async fn fetch(url: &str) -> Result<Vec<u8>, ContentError> {
    let wrap = |e: reqwest::Error| ContentError::Fetch {
        url: url.to_string(),
        source: e,
    };

    debug!(url = %url, "Fetching input");
    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(wrap)?;
    let body = response.bytes().await.map_err(wrap)?;
    Ok(body.to_vec())
}

/// `size` random bytes from the thread-local RNG.
pub fn random_bytes(size: usize) -> Vec<u8> {
    let mut data = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut data);
    data
}

/// Parse sizes such as `512`, `64K`, `10M` or `1G` (1024-based).
pub fn parse_human_size(value: &str) -> Result<usize, ContentError> {
    let invalid = || ContentError::InvalidSize(value.to_string());

    let trimmed = value.trim();
    let upper = trimmed.to_ascii_uppercase();
    let digits = upper.strip_suffix('B').unwrap_or(&upper);

    let (number, shift) = match digits.chars().last() {
        Some('K') => (&digits[..digits.len() - 1], 10),
        Some('M') => (&digits[..digits.len() - 1], 20),
        Some('G') => (&digits[..digits.len() - 1], 30),
        _ => (digits, 0),
    };

    let count: usize = number.trim().parse().map_err(|_| invalid())?;
    if count == 0 {
        return Err(invalid());
    }
    count.checked_mul(1usize << shift).ok_or_else(invalid)
}
