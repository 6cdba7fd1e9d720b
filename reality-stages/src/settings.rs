// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Stage settings loaded from the `cipher`, `digest` and `zlib` sections of
//! the settings file.
//!
//! ```yaml
//! cipher:
//!   algorithm: aes
//!   mode: ctr
//!   key_bits: 256
//! digest:
//!   algorithm: sha3-256
//! zlib:
//!   level: best
//! ```

use std::path::Path;

use reality_core::{ConfigurationError, HarnessError, HarnessResult, SettingsLoader};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cipher::{CipherAlgorithm, CipherMode, CipherSettings};
use crate::digest::DigestAlgorithm;
use crate::zlib::ZlibLevel;

// ============================================================================
// Raw Sections (Before Validation)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct RawCipherSection {
    #[serde(default)]
    algorithm: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    key_bits: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDigestSection {
    #[serde(default)]
    algorithm: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Number(u32),
    Name(String),
}

#[derive(Debug, Default, Deserialize)]
struct RawZlibSection {
    #[serde(default)]
    level: Option<RawLevel>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStageSettings {
    #[serde(default)]
    cipher: RawCipherSection,
    #[serde(default)]
    digest: RawDigestSection,
    #[serde(default)]
    zlib: RawZlibSection,
}

// ============================================================================
// Validated Settings
// ============================================================================

/// Validated per-stage selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StageSettings {
    pub cipher: CipherSettings,
    pub digest: DigestAlgorithm,
    pub zlib: ZlibLevel,
}

impl StageSettings {
    /// Load and validate stage settings from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> HarnessResult<Self> {
        let content = SettingsLoader::read_file(path)?;
        Self::load_string(&content)
    }

    /// Load and validate stage settings from a YAML string.
    pub fn load_string(content: &str) -> HarnessResult<Self> {
        let raw: RawStageSettings =
            serde_yaml::from_str(content).map_err(|e| HarnessError::SettingsParse {
                message: format!("YAML parse error: {}", e),
            })?;

        let settings = Self::validate(raw)?;
        debug!(?settings, "Stage settings loaded");
        Ok(settings)
    }

    fn validate(raw: RawStageSettings) -> Result<Self, ConfigurationError> {
        let algorithm = match raw.cipher.algorithm {
            Some(name) => name.parse::<CipherAlgorithm>()?,
            None => CipherAlgorithm::default(),
        };
        let algorithm = match raw.cipher.mode {
            Some(mode) => algorithm.with_mode(mode.parse::<CipherMode>()?)?,
            None => algorithm,
        };
        let cipher = CipherSettings::new(algorithm, raw.cipher.key_bits)?;

        let digest = match raw.digest.algorithm {
            Some(name) => name.parse::<DigestAlgorithm>()?,
            None => DigestAlgorithm::default(),
        };

        let zlib = match raw.zlib.level {
            Some(RawLevel::Number(n)) => ZlibLevel::new(n)?,
            Some(RawLevel::Name(name)) => name.parse::<ZlibLevel>()?,
            None => ZlibLevel::default(),
        };

        Ok(Self {
            cipher,
            digest,
            zlib,
        })
    }
}
