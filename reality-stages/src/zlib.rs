// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Zlib deflate and inflate stages.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use reality_core::{ByteBuffer, ConfigurationError, Stage, StageError};
use serde::{Deserialize, Serialize};

/// Initial inflate capacity as a multiple of the compressed size.
const INFLATE_GROWTH: usize = 5;

/// Zlib compression level, 0 (store) to 9 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZlibLevel(u32);

impl ZlibLevel {
    pub const FAST: ZlibLevel = ZlibLevel(1);
    pub const DEFAULT: ZlibLevel = ZlibLevel(6);
    pub const BEST: ZlibLevel = ZlibLevel(9);

    /// Levels benchmarked by the zlib suite, in run order.
    pub const SUITE: [ZlibLevel; 3] = [Self::DEFAULT, Self::FAST, Self::BEST];

    pub fn new(level: u32) -> Result<Self, ConfigurationError> {
        if level > 9 {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "zlib.level",
                value: level.to_string(),
                reason: "must be between 0 and 9".to_string(),
            });
        }
        Ok(Self(level))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    fn compression(&self) -> Compression {
        Compression::new(self.0)
    }
}

impl Default for ZlibLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ZlibLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::FAST => f.write_str("fast"),
            Self::DEFAULT => f.write_str("default"),
            Self::BEST => f.write_str("best"),
            ZlibLevel(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for ZlibLevel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::FAST),
            "default" => Ok(Self::DEFAULT),
            "best" => Ok(Self::BEST),
            other => other
                .parse::<u32>()
                .map_err(|_| ConfigurationError::InvalidFieldValue {
                    field: "zlib.level",
                    value: s.to_string(),
                    reason: "expected fast, default, best or 0-9".to_string(),
                })
                .and_then(Self::new),
        }
    }
}

impl TryFrom<String> for ZlibLevel {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ZlibLevel> for String {
    fn from(level: ZlibLevel) -> Self {
        level.to_string()
    }
}

fn reserve(capacity: usize) -> Result<Vec<u8>, StageError> {
    let mut out = Vec::new();
    out.try_reserve(capacity)
        .map_err(|_| StageError::Allocation {
            requested: capacity,
        })?;
    Ok(out)
}

/// Compresses its input into a single zlib stream.
pub struct DeflateStage {
    name: String,
    level: ZlibLevel,
}

impl DeflateStage {
    pub fn new(level: ZlibLevel) -> Self {
        Self {
            name: format!("deflate({})", level),
            level,
        }
    }

    pub fn level(&self) -> ZlibLevel {
        self.level
    }

    /// Compress `data` outside the harness.
    pub fn deflate(&self, data: &[u8]) -> Result<Vec<u8>, StageError> {
        let codec = |e: std::io::Error| StageError::Codec {
            stage: "deflate",
            message: e.to_string(),
        };

        let mut encoder = ZlibEncoder::new(reserve(data.len())?, self.level.compression());
        encoder.write_all(data).map_err(codec)?;
        encoder.finish().map_err(codec)
    }
}

impl Stage for DeflateStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, input: &ByteBuffer) -> Result<ByteBuffer, StageError> {
        self.deflate(input.as_slice()).map(ByteBuffer::new)
    }
}

/// Decompresses a zlib stream produced by [`DeflateStage`].
#[derive(Debug, Default)]
pub struct InflateStage;

impl InflateStage {
    pub fn new() -> Self {
        Self
    }

    /// Decompress `data` outside the harness.
    pub fn inflate(&self, data: &[u8]) -> Result<Vec<u8>, StageError> {
        let mut out = reserve(data.len().saturating_mul(INFLATE_GROWTH))?;
        ZlibDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|e| StageError::Codec {
                stage: "inflate",
                message: e.to_string(),
            })?;
        Ok(out)
    }
}

impl Stage for InflateStage {
    fn name(&self) -> &str {
        "inflate"
    }

    fn transform(&self, input: &ByteBuffer) -> Result<ByteBuffer, StageError> {
        self.inflate(input.as_slice()).map(ByteBuffer::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(len: usize) -> ByteBuffer {
        let words = b"lorem ipsum dolor sit amet consectetur adipiscing elit ";
        ByteBuffer::new(words.iter().copied().cycle().take(len).collect())
    }

    #[test]
    fn test_round_trip_every_suite_level() {
        let input = text(64 * 1024);
        for level in ZlibLevel::SUITE {
            let packed = DeflateStage::new(level).transform(&input).unwrap();
            assert!(packed.len() < input.len(), "{} should compress text", level);
            let unpacked = InflateStage::new().transform(&packed).unwrap();
            assert_eq!(unpacked, input);
        }
    }

    #[test]
    fn test_stored_level_round_trip() {
        let input = text(1000);
        let stage = DeflateStage::new(ZlibLevel::new(0).unwrap());
        let packed = stage.transform(&input).unwrap();
        assert!(packed.len() > input.len());
        assert_eq!(InflateStage::new().transform(&packed).unwrap(), input);
    }

    #[test]
    fn test_inflate_garbage_is_codec_error() {
        let err = InflateStage::new()
            .transform(&ByteBuffer::from(&b"not a zlib stream"[..]))
            .unwrap_err();
        assert!(matches!(err, StageError::Codec { stage: "inflate", .. }));
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("best".parse::<ZlibLevel>().unwrap(), ZlibLevel::BEST);
        assert_eq!("FAST".parse::<ZlibLevel>().unwrap(), ZlibLevel::FAST);
        assert_eq!("3".parse::<ZlibLevel>().unwrap().get(), 3);
        assert!("10".parse::<ZlibLevel>().is_err());
        assert!("fastest".parse::<ZlibLevel>().is_err());
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(DeflateStage::new(ZlibLevel::DEFAULT).name(), "deflate(default)");
        assert_eq!(DeflateStage::new(ZlibLevel::new(2).unwrap()).name(), "deflate(2)");
        assert_eq!(InflateStage::new().name(), "inflate");
    }
}
