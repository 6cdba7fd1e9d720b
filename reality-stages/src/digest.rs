// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Message digest stage.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use md5::Md5;
use rand::rngs::OsRng;
use rand::RngCore;
use reality_core::{ByteBuffer, ConfigurationError, Stage, StageError};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_256, Sha3_512};

type HmacSha256 = Hmac<Sha256>;

/// Generated HMAC key length.
pub const HMAC_KEY_LEN: usize = 32;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Ripemd160,
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
    Sha3_512,
    Blake3,
    HmacSha256,
    Crc32,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 12] = [
        DigestAlgorithm::Md5,
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Ripemd160,
        DigestAlgorithm::Sha224,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::Sha3_256,
        DigestAlgorithm::Sha3_512,
        DigestAlgorithm::Blake3,
        DigestAlgorithm::HmacSha256,
        DigestAlgorithm::Crc32,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Ripemd160 => "ripemd160",
            DigestAlgorithm::Sha224 => "sha224",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha384 => "sha384",
            DigestAlgorithm::Sha512 => "sha512",
            DigestAlgorithm::Sha3_256 => "sha3-256",
            DigestAlgorithm::Sha3_512 => "sha3-512",
            DigestAlgorithm::Blake3 => "blake3",
            DigestAlgorithm::HmacSha256 => "hmac-sha256",
            DigestAlgorithm::Crc32 => "crc32",
        }
    }

    /// Digest size in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Sha1 | DigestAlgorithm::Ripemd160 => 20,
            DigestAlgorithm::Sha224 => 28,
            DigestAlgorithm::Sha256
            | DigestAlgorithm::Sha3_256
            | DigestAlgorithm::Blake3
            | DigestAlgorithm::HmacSha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 | DigestAlgorithm::Sha3_512 => 64,
            DigestAlgorithm::Crc32 => 4,
        }
    }

    pub fn is_keyed(&self) -> bool {
        matches!(self, DigestAlgorithm::HmacSha256)
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == wanted)
            .ok_or_else(|| ConfigurationError::InvalidFieldValue {
                field: "digest.algorithm",
                value: s.to_string(),
                reason: format!(
                    "expected one of {}",
                    Self::ALL.map(|alg| alg.as_str()).join(", ")
                ),
            })
    }
}

impl TryFrom<String> for DigestAlgorithm {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DigestAlgorithm> for String {
    fn from(alg: DigestAlgorithm) -> Self {
        alg.as_str().to_string()
    }
}

/// Hashes its whole input into the raw digest bytes.
pub struct DigestStage {
    algorithm: DigestAlgorithm,
    key: Option<Vec<u8>>,
}

impl DigestStage {
    /// Build a digest stage. Keyed algorithms get a random key.
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        let key = algorithm.is_keyed().then(|| {
            let mut key = vec![0u8; HMAC_KEY_LEN];
            OsRng.fill_bytes(&mut key);
            key
        });
        Self { algorithm, key }
    }

    /// Build a keyed digest stage with an explicit key.
    pub fn with_key(algorithm: DigestAlgorithm, key: Vec<u8>) -> Self {
        Self {
            algorithm,
            key: Some(key),
        }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Compute the digest of `data` outside the harness.
    pub fn digest(&self, data: &[u8]) -> Result<Vec<u8>, StageError> {
        Ok(match self.algorithm {
            DigestAlgorithm::Md5 => Md5::digest(data).to_vec(),
            DigestAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            DigestAlgorithm::Ripemd160 => Ripemd160::digest(data).to_vec(),
            DigestAlgorithm::Sha224 => Sha224::digest(data).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
            DigestAlgorithm::Sha3_256 => Sha3_256::digest(data).to_vec(),
            DigestAlgorithm::Sha3_512 => Sha3_512::digest(data).to_vec(),
            DigestAlgorithm::Blake3 => blake3::hash(data).as_bytes().to_vec(),
            DigestAlgorithm::Crc32 => crc32fast::hash(data).to_be_bytes().to_vec(),
            DigestAlgorithm::HmacSha256 => {
                let key = self.key.as_deref().unwrap_or_default();
                let mut mac =
                    <HmacSha256 as Mac>::new_from_slice(key).map_err(|e| StageError::Codec {
                        stage: "digest",
                        message: e.to_string(),
                    })?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
        })
    }
}

impl Stage for DigestStage {
    fn name(&self) -> &str {
        self.algorithm.as_str()
    }

    fn transform(&self, input: &ByteBuffer) -> Result<ByteBuffer, StageError> {
        self.digest(input.as_slice()).map(ByteBuffer::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_length_per_algorithm() {
        let input = ByteBuffer::from(&b"abc"[..]);
        for alg in DigestAlgorithm::ALL {
            let out = DigestStage::new(alg).transform(&input).unwrap();
            assert_eq!(out.len(), alg.output_len(), "{}", alg);
        }
    }

    #[test]
    fn test_known_sha256_vector() {
        let out = DigestStage::new(DigestAlgorithm::Sha256)
            .digest(b"abc")
            .unwrap();
        assert_eq!(
            &out[..4],
            [0xba, 0x78, 0x16, 0xbf],
            "sha256(\"abc\") starts with ba7816bf"
        );
    }

    #[test]
    fn test_known_legacy_vectors() {
        let cases: [(DigestAlgorithm, [u8; 4]); 3] = [
            (DigestAlgorithm::Md5, [0x90, 0x01, 0x50, 0x98]),
            (DigestAlgorithm::Sha1, [0xa9, 0x99, 0x3e, 0x36]),
            (DigestAlgorithm::Ripemd160, [0x8e, 0xb2, 0x08, 0xf7]),
        ];
        for (alg, prefix) in cases {
            let out = DigestStage::new(alg).digest(b"abc").unwrap();
            assert_eq!(&out[..4], prefix, "{}(\"abc\")", alg);
        }
    }

    #[test]
    fn test_known_crc32_vector() {
        let out = DigestStage::new(DigestAlgorithm::Crc32)
            .digest(b"123456789")
            .unwrap();
        assert_eq!(out, vec![0xcb, 0xf4, 0x39, 0x26]);
    }

    #[test]
    fn test_hmac_depends_on_key() {
        let a = DigestStage::with_key(DigestAlgorithm::HmacSha256, vec![1; 32]);
        let b = DigestStage::with_key(DigestAlgorithm::HmacSha256, vec![2; 32]);
        assert_ne!(a.digest(b"data").unwrap(), b.digest(b"data").unwrap());
        assert_eq!(a.digest(b"data").unwrap(), a.digest(b"data").unwrap());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("SHA3-512".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha3_512);
        assert_eq!("Blake3".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Blake3);
        assert_eq!("MD5".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Md5);
        assert_eq!(
            "ripemd160".parse::<DigestAlgorithm>().unwrap(),
            DigestAlgorithm::Ripemd160
        );
        let err = "whirlpool".parse::<DigestAlgorithm>().unwrap_err();
        assert!(err.to_string().contains("sha256"));
    }

    #[test]
    fn test_stage_name_is_algorithm() {
        assert_eq!(DigestStage::new(DigestAlgorithm::Sha384).name(), "sha384");
    }
}
