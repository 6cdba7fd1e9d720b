// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Symmetric encrypt and decrypt stages.
//!
//! AES runs in CBC (PKCS#7 padded), CFB, OFB, CTR, GCM or CCM mode with a
//! 128, 192 or 256-bit key; ChaCha20-Poly1305 is offered alongside. A
//! [`CipherKit`] holds one key, IV and AAD drawn from the OS RNG and hands out
//! an [`EncryptStage`] / [`DecryptStage`] pair sharing that material. The IV is
//! reused on every loop so that each pass is the same computation.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use aes_gcm::aead::consts::{U12, U16, U7};
use aes_gcm::aead::{Aead, KeyInit, Nonce, Payload};
use aes_gcm::AesGcm;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{
    AsyncStreamCipher, BlockDecryptMut, BlockEncryptMut, KeyIvInit, StreamCipher,
};
use ccm::Ccm;
use chacha20poly1305::ChaCha20Poly1305;
use rand::rngs::OsRng;
use rand::RngCore;
use reality_core::{ByteBuffer, ConfigurationError, Stage, StageError};
use serde::{Deserialize, Serialize};

/// IV drawn for every kit. Block modes use all of it, AEAD modes a prefix.
pub const IV_LEN: usize = 16;

/// Nonce length for AES-GCM and ChaCha20-Poly1305.
pub const GCM_NONCE_LEN: usize = 12;

/// Nonce length for AES-CCM; leaves an 8-byte length field.
pub const CCM_NONCE_LEN: usize = 7;

/// Additional authenticated data length.
pub const AAD_LEN: usize = 32;

/// Authentication tag appended by every AEAD mode.
pub const TAG_LEN: usize = 16;

const BLOCK_LEN: usize = 16;

type AesCcm<A> = Ccm<A, U16, U7>;

/// Pick the AES key schedule type from a validated key size.
macro_rules! with_aes {
    ($bits:expr, |$aes:ident| $body:expr) => {
        match $bits {
            128 => {
                type $aes = aes::Aes128;
                $body
            }
            192 => {
                type $aes = aes::Aes192;
                $body
            }
            _ => {
                type $aes = aes::Aes256;
                $body
            }
        }
    };
}

// ============================================================================
// Algorithm Selection
// ============================================================================

/// AES block cipher mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherMode {
    #[default]
    Cbc,
    Cfb,
    Ofb,
    Ctr,
    Gcm,
    Ccm,
}

impl CipherMode {
    pub const ALL: [CipherMode; 6] = [
        CipherMode::Cbc,
        CipherMode::Cfb,
        CipherMode::Ofb,
        CipherMode::Ctr,
        CipherMode::Gcm,
        CipherMode::Ccm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CipherMode::Cbc => "cbc",
            CipherMode::Cfb => "cfb",
            CipherMode::Ofb => "ofb",
            CipherMode::Ctr => "ctr",
            CipherMode::Gcm => "gcm",
            CipherMode::Ccm => "ccm",
        }
    }

    /// Authenticated modes append a [`TAG_LEN`]-byte tag.
    pub fn is_aead(&self) -> bool {
        matches!(self, CipherMode::Gcm | CipherMode::Ccm)
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CipherMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == lower)
            .ok_or_else(|| ConfigurationError::InvalidFieldValue {
                field: "cipher.mode",
                value: s.to_string(),
                reason: "expected cbc, cfb, ofb, ctr, gcm or ccm".to_string(),
            })
    }
}

/// Supported ciphers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CipherAlgorithm {
    Aes(CipherMode),
    ChaCha20Poly1305,
}

impl Default for CipherAlgorithm {
    fn default() -> Self {
        CipherAlgorithm::Aes(CipherMode::default())
    }
}

impl CipherAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherAlgorithm::Aes(CipherMode::Cbc) => "aes-cbc",
            CipherAlgorithm::Aes(CipherMode::Cfb) => "aes-cfb",
            CipherAlgorithm::Aes(CipherMode::Ofb) => "aes-ofb",
            CipherAlgorithm::Aes(CipherMode::Ctr) => "aes-ctr",
            CipherAlgorithm::Aes(CipherMode::Gcm) => "aes-gcm",
            CipherAlgorithm::Aes(CipherMode::Ccm) => "aes-ccm",
            CipherAlgorithm::ChaCha20Poly1305 => "chacha20-poly1305",
        }
    }

    /// The AES mode, if this is AES.
    pub fn mode(&self) -> Option<CipherMode> {
        match self {
            CipherAlgorithm::Aes(mode) => Some(*mode),
            CipherAlgorithm::ChaCha20Poly1305 => None,
        }
    }

    pub fn is_aead(&self) -> bool {
        self.mode().map_or(true, |mode| mode.is_aead())
    }

    /// Switch the AES mode. ChaCha20-Poly1305 has no modes.
    pub fn with_mode(self, mode: CipherMode) -> Result<Self, ConfigurationError> {
        match self {
            CipherAlgorithm::Aes(_) => Ok(CipherAlgorithm::Aes(mode)),
            CipherAlgorithm::ChaCha20Poly1305 => Err(ConfigurationError::InvalidFieldValue {
                field: "cipher.mode",
                value: mode.to_string(),
                reason: format!("{} has no block cipher modes", self),
            }),
        }
    }

    /// Key size used when none is configured.
    pub fn default_key_bits(&self) -> u16 {
        match self {
            CipherAlgorithm::Aes(_) => 128,
            CipherAlgorithm::ChaCha20Poly1305 => 256,
        }
    }

    fn supports_key_bits(&self, bits: u16) -> bool {
        match self {
            CipherAlgorithm::Aes(_) => matches!(bits, 128 | 192 | 256),
            CipherAlgorithm::ChaCha20Poly1305 => bits == 256,
        }
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CipherAlgorithm {
    type Err = ConfigurationError;

    /// Accepts `aes-<mode>`, a bare mode name, `aes` (CBC) and `chacha20-poly1305`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "aes" => return Ok(CipherAlgorithm::default()),
            "chacha20-poly1305" | "chacha" => return Ok(CipherAlgorithm::ChaCha20Poly1305),
            _ => {}
        }

        let mode = lower.strip_prefix("aes-").unwrap_or(&lower);
        mode.parse::<CipherMode>()
            .map(CipherAlgorithm::Aes)
            .map_err(|_| ConfigurationError::InvalidFieldValue {
                field: "cipher.algorithm",
                value: s.to_string(),
                reason: "expected aes-{cbc,cfb,ofb,ctr,gcm,ccm} or chacha20-poly1305"
                    .to_string(),
            })
    }
}

impl TryFrom<String> for CipherAlgorithm {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CipherAlgorithm> for String {
    fn from(algorithm: CipherAlgorithm) -> Self {
        algorithm.as_str().to_string()
    }
}

/// Validated cipher selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CipherSettings {
    pub algorithm: CipherAlgorithm,
    pub key_bits: u16,
}

impl CipherSettings {
    /// Validate a key size for the algorithm. `None` picks the algorithm's default.
    pub fn new(
        algorithm: CipherAlgorithm,
        key_bits: Option<u16>,
    ) -> Result<Self, ConfigurationError> {
        let key_bits = key_bits.unwrap_or_else(|| algorithm.default_key_bits());
        if !algorithm.supports_key_bits(key_bits) {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "cipher.key_bits",
                value: key_bits.to_string(),
                reason: format!("not a valid key size for {}", algorithm),
            });
        }
        Ok(Self {
            algorithm,
            key_bits,
        })
    }

    pub fn key_len(&self) -> usize {
        usize::from(self.key_bits / 8)
    }

    /// Label such as `aes-256-cbc` or `chacha20-poly1305`.
    pub fn label(&self) -> String {
        match self.algorithm {
            CipherAlgorithm::Aes(mode) => format!("aes-{}-{}", self.key_bits, mode),
            CipherAlgorithm::ChaCha20Poly1305 => self.algorithm.as_str().to_string(),
        }
    }
}

impl Default for CipherSettings {
    fn default() -> Self {
        Self {
            algorithm: CipherAlgorithm::default(),
            key_bits: 128,
        }
    }
}

// ============================================================================
// Key Material
// ============================================================================

struct CipherMaterial {
    settings: CipherSettings,
    key: Vec<u8>,
    iv: [u8; IV_LEN],
    aad: [u8; AAD_LEN],
}

fn codec(stage: &'static str, message: impl Into<String>) -> StageError {
    StageError::Codec {
        stage,
        message: message.into(),
    }
}

fn key_error<E>(_: E) -> StageError {
    codec("cipher", "key or IV length rejected")
}

fn owned_copy(data: &[u8], spare: usize) -> Result<Vec<u8>, StageError> {
    let mut buf = ByteBuffer::try_zeroed(data.len() + spare)?.into_vec();
    buf[..data.len()].copy_from_slice(data);
    Ok(buf)
}

fn apply_keystream<C: KeyIvInit + StreamCipher>(
    key: &[u8],
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, StageError> {
    let mut buf = owned_copy(data, 0)?;
    C::new_from_slices(key, iv)
        .map_err(key_error)?
        .apply_keystream(&mut buf);
    Ok(buf)
}

fn aead_seal<C: Aead>(
    cipher: C,
    nonce: &[u8],
    aad: &[u8],
    msg: &[u8],
) -> Result<Vec<u8>, StageError> {
    cipher
        .encrypt(Nonce::<C>::from_slice(nonce), Payload { msg, aad })
        .map_err(|_| codec("encrypt", "seal failed"))
}

fn aead_open<C: Aead>(
    cipher: C,
    nonce: &[u8],
    aad: &[u8],
    msg: &[u8],
) -> Result<Vec<u8>, StageError> {
    if msg.len() < TAG_LEN {
        return Err(codec(
            "decrypt",
            format!("ciphertext of {} bytes is shorter than the tag", msg.len()),
        ));
    }
    cipher
        .decrypt(Nonce::<C>::from_slice(nonce), Payload { msg, aad })
        .map_err(|_| codec("decrypt", "tag mismatch"))
}

impl CipherMaterial {
    fn seal(&self, data: &[u8]) -> Result<Vec<u8>, StageError> {
        let (key, iv, aad) = (self.key.as_slice(), &self.iv[..], &self.aad[..]);
        let bits = self.settings.key_bits;

        match self.settings.algorithm {
            CipherAlgorithm::Aes(CipherMode::Cbc) => with_aes!(bits, |A| {
                let mut buf = owned_copy(data, BLOCK_LEN)?;
                let len = cbc::Encryptor::<A>::new_from_slices(key, iv)
                    .map_err(key_error)?
                    .encrypt_padded_mut::<Pkcs7>(&mut buf, data.len())
                    .map_err(|_| codec("encrypt", "padding failed"))?
                    .len();
                buf.truncate(len);
                Ok(buf)
            }),
            CipherAlgorithm::Aes(CipherMode::Cfb) => with_aes!(bits, |A| {
                let mut buf = owned_copy(data, 0)?;
                cfb_mode::Encryptor::<A>::new_from_slices(key, iv)
                    .map_err(key_error)?
                    .encrypt(&mut buf);
                Ok(buf)
            }),
            CipherAlgorithm::Aes(CipherMode::Ofb) => {
                with_aes!(bits, |A| apply_keystream::<ofb::Ofb<A>>(key, iv, data))
            }
            CipherAlgorithm::Aes(CipherMode::Ctr) => {
                with_aes!(bits, |A| apply_keystream::<ctr::Ctr128BE<A>>(key, iv, data))
            }
            CipherAlgorithm::Aes(CipherMode::Gcm) => with_aes!(bits, |A| {
                let cipher = AesGcm::<A, U12>::new_from_slice(key).map_err(key_error)?;
                aead_seal(cipher, &iv[..GCM_NONCE_LEN], aad, data)
            }),
            CipherAlgorithm::Aes(CipherMode::Ccm) => with_aes!(bits, |A| {
                let cipher = AesCcm::<A>::new_from_slice(key).map_err(key_error)?;
                aead_seal(cipher, &iv[..CCM_NONCE_LEN], aad, data)
            }),
            CipherAlgorithm::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(key).map_err(key_error)?;
                aead_seal(cipher, &iv[..GCM_NONCE_LEN], aad, data)
            }
        }
    }

    fn open(&self, data: &[u8]) -> Result<Vec<u8>, StageError> {
        let (key, iv, aad) = (self.key.as_slice(), &self.iv[..], &self.aad[..]);
        let bits = self.settings.key_bits;

        match self.settings.algorithm {
            CipherAlgorithm::Aes(CipherMode::Cbc) => {
                if data.is_empty() || data.len() % BLOCK_LEN != 0 {
                    return Err(codec(
                        "decrypt",
                        format!("{} bytes is not a whole number of blocks", data.len()),
                    ));
                }
                with_aes!(bits, |A| {
                    let mut buf = owned_copy(data, 0)?;
                    let len = cbc::Decryptor::<A>::new_from_slices(key, iv)
                        .map_err(key_error)?
                        .decrypt_padded_mut::<Pkcs7>(&mut buf)
                        .map_err(|_| codec("decrypt", "bad padding"))?
                        .len();
                    buf.truncate(len);
                    Ok(buf)
                })
            }
            CipherAlgorithm::Aes(CipherMode::Cfb) => with_aes!(bits, |A| {
                let mut buf = owned_copy(data, 0)?;
                cfb_mode::Decryptor::<A>::new_from_slices(key, iv)
                    .map_err(key_error)?
                    .decrypt(&mut buf);
                Ok(buf)
            }),
            CipherAlgorithm::Aes(CipherMode::Ofb) => {
                with_aes!(bits, |A| apply_keystream::<ofb::Ofb<A>>(key, iv, data))
            }
            CipherAlgorithm::Aes(CipherMode::Ctr) => {
                with_aes!(bits, |A| apply_keystream::<ctr::Ctr128BE<A>>(key, iv, data))
            }
            CipherAlgorithm::Aes(CipherMode::Gcm) => with_aes!(bits, |A| {
                let cipher = AesGcm::<A, U12>::new_from_slice(key).map_err(key_error)?;
                aead_open(cipher, &iv[..GCM_NONCE_LEN], aad, data)
            }),
            CipherAlgorithm::Aes(CipherMode::Ccm) => with_aes!(bits, |A| {
                let cipher = AesCcm::<A>::new_from_slice(key).map_err(key_error)?;
                aead_open(cipher, &iv[..CCM_NONCE_LEN], aad, data)
            }),
            CipherAlgorithm::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(key).map_err(key_error)?;
                aead_open(cipher, &iv[..GCM_NONCE_LEN], aad, data)
            }
        }
    }
}

/// Key, IV and AAD shared by one encrypt/decrypt pair.
#[derive(Clone)]
pub struct CipherKit {
    material: Arc<CipherMaterial>,
}

impl CipherKit {
    /// Draw fresh key material from the OS RNG.
    pub fn generate(settings: CipherSettings) -> Result<Self, ConfigurationError> {
        let mut key = vec![0u8; settings.key_len()];
        let mut iv = [0u8; IV_LEN];
        let mut aad = [0u8; AAD_LEN];
        OsRng.fill_bytes(&mut key);
        OsRng.fill_bytes(&mut iv);
        OsRng.fill_bytes(&mut aad);
        Self::from_parts(settings, &key, iv, aad)
    }

    /// Build from explicit material.
    pub fn from_parts(
        settings: CipherSettings,
        key: &[u8],
        iv: [u8; IV_LEN],
        aad: [u8; AAD_LEN],
    ) -> Result<Self, ConfigurationError> {
        if key.len() != settings.key_len() {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "cipher.key",
                value: format!("{} bytes", key.len()),
                reason: format!("{} needs a {}-byte key", settings.label(), settings.key_len()),
            });
        }
        Ok(Self {
            material: Arc::new(CipherMaterial {
                settings,
                key: key.to_vec(),
                iv,
                aad,
            }),
        })
    }

    pub fn settings(&self) -> CipherSettings {
        self.material.settings
    }

    pub fn encrypt_stage(&self) -> EncryptStage {
        EncryptStage {
            name: format!("{} encrypt", self.material.settings.label()),
            material: Arc::clone(&self.material),
        }
    }

    pub fn decrypt_stage(&self) -> DecryptStage {
        DecryptStage {
            name: format!("{} decrypt", self.material.settings.label()),
            material: Arc::clone(&self.material),
        }
    }
}

impl fmt::Debug for CipherKit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherKit")
            .field("settings", &self.material.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Stages
// ============================================================================

/// Encrypts plaintext; AEAD modes append the tag.
pub struct EncryptStage {
    name: String,
    material: Arc<CipherMaterial>,
}

impl Stage for EncryptStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, input: &ByteBuffer) -> Result<ByteBuffer, StageError> {
        self.material.seal(input.as_slice()).map(ByteBuffer::new)
    }
}

/// Decrypts ciphertext produced by the matching [`EncryptStage`].
pub struct DecryptStage {
    name: String,
    material: Arc<CipherMaterial>,
}

impl Stage for DecryptStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, input: &ByteBuffer) -> Result<ByteBuffer, StageError> {
        self.material.open(input.as_slice()).map(ByteBuffer::new)
    }
}
