// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Reality Stages
//!
//! Concrete [`reality_core::Stage`] implementations: AEAD encryption and
//! decryption, message digests and zlib compression. Every stage is built
//! from explicit settings, so pipelines with different keys or algorithms can
//! run side by side.

pub mod cipher;
pub mod digest;
pub mod settings;
pub mod zlib;

pub use cipher::{
    CipherAlgorithm, CipherKit, CipherMode, CipherSettings, DecryptStage, EncryptStage,
    AAD_LEN, IV_LEN, TAG_LEN,
};
pub use digest::{DigestAlgorithm, DigestStage};
pub use settings::StageSettings;
pub use zlib::{DeflateStage, InflateStage, ZlibLevel};
