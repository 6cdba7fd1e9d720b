// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `reality validate` command - Validate a settings file.

use std::path::Path;

use reality_core::{HarnessResult, RunSettings, SettingsLoader};
use reality_stages::StageSettings;

fn load(file: &Path) -> HarnessResult<(RunSettings, StageSettings)> {
    Ok((
        SettingsLoader::load_file(file)?,
        StageSettings::load_file(file)?,
    ))
}

pub async fn execute(file: &Path) -> anyhow::Result<()> {
    tracing::info!(file = %file.display(), "Validating settings");

    match load(file) {
        Ok((run, stages)) => {
            println!("✓ Settings are valid");
            println!();
            println!("Run Settings:");
            println!("  Duration: {}", run.deadline);
            println!("  Threads:  {}", run.threads);
            println!();
            println!("Stage Settings:");
            println!("  Cipher:   {}", stages.cipher.label());
            println!("  Digest:   {}", stages.digest);
            println!("  Zlib:     {} (level {})", stages.zlib, stages.zlib.get());
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Settings validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_reads_both_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reality.yaml");
        std::fs::write(
            &path,
            "run:\n  duration_ms: 250\ncipher:\n  algorithm: aes-gcm\n  key_bits: 192\nzlib:\n  level: best\n",
        )
        .unwrap();

        let (run, stages) = load(&path).unwrap();
        assert_eq!(run.deadline.duration().as_millis(), 250);
        assert_eq!(stages.cipher.label(), "aes-192-gcm");
        assert_eq!(stages.zlib.get(), 9);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        std::fs::write(&path, "run:\n  threads: 0\n").unwrap();
        assert!(load(&path).is_err());
        assert!(load(&temp_dir.path().join("missing.yaml")).is_err());
    }
}
