// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! JSON report output.
//!
//! Handles saving reports to timestamped JSON files and reading them back.

use crate::metrics::BenchmarkReport;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Report file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Serialize a report, optionally pretty-printed.
pub fn to_json(report: &BenchmarkReport, pretty: bool) -> Result<String, ReporterError> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    Ok(json)
}

/// JSON reporter writing one file per report.
pub struct JsonReporter {
    /// Output directory for report files
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a new JSON reporter, creating the output directory if needed.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save a report to `<name>_<timestamp>.json`.
    ///
    /// Returns the path to the created file.
    pub fn save(&self, report: &BenchmarkReport) -> Result<PathBuf, ReporterError> {
        let timestamp = report.timestamp.format("%Y-%m-%dT%H-%M-%S%.3fZ");
        let filename = format!("{}_{}.json", file_stem(&report.name), timestamp);
        let filepath = self.output_dir.join(&filename);

        let file = File::create(&filepath)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        info!(path = %filepath.display(), "Report saved");
        Ok(filepath)
    }

    /// List all saved reports in the output directory, oldest name first.
    pub fn list_reports(&self) -> Result<Vec<PathBuf>, ReporterError> {
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.output_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }

    /// Load a saved report from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<BenchmarkReport, ReporterError> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}

/// Report names become file names; keep them portable.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::RunConfigSummary;
    use reality_core::{LoopRecord, RunResult, StageRun, ThreadResult};
    use std::time::Duration;
    use tempfile::TempDir;

    fn report(name: &str) -> BenchmarkReport {
        let thread = ThreadResult {
            loops: vec![LoopRecord {
                stage_runs: vec![StageRun::succeeded(Duration::from_micros(5), 64, 32)],
                verified: true,
            }],
            peak_live_buffers: 1,
        };
        let result = RunResult::new(vec!["deflate(best)".into()], vec![thread]);
        let config = RunConfigSummary {
            threads: 1,
            deadline_ms: 10,
            input_bytes: 64,
            verified_against: None,
        };
        BenchmarkReport::from_run(name, &result, &config, false)
    }

    #[test]
    fn test_reporter_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path()).unwrap();

        let path = reporter.save(&report("zlib best")).unwrap();
        assert!(path.exists());
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("zlib_best_"));

        let loaded = JsonReporter::load(&path).unwrap();
        assert_eq!(loaded.name, "zlib best");
        assert_eq!(loaded.stages.len(), 1);
        assert_eq!(loaded.stages[0].name, "deflate(best)");
        assert_eq!(loaded.stages[0].ratio, Some(0.5));
    }

    #[test]
    fn test_list_reports() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path().join("nested")).unwrap();

        reporter.save(&report("sha256")).unwrap();
        reporter.save(&report("sha512")).unwrap();
        fs::write(reporter.output_dir().join("notes.txt"), "ignored").unwrap();

        let reports = reporter.list_reports().unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonReporter::load(&path),
            Err(ReporterError::Serialization(_))
        ));
    }

    #[test]
    fn test_to_json_compact_and_pretty() {
        let report = report("crc32");
        let compact = to_json(&report, false).unwrap();
        let pretty = to_json(&report, true).unwrap();
        assert!(!compact.contains('\n'));
        assert!(pretty.contains('\n'));
        assert!(compact.contains("\"succeeded\":true"));
    }
}
