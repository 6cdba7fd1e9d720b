// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Human-readable report rendering.

use std::fmt::{self, Write};

use crate::metrics::{BenchmarkReport, LatencySummary, StageSummary};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with 1024-based units, e.g. `1.50 MB`.
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, SIZE_UNITS[unit])
}

/// Format a rate as bytes per second.
pub fn format_rate(bytes_per_sec: Option<f64>) -> String {
    match bytes_per_sec {
        Some(bps) => format!("{}/s", format_bytes(bps as u64)),
        None => "n/a".to_string(),
    }
}

/// Format `numerator / denominator` as a percentage, e.g. `37.50%`.
pub fn format_ratio(numerator: u64, denominator: u64) -> String {
    if denominator == 0 {
        return "n/a".to_string();
    }
    format!("{:.2}%", numerator as f64 / denominator as f64 * 100.0)
}

/// Renders reports as indented plain text.
pub struct TextRenderer {
    verbose: bool,
}

impl TextRenderer {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Borrow `report` as a displayable block of text.
    pub fn display<'a>(&'a self, report: &'a BenchmarkReport) -> RenderedReport<'a> {
        RenderedReport {
            renderer: self,
            report,
        }
    }

    pub fn render(&self, report: &BenchmarkReport) -> String {
        self.display(report).to_string()
    }

    fn write_report(&self, out: &mut dyn Write, report: &BenchmarkReport) -> fmt::Result {
        let threads = report.config.threads.max(1);
        let ops = report.loops.ops_per_sec.unwrap_or(0.0);

        writeln!(
            out,
            "{} ({} thread{}, {} ms)",
            report.name,
            threads,
            if threads == 1 { "" } else { "s" },
            report.config.deadline_ms
        )?;
        writeln!(
            out,
            "\tTotal Ops: {} ({:.4} Ops/s), Loop: {} avg, {} stdev",
            report.loops.total,
            ops,
            LatencySummary::format_latency(report.all_stages.mean_usec),
            LatencySummary::format_latency(report.all_stages.std_dev_usec),
        )?;
        if threads > 1 {
            writeln!(
                out,
                "\t\tPer Thread: {:.4} Ops/s, {:.2} loops avg, {:.2} stdev",
                ops / threads as f64,
                report.loops.avg_per_thread,
                report.loops.std_dev_per_thread
            )?;
        }

        for stage in &report.stages {
            self.write_stage(out, stage, threads)?;
        }

        writeln!(
            out,
            "\tSucceeded: {}, Verified: {}, Deterministic: {}",
            yes_no(report.verdicts.succeeded),
            yes_no(report.verdicts.verified),
            yes_no(report.verdicts.deterministic)
        )?;

        if self.verbose {
            if let Some(per_thread) = &report.threads {
                for t in per_thread {
                    writeln!(
                        out,
                        "\t\tThread {}: {} loops in {}, peak buffers {}",
                        t.thread,
                        t.loops,
                        LatencySummary::format_latency(t.elapsed_usec as f64),
                        t.peak_live_buffers
                    )?;
                }
            }
        }

        Ok(())
    }

    fn write_stage(
        &self,
        out: &mut dyn Write,
        stage: &StageSummary,
        threads: usize,
    ) -> fmt::Result {
        write!(
            out,
            "\t[{}] {}: Total Input: {} ({}), Total Output: {} ({})",
            stage.index,
            stage.name,
            format_bytes(stage.input_bytes),
            format_rate(stage.input_bytes_per_sec),
            format_bytes(stage.output_bytes),
            format_rate(stage.output_bytes_per_sec),
        )?;
        if stage.ratio.is_some() {
            write!(
                out,
                " (Ratio: {})",
                format_ratio(stage.output_bytes, stage.input_bytes)
            )?;
        }
        writeln!(out)?;

        if threads > 1 {
            writeln!(
                out,
                "\t\tPer Thread: Input: {}, Output: {}",
                format_rate(stage.input_bytes_per_sec.map(|r| r / threads as f64)),
                format_rate(stage.output_bytes_per_sec.map(|r| r / threads as f64)),
            )?;
        }

        if self.verbose {
            let l = &stage.latency;
            writeln!(
                out,
                "\t\tLatency: mean {}, p50 {}, p95 {}, p99 {}, max {}",
                LatencySummary::format_latency(l.mean_usec),
                LatencySummary::format_latency(l.median_usec as f64),
                LatencySummary::format_latency(l.p95_usec as f64),
                LatencySummary::format_latency(l.p99_usec as f64),
                LatencySummary::format_latency(l.max_usec as f64),
            )?;
        }

        Ok(())
    }
}

/// A report paired with the renderer that formats it.
pub struct RenderedReport<'a> {
    renderer: &'a TextRenderer,
    report: &'a BenchmarkReport,
}

impl fmt::Display for RenderedReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.renderer.write_report(f, self.report)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "NO"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::RunConfigSummary;
    use reality_core::{LoopRecord, RunResult, StageRun, ThreadResult};
    use std::time::Duration;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1000), "1000.00 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(3, 8), "37.50%");
        assert_eq!(format_ratio(1016, 1000), "101.60%");
        assert_eq!(format_ratio(1, 0), "n/a");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(Some(2048.0)), "2.00 KB/s");
        assert_eq!(format_rate(None), "n/a");
    }

    #[test]
    fn test_render_multi_thread_report() {
        let thread = |usec| ThreadResult {
            loops: vec![LoopRecord {
                stage_runs: vec![StageRun::succeeded(Duration::from_micros(usec), 4096, 1024)],
                verified: true,
            }],
            peak_live_buffers: 1,
        };
        let result = RunResult::new(
            vec!["deflate(default)".into()],
            vec![thread(100), thread(200)],
        );
        let config = RunConfigSummary {
            threads: 2,
            deadline_ms: 3000,
            input_bytes: 4096,
            verified_against: None,
        };
        let report = BenchmarkReport::from_run("zlib default", &result, &config, true);

        let text = TextRenderer::new(true).render(&report);
        assert!(text.starts_with("zlib default (2 threads, 3000 ms)"));
        assert!(text.contains("Total Ops: 2 (10000.0000 Ops/s)"));
        assert!(text.contains("Per Thread: 5000.0000 Ops/s"));
        assert!(text.contains("[0] deflate(default): Total Input: 8.00 KB (39.06 MB/s)"));
        assert!(text.contains("(Ratio: 25.00%)"));
        assert!(text.contains("Thread 1: 1 loops"));
        assert!(text.contains("Verified: yes"));

        let quiet = TextRenderer::new(false);
        let formatted = format!("{}", quiet.display(&report));
        assert_eq!(formatted, quiet.render(&report));
        assert!(!formatted.contains("Thread 1:"));
    }
}
