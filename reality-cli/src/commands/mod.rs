// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules and the plumbing they share.

pub mod cipher;
pub mod digest;
pub mod validate;
pub mod zlib;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reality_core::{
    run_benchmark, ByteBuffer, Deadline, RunConfig, RunSettings, SettingsLoader, Stage,
    ThreadCount, DEFAULT_DEADLINE,
};
use reality_report::{to_json, BenchmarkReport, JsonReporter, RunConfigSummary, TextRenderer};
use reality_stages::StageSettings;
use tracing::{debug, info};

use crate::contents::Source;
use crate::{Cli, OutputFormat, SourceArgs};

/// `-r 0` asks for the default deadline.
fn deadline_from_seconds(seconds: u64) -> anyhow::Result<Deadline> {
    let duration = match seconds {
        0 => DEFAULT_DEADLINE,
        n => Duration::from_secs(n),
    };
    Ok(Deadline::new(duration)?)
}

/// Settings resolved from the settings file and command-line overrides.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub run: RunSettings,
    pub stages: StageSettings,
    pub format: OutputFormat,
    pub verbose: bool,
    pub output: Option<PathBuf>,
}

impl RunOptions {
    /// Load the settings file if one was given, then apply flag overrides.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let (mut run, stages) = match &cli.config {
            Some(path) => {
                let run = SettingsLoader::load_file(path)
                    .with_context(|| format!("loading run settings from {}", path.display()))?;
                let stages = StageSettings::load_file(path)
                    .with_context(|| format!("loading stage settings from {}", path.display()))?;
                (run, stages)
            }
            None => (RunSettings::default(), StageSettings::default()),
        };

        if let Some(seconds) = cli.seconds {
            run.deadline = deadline_from_seconds(seconds)?;
        }
        if let Some(threads) = cli.threads {
            run.threads = ThreadCount::new(threads)?;
        }

        debug!(deadline = %run.deadline, threads = %run.threads, "Run options resolved");
        Ok(Self {
            run,
            stages,
            format: cli.format,
            verbose: cli.verbose,
            output: cli.output.clone(),
        })
    }

    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }

    /// Print a progress line in text mode; JSON output stays machine-readable.
    pub fn announce(&self, line: impl AsRef<str>) {
        if self.is_text() {
            println!("{}", line.as_ref());
        }
    }
}

/// Acquire the benchmark input described by the source arguments.
pub async fn load_input(args: &SourceArgs) -> anyhow::Result<Arc<ByteBuffer>> {
    let source = Source::resolve(args.source.as_deref(), args.random)?;
    let input = source.acquire().await?;
    Ok(Arc::new(input))
}

/// One benchmark run: a named pipeline over shared input.
pub struct Job {
    pub name: String,
    pub stages: Vec<Box<dyn Stage>>,
    pub input: Arc<ByteBuffer>,
    pub verify: Option<Arc<ByteBuffer>>,
    pub threads: ThreadCount,
}

/// Run a job on a blocking thread, then print and optionally save its report.
pub async fn run_job(job: Job, options: &RunOptions) -> anyhow::Result<BenchmarkReport> {
    let deadline = options.run.deadline;
    let verbose = options.verbose;

    info!(name = %job.name, threads = %job.threads, deadline = %deadline, "Starting run");

    let report = tokio::task::spawn_blocking(move || -> anyhow::Result<BenchmarkReport> {
        let Job {
            name,
            stages,
            input,
            verify,
            threads,
        } = job;

        let mut config = RunConfig::new(&input)
            .threads(threads.get())
            .deadline(deadline.duration());
        for stage in stages {
            config = config.boxed_stage(stage);
        }
        if let Some(expected) = verify.as_deref() {
            config = config.verify_against(expected);
        }

        let summary = RunConfigSummary {
            threads: threads.get(),
            deadline_ms: deadline.duration().as_millis() as u64,
            input_bytes: input.len(),
            verified_against: verify.as_ref().map(|v| v.len()),
        };

        let result = run_benchmark(&config)?;
        Ok(BenchmarkReport::from_run(&name, &result, &summary, verbose))
    })
    .await
    .context("benchmark task failed")??;

    emit(&report, options)?;
    Ok(report)
}

/// Print a report in the requested format and save it when asked to.
pub fn emit(report: &BenchmarkReport, options: &RunOptions) -> anyhow::Result<()> {
    match options.format {
        OutputFormat::Text => print!("{}", TextRenderer::new(options.verbose).display(report)),
        OutputFormat::Json => println!("{}", to_json(report, false)?),
        OutputFormat::JsonPretty => println!("{}", to_json(report, true)?),
    }

    if let Some(dir) = &options.output {
        JsonReporter::new(dir)?.save(report)?;
    }
    Ok(())
}
