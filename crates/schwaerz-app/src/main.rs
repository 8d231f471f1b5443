// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Schwärz — batch PII redaction for scanned documents.
//
// Entry point. Initialises logging, wires the recognizer, normalizer and
// entity source into a pipeline, and runs it over every scan in the input
// folder. Exits non-zero only when every document failed.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use schwaerz_core::PipelineConfig;
use schwaerz_core::error::{Result, SchwaerzError};
use schwaerz_pipeline::{BatchSummary, OutputLayout, Pipeline, discover_inputs, run_batch};
use tracing::{error, info, warn};

use cli::Cli;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "schwaerz failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    if let Some(path) = &cli.write_default_config {
        PipelineConfig::default().save(path)?;
        info!(path = %path.display(), "default configuration written");
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli::load_config(cli.config.as_deref())?;
    let recognizer = cli::build_recognizer(cli)?;
    let mut pipeline = Pipeline::new(config, recognizer)?;
    if let Some(entities) = cli::load_entities(cli.gazetteer.as_deref()) {
        pipeline = pipeline.with_entities(entities);
    }
    info!(run_id = %pipeline.run_id(), recognizer = ?cli.recognizer, "Schwärz starting");

    cli::ensure_input_dir(&cli.input)?;
    let inputs = discover_inputs(&cli.input)?;
    if inputs.is_empty() {
        warn!(
            input = %cli.input.display(),
            "no .jpg/.jpeg/.png images found; put scans in the input folder and run again"
        );
        return Ok(ExitCode::SUCCESS);
    }

    let layout = OutputLayout::new(&cli.output).with_debug(cli.save_debug);
    let summary = match cli.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|err| SchwaerzError::Config(format!("failed to build worker pool: {err}")))?
            .install(|| run_batch(&pipeline, &inputs, &layout)),
        None => run_batch(&pipeline, &inputs, &layout),
    };

    log_summary(&summary);
    Ok(if summary.all_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn log_summary(summary: &BatchSummary) {
    for report in &summary.reports {
        let c = &report.classification;
        info!(
            document = %report.document,
            detections = c.total,
            accepted = c.accepted,
            rejected = c.rejected,
            acceptance_rate = %c.acceptance_rate_display(),
            raw_chars = report.raw_chars,
            cleaned_chars = report.transcript_chars,
            pii = report.pii.len(),
            redacted = report.redacted_regions,
            "document done"
        );
        for entry in &c.rejected_sample {
            info!(
                document = %report.document,
                text = %entry.text,
                confidence = %format!("{:.2}", entry.confidence),
                reason = %entry.reason,
                "rejected"
            );
        }
    }
    for failure in &summary.failures {
        let stage = failure
            .stage
            .map_or_else(|| "unknown".to_owned(), |s| s.to_string());
        warn!(document = %failure.document, stage = %stage, cause = %failure.cause, "document failed");
    }
    info!(
        total = summary.total(),
        succeeded = summary.reports.len(),
        failed = summary.failures.len(),
        "batch summary"
    );
}
