// Batch processing: per-file pipeline, progress and failure aggregation

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::TranscodeConfig;
use crate::stats::{AnalyticsRecorder, BatchSummary, format_duration};

use super::worker::{WorkerMessage, WorkerPool};
use super::{
    AttemptTier, EncodeRequest, EncodingOrchestrator, ErrorKind, FileStatus, Platform, Preset,
    PresetRegistry, TranscodeError, TranscodeOutcome, TranscodeResult, format_command,
    generate_output_path, sanitize_windows_path, validate_file_path,
};

/// One file that failed, with the rendered error
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum BatchError {
    /// The run could not start (e.g. unknown preset)
    #[error(transparent)]
    Setup(#[from] TranscodeError),

    #[error(
        "transcoding completed with errors ({} of {} file(s) failed)",
        .failures.len(),
        .summary.total
    )]
    Failed {
        failures: Vec<FileFailure>,
        summary: BatchSummary,
    },
}

/// Paths and primary command for one input
#[derive(Debug, Clone)]
pub struct PlannedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub command: String,
}

pub struct BatchProcessor {
    config: TranscodeConfig,
    registry: Arc<PresetRegistry>,
    orchestrator: EncodingOrchestrator,
    platform: Platform,
}

impl BatchProcessor {
    pub fn new(
        config: TranscodeConfig,
        registry: Arc<PresetRegistry>,
        orchestrator: EncodingOrchestrator,
        platform: Platform,
    ) -> Self {
        Self {
            config,
            registry,
            orchestrator,
            platform,
        }
    }

    pub fn config(&self) -> &TranscodeConfig {
        &self.config
    }

    fn use_hardware(&self) -> bool {
        !self.config.no_hardware
    }

    /// Output path and first command for `input` without running anything
    pub fn plan_file(&self, input: &Path) -> TranscodeResult<PlannedFile> {
        let preset = self.registry.require(&self.config.preset)?;
        validate_file_path(input)?;

        // Mirror against the path as discovered; the long-path form no
        // longer shares a prefix with the input root
        let output = sanitize_windows_path(&generate_output_path(
            input,
            &self.config.output_dir,
            &self.config.input_path,
            &preset.name,
        ));
        let input = sanitize_windows_path(input);

        let tier = EncodingOrchestrator::plan(self.use_hardware())[0];
        let req = self.request(&input, &output, preset);
        let command = format_command(
            self.orchestrator.ffmpeg(),
            &EncodingOrchestrator::arguments_for(&req, tier),
        );

        Ok(PlannedFile {
            input,
            output,
            command,
        })
    }

    fn request<'a>(
        &'a self,
        input: &'a Path,
        output: &'a Path,
        preset: &'a Preset,
    ) -> EncodeRequest<'a> {
        EncodeRequest {
            input,
            output,
            preset,
            platform: self.platform,
            use_hardware: self.use_hardware(),
            audio_codec: &self.config.audio_codec,
        }
    }

    /// Run the full pipeline for one input file
    pub fn process_file(&self, input: &Path) -> TranscodeOutcome {
        let input_bytes = fs::metadata(input).map(|m| m.len()).unwrap_or(0);
        let outcome = TranscodeOutcome::begin(input.to_path_buf(), &self.config.preset, input_bytes);

        match self.encode_file(input) {
            Ok(FileResult::Encoded {
                output,
                output_bytes,
                tier,
            }) => outcome.succeed(output, output_bytes, tier),
            Ok(FileResult::Skipped {
                output,
                output_bytes,
            }) => outcome.skip(output, output_bytes),
            Err(e) => outcome.fail(e.to_string()),
        }
    }

    fn encode_file(&self, input: &Path) -> TranscodeResult<FileResult> {
        let plan = self.plan_file(input)?;
        let preset = self.registry.require(&self.config.preset)?;
        let name = display_name(&plan.input);

        if !self.config.overwrite {
            if let Ok(existing) = fs::metadata(&plan.output) {
                if self.config.verbose {
                    println!("Skipping {} (output already exists)", plan.input.display());
                }
                tracing::debug!(output = %plan.output.display(), "output exists, skipping");
                return Ok(FileResult::Skipped {
                    output: plan.output,
                    output_bytes: existing.len(),
                });
            }
        }

        if let Some(parent) = plan.output.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                TranscodeError::with_cause(
                    ErrorKind::FileSystemError,
                    "failed to create output directory",
                    e,
                )
            })?;
        }

        if self.config.verbose {
            println!("Probing input file...");
        }
        self.orchestrator.probe(&plan.input)?;

        if self.config.verbose {
            println!(
                "Processing: {} -> {}",
                plan.input.display(),
                plan.output.display()
            );
            println!("Running: {}", plan.command);
        }

        let req = self.request(&plan.input, &plan.output, preset);
        let report = self.orchestrator.encode(&req);
        for (attempt, next) in report.attempts.iter().zip(report.attempts.iter().skip(1)) {
            if !attempt.success {
                println!(
                    "{} encoding failed for {}, trying {} fallback...",
                    capitalize(&attempt.tier.to_string()),
                    name,
                    next.tier
                );
            }
        }

        let tier = report.into_result()?;
        match tier {
            AttemptTier::Software if self.use_hardware() => {
                println!("Successfully encoded {} using software fallback", name)
            }
            AttemptTier::Safe => println!("Successfully encoded {} using safe fallback mode", name),
            _ => {}
        }

        let output_bytes = fs::metadata(&plan.output)
            .map(|m| m.len())
            .map_err(|e| {
                TranscodeError::with_cause(ErrorKind::EncodingFailed, "output file not created", e)
            })?;

        Ok(FileResult::Encoded {
            output: plan.output,
            output_bytes,
            tier,
        })
    }

    /// Print the command each file would run
    pub fn dry_run(&self, files: &[PathBuf]) -> Result<Vec<PlannedFile>, BatchError> {
        self.registry.require(&self.config.preset)?;

        let mut planned = Vec::with_capacity(files.len());
        for file in files {
            match self.plan_file(file) {
                Ok(plan) => {
                    println!("{}", plan.input.display());
                    println!("  -> {}", plan.output.display());
                    println!("  $ {}", plan.command);
                    planned.push(plan);
                }
                Err(e) => println!("{}\n  ! {}", file.display(), e),
            }
        }
        Ok(planned)
    }

    /// Process every file, continuing past failures.
    ///
    /// Returns the summary, or `BatchError::Failed` once all files are done
    /// if any of them failed.
    pub fn process_files(
        &self,
        files: &[PathBuf],
        mut analytics: Option<&mut AnalyticsRecorder>,
    ) -> Result<BatchSummary, BatchError> {
        // Fail before touching any file
        self.registry.require(&self.config.preset)?;

        let total = files.len();
        let mut summary = BatchSummary::new(total);
        summary.primary_tier = EncodingOrchestrator::plan(self.use_hardware())[0];
        let mut failures = Vec::new();

        let mut handle = |outcome: TranscodeOutcome| {
            report_outcome(&outcome);
            summary.record(&outcome);

            let completed = summary.completed();
            println!(
                "Progress: {}/{} files completed ({:.1}%)",
                completed,
                total,
                completed as f64 / total as f64 * 100.0
            );

            if let Some(recorder) = analytics.as_deref_mut() {
                if let Err(e) = recorder.record(&outcome) {
                    tracing::warn!(error = %e, "failed to write analytics row");
                    eprintln!("Warning: failed to write CSV record: {}", e);
                }
            }

            if outcome.status == FileStatus::Error {
                failures.push(FileFailure {
                    path: outcome.input_path.clone(),
                    error: outcome.error.clone().unwrap_or_default(),
                });
            }
        };

        if self.config.workers > 1 && total > 1 {
            let pool = WorkerPool::new(self.config.workers);
            tracing::info!(workers = pool.max_workers(), "processing files in parallel");
            pool.run(
                files,
                |_, path| self.process_file(path),
                |message| match message {
                    WorkerMessage::FileStarted { worker_id, index } => {
                        tracing::debug!(
                            worker_id,
                            file = %files[index].display(),
                            active = pool.active_count(),
                            "worker picked up file"
                        );
                    }
                    WorkerMessage::FileFinished { outcome, .. } => handle(outcome),
                    WorkerMessage::WorkerIdle { worker_id } => {
                        tracing::debug!(worker_id, "worker finished, queue empty");
                    }
                },
            );
        } else {
            for file in files {
                handle(self.process_file(file));
            }
        }

        if failures.is_empty() {
            Ok(summary)
        } else {
            println!("Completed with {} error(s):", failures.len());
            for failure in &failures {
                println!("  - {}: {}", failure.path.display(), failure.error);
            }
            Err(BatchError::Failed { failures, summary })
        }
    }
}

enum FileResult {
    Encoded {
        output: PathBuf,
        output_bytes: u64,
        tier: AttemptTier,
    },
    Skipped {
        output: PathBuf,
        output_bytes: u64,
    },
}

fn report_outcome(outcome: &TranscodeOutcome) {
    match outcome.status {
        FileStatus::Success => {
            let pct = outcome.compression_ratio() * 100.0;
            println!(
                "Completed {} in {} ({:.1}% of original size)",
                outcome.file_name(),
                format_duration(outcome.duration_secs()),
                pct
            );
        }
        FileStatus::Skipped => {
            tracing::info!(file = %outcome.file_name(), "skipped");
        }
        FileStatus::Error => {
            let error = outcome.error.as_deref().unwrap_or("unknown error");
            tracing::error!(file = %outcome.file_name(), %error, "file failed");
            eprintln!("Error processing {}: {}", outcome.file_name(), error);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
