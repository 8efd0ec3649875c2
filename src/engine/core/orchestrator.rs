// Tiered encode: hardware, then software, then a safe last resort

use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::error::{ErrorKind, TranscodeError, TranscodeResult};
use super::executor::{CommandExecutor, ExecOutput};
use super::ffmpeg_cmd::{build_arguments, probe_arguments, safe_fallback_arguments};
use super::preset::Preset;
use super::types::{AttemptTier, Platform};

/// Lines of stderr kept in probe failure messages
pub const ERROR_TAIL_LINES: usize = 10;

const HARDWARE_PLAN: &[AttemptTier] = &[
    AttemptTier::Hardware,
    AttemptTier::Software,
    AttemptTier::Safe,
];
const SOFTWARE_PLAN: &[AttemptTier] = &[AttemptTier::Software];

/// Everything needed to encode one file
#[derive(Debug, Clone, Copy)]
pub struct EncodeRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub preset: &'a Preset,
    pub platform: Platform,
    pub use_hardware: bool,
    pub audio_codec: &'a str,
}

/// One invocation of the encoder
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub tier: AttemptTier,
    pub args: Vec<String>,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stderr: String,
}

/// Attempts made for one file, in order
#[derive(Debug, Clone, Default)]
pub struct EncodeReport {
    pub attempts: Vec<AttemptRecord>,
}

impl EncodeReport {
    pub fn tiers(&self) -> Vec<AttemptTier> {
        self.attempts.iter().map(|a| a.tier).collect()
    }

    /// Tier of the successful attempt, if any
    pub fn succeeded_tier(&self) -> Option<AttemptTier> {
        self.attempts.iter().find(|a| a.success).map(|a| a.tier)
    }

    /// Convert into the tier that succeeded or an `EncodingFailed` error
    /// carrying the last attempt's full stderr.
    pub fn into_result(self) -> TranscodeResult<AttemptTier> {
        if let Some(tier) = self.succeeded_tier() {
            return Ok(tier);
        }

        let detail = self
            .attempts
            .last()
            .map(|a| a.stderr.trim_end().to_string())
            .unwrap_or_default();
        let message = match self.attempts.last() {
            Some(last) => format!(
                "all {} encoding attempt(s) failed, last {} attempt exited with {}",
                self.attempts.len(),
                last.tier,
                last.exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "no exit code".to_string())
            ),
            None => "no encoding attempts were made".to_string(),
        };

        Err(if detail.is_empty() {
            TranscodeError::new(ErrorKind::EncodingFailed, message)
        } else {
            TranscodeError::with_cause(ErrorKind::EncodingFailed, message, detail)
        })
    }
}

/// Drives the external encoder through the fallback tiers
#[derive(Clone)]
pub struct EncodingOrchestrator {
    executor: Arc<dyn CommandExecutor>,
    ffmpeg: String,
}

impl EncodingOrchestrator {
    pub fn new(executor: Arc<dyn CommandExecutor>, ffmpeg: impl Into<String>) -> Self {
        Self {
            executor,
            ffmpeg: ffmpeg.into(),
        }
    }

    pub fn ffmpeg(&self) -> &str {
        &self.ffmpeg
    }

    /// Decode one second of the input to catch unreadable files early
    pub fn probe(&self, input: &Path) -> TranscodeResult<()> {
        let output = self
            .executor
            .run(&self.ffmpeg, &probe_arguments(input))
            .map_err(|e| {
                TranscodeError::with_cause(ErrorKind::EncodingFailed, "input file probe failed", e)
            })?;

        if output.success {
            return Ok(());
        }

        tracing::debug!(input = %input.display(), stderr = %output.stderr, "probe failed");
        let detail = output.stderr_tail(ERROR_TAIL_LINES);
        Err(if detail.is_empty() {
            TranscodeError::new(ErrorKind::EncodingFailed, "input file probe failed")
        } else {
            TranscodeError::with_cause(ErrorKind::EncodingFailed, "input file probe failed", detail)
        })
    }

    /// Tiers attempted for a request, in order
    pub fn plan(use_hardware: bool) -> &'static [AttemptTier] {
        if use_hardware { HARDWARE_PLAN } else { SOFTWARE_PLAN }
    }

    /// Arguments for one tier
    pub fn arguments_for(req: &EncodeRequest<'_>, tier: AttemptTier) -> Vec<String> {
        match tier {
            AttemptTier::Hardware => build_arguments(
                req.input,
                req.output,
                req.preset,
                req.platform,
                true,
                req.audio_codec,
            ),
            AttemptTier::Software => build_arguments(
                req.input,
                req.output,
                req.preset,
                req.platform,
                false,
                req.audio_codec,
            ),
            AttemptTier::Safe => safe_fallback_arguments(req.input, req.output),
        }
    }

    /// Run attempts until one succeeds or the plan is exhausted
    pub fn encode(&self, req: &EncodeRequest<'_>) -> EncodeReport {
        let mut report = EncodeReport::default();

        for &tier in Self::plan(req.use_hardware) {
            let args = Self::arguments_for(req, tier);
            tracing::info!(input = %req.input.display(), %tier, "starting encode attempt");

            let output = self.executor.run(&self.ffmpeg, &args).unwrap_or_else(|e| ExecOutput {
                success: false,
                code: None,
                stdout: String::new(),
                stderr: format!("failed to start {}: {}", self.ffmpeg, e),
            });

            let success = output.success;
            report.attempts.push(AttemptRecord {
                tier,
                args,
                success,
                exit_code: output.code,
                stderr: output.stderr,
            });

            if success {
                if tier != AttemptTier::Hardware && req.use_hardware {
                    tracing::warn!(input = %req.input.display(), %tier, "encoded using fallback");
                }
                return report;
            }

            tracing::warn!(
                input = %req.input.display(),
                %tier,
                code = ?output.code,
                "encode attempt failed"
            );
            remove_partial_output(req.output);
        }

        tracing::error!(input = %req.input.display(), "all encode attempts failed");
        report
    }
}

/// Delete whatever a failed attempt left at the output path
fn remove_partial_output(output: &Path) {
    if !output.exists() {
        return;
    }
    match fs::remove_file(output) {
        Ok(()) => tracing::debug!(path = %output.display(), "removed partial output"),
        Err(e) => tracing::warn!(path = %output.display(), error = %e, "failed to remove partial output"),
    }
}
