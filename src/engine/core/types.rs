use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Hardware-acceleration family the process runs on.
///
/// `Unknown` also marks presets that are not bound to any platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Unknown,
    VendorGpu,
    AppleSilicon,
    SoftwareOnly,
}

impl Platform {
    /// Platforms that own a concrete preset set
    pub const CONCRETE: [Platform; 3] = [
        Platform::VendorGpu,
        Platform::AppleSilicon,
        Platform::SoftwareOnly,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::VendorGpu => "NVIDIA GPU",
            Self::AppleSilicon => "Apple Silicon",
            Self::SoftwareOnly => "Software only",
        }
    }

    pub fn is_hardware(&self) -> bool {
        matches!(self, Self::VendorGpu | Self::AppleSilicon)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Logical codec family of a preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecFamily {
    H264,
    H265,
    Av1,
}

impl CodecFamily {
    pub fn label(&self) -> &'static str {
        match self {
            Self::H264 => "H.264",
            Self::H265 => "H.265",
            Self::Av1 => "AV1",
        }
    }
}

impl fmt::Display for CodecFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stage of the per-file fallback sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptTier {
    Hardware,
    Software,
    Safe,
}

impl fmt::Display for AttemptTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Hardware => "hardware",
            Self::Software => "software",
            Self::Safe => "safe",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    Success,
    Error,
    Skipped,
}

impl FileStatus {
    /// Value written to the analytics `status` column
    pub fn analytics_label(&self) -> &'static str {
        match self {
            // Skipped files already have a valid output
            Self::Success | Self::Skipped => "success",
            Self::Error => "error",
        }
    }
}

/// Record of processing a single input file
#[derive(Debug, Clone)]
pub struct TranscodeOutcome {
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub preset: String,
    pub status: FileStatus,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub input_bytes: u64,
    pub output_bytes: Option<u64>,
    pub tier: Option<AttemptTier>,
    pub error: Option<String>,
}

impl TranscodeOutcome {
    /// Start a new outcome record; finalized by `succeed`, `skip` or `fail`
    pub fn begin(input_path: PathBuf, preset: &str, input_bytes: u64) -> Self {
        let now = Local::now();
        Self {
            input_path,
            output_path: None,
            preset: preset.to_string(),
            status: FileStatus::Error,
            started_at: now,
            finished_at: now,
            input_bytes,
            output_bytes: None,
            tier: None,
            error: None,
        }
    }

    pub fn succeed(mut self, output_path: PathBuf, output_bytes: u64, tier: AttemptTier) -> Self {
        self.status = FileStatus::Success;
        self.output_path = Some(output_path);
        self.output_bytes = Some(output_bytes);
        self.tier = Some(tier);
        self.finished_at = Local::now();
        self
    }

    pub fn skip(mut self, output_path: PathBuf, output_bytes: u64) -> Self {
        self.status = FileStatus::Skipped;
        self.output_path = Some(output_path);
        self.output_bytes = Some(output_bytes);
        self.finished_at = Local::now();
        self
    }

    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = FileStatus::Error;
        self.error = Some(error.into());
        self.finished_at = Local::now();
        self
    }

    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Bytes saved by the transcode, negative when the output grew
    pub fn space_saved_bytes(&self) -> i64 {
        self.input_bytes as i64 - self.output_bytes.unwrap_or(0) as i64
    }

    /// Output size divided by input size
    pub fn compression_ratio(&self) -> f64 {
        match self.output_bytes {
            Some(out) if self.input_bytes > 0 => out as f64 / self.input_bytes as f64,
            _ => 0.0,
        }
    }

    pub fn file_name(&self) -> String {
        self.input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input_path.display().to_string())
    }
}
