// Error taxonomy for the transcoding pipeline

use std::fmt;
use thiserror::Error;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Category of a transcoding failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FfmpegNotFound,
    GpuNotAvailable,
    EncoderNotFound,
    InvalidPreset,
    InvalidFilePath,
    EncodingFailed,
    FileSystemError,
}

impl ErrorKind {
    /// Stable tag used when rendering the error
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FfmpegNotFound => "ffmpeg_not_found",
            Self::GpuNotAvailable => "gpu_not_available",
            Self::EncoderNotFound => "encoder_not_found",
            Self::InvalidPreset => "invalid_preset",
            Self::InvalidFilePath => "invalid_file_path",
            Self::EncodingFailed => "encoding_failed",
            Self::FileSystemError => "file_system_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged error carrying a kind, a message and an optional underlying cause
#[derive(Debug, Error)]
#[error("{kind}: {message}{}", caused_by(.source))]
pub struct TranscodeError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxedCause>,
}

fn caused_by(source: &Option<BoxedCause>) -> String {
    match source {
        Some(cause) => format!(" (caused by: {})", cause),
        None => String::new(),
    }
}

impl TranscodeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_cause<E>(kind: ErrorKind, message: impl Into<String>, cause: E) -> Self
    where
        E: Into<BoxedCause>,
    {
        Self {
            kind,
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check whether this error belongs to the given category
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

/// Convenience alias used throughout the engine
pub type TranscodeResult<T> = Result<T, TranscodeError>;
