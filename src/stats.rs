// Batch statistics and per-file analytics rows

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use crate::engine::{AttemptTier, FileStatus, TranscodeOutcome};

/// Header row of the analytics CSV
pub const ANALYTICS_HEADER: [&str; 10] = [
    "filename",
    "start_time",
    "end_time",
    "duration_seconds",
    "size_before_mb",
    "size_after_mb",
    "space_saved_mb",
    "compression_ratio",
    "preset",
    "status",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// Files in the batch
    pub total: usize,

    /// Files encoded this run
    pub succeeded: usize,

    /// Files whose attempts all failed
    pub failed: usize,

    /// Files skipped because the output already existed
    pub skipped: usize,

    /// Encodes that needed a tier after the first one planned
    pub fallbacks: usize,

    /// First tier of the plan; anything later counts as a fallback
    pub primary_tier: AttemptTier,

    /// Input bytes of encoded files
    pub input_bytes: u64,

    /// Output bytes of encoded files
    pub output_bytes: u64,

    pub started: Instant,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            fallbacks: 0,
            primary_tier: AttemptTier::Hardware,
            input_bytes: 0,
            output_bytes: 0,
            started: Instant::now(),
        }
    }

    pub fn completed(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    /// Fold one file's outcome into the totals
    pub fn record(&mut self, outcome: &TranscodeOutcome) {
        match outcome.status {
            FileStatus::Success => {
                self.succeeded += 1;
                self.input_bytes += outcome.input_bytes;
                self.output_bytes += outcome.output_bytes.unwrap_or(0);
                if outcome.tier.is_some_and(|t| t != self.primary_tier) {
                    self.fallbacks += 1;
                }
            }
            FileStatus::Skipped => self.skipped += 1,
            FileStatus::Error => self.failed += 1,
        }
    }

    /// "X saved" or "X larger" for the encoded files
    pub fn format_space_saved(&self) -> String {
        if self.output_bytes <= self.input_bytes {
            format!("{} saved", format_bytes(self.input_bytes - self.output_bytes))
        } else {
            format!("{} larger", format_bytes(self.output_bytes - self.input_bytes))
        }
    }

    pub fn format_elapsed(&self) -> String {
        format_duration(self.started.elapsed().as_secs_f64())
    }
}

const SIZE_UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Binary-prefixed size with two decimals, e.g. "1.50 KB"
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < SIZE_UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, SIZE_UNITS[unit])
}

/// Coarse wall time: "45s", "1m 30s", "1h 1m"
pub fn format_duration(seconds: f64) -> String {
    let whole = seconds.max(0.0) as u64;
    match (whole / 3600, whole % 3600 / 60, whole % 60) {
        (0, 0, s) => format!("{}s", s),
        (0, m, s) => format!("{}m {}s", m, s),
        (h, m, _) => format!("{}h {}m", h, m),
    }
}

fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Quote a CSV field when it contains a delimiter, quote or newline
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Analytics columns for one outcome, in header order
pub fn analytics_fields(outcome: &TranscodeOutcome) -> Vec<String> {
    let size_before = to_mb(outcome.input_bytes);
    let (size_after, saved, ratio) = match (outcome.status, outcome.output_bytes) {
        (FileStatus::Error, _) | (_, None) => (0.0, 0.0, 0.0),
        (_, Some(out)) => {
            let after = to_mb(out);
            let ratio = if size_before > 0.0 { after / size_before } else { 0.0 };
            (after, size_before - after, ratio)
        }
    };

    vec![
        outcome.file_name(),
        outcome.started_at.format(TIMESTAMP_FORMAT).to_string(),
        outcome.finished_at.format(TIMESTAMP_FORMAT).to_string(),
        format!("{:.2}", outcome.duration_secs()),
        format!("{:.2}", size_before),
        format!("{:.2}", size_after),
        format!("{:.2}", saved),
        format!("{:.4}", ratio),
        outcome.preset.clone(),
        outcome.status.analytics_label().to_string(),
    ]
}

/// Writes one CSV row per processed file, flushing after every row so a
/// crash mid-batch keeps the rows written so far.
pub struct AnalyticsRecorder {
    writer: Box<dyn Write + Send>,
    rows: usize,
}

impl AnalyticsRecorder {
    /// Wrap a writer and emit the header row
    pub fn new(writer: impl Write + Send + 'static) -> io::Result<Self> {
        let mut recorder = Self {
            writer: Box::new(writer),
            rows: 0,
        };
        let header: Vec<String> = ANALYTICS_HEADER.iter().map(|h| h.to_string()).collect();
        recorder.write_line(&header)?;
        Ok(recorder)
    }

    /// Create (or truncate) a CSV file at `path`
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create analytics directory: {}", parent.display())
            })?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        Self::new(BufWriter::new(file))
            .with_context(|| format!("Failed to write CSV header: {}", path.display()))
    }

    fn write_line(&mut self, fields: &[String]) -> io::Result<()> {
        writeln!(self.writer, "{}", csv_line(fields))?;
        self.writer.flush()
    }

    pub fn record(&mut self, outcome: &TranscodeOutcome) -> io::Result<()> {
        self.write_line(&analytics_fields(outcome))?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }
}
