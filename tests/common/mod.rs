#![allow(dead_code)] // Not every test binary uses every helper

pub mod fake_ffmpeg;

use ffbatch::config::TranscodeConfig;
use ffbatch::engine::{BatchProcessor, EncodingOrchestrator, Platform, PresetRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use fake_ffmpeg::FakeFfmpeg;

/// Input and output directories for one test batch
pub struct Workspace {
    pub root: TempDir,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let input = root.path().join("in");
        let output = root.path().join("out");
        fs::create_dir_all(&input).unwrap();
        Self {
            root,
            input,
            output,
        }
    }

    /// Create a fake input video of `bytes` bytes
    pub fn add_video(&self, relative: &str, bytes: usize) -> PathBuf {
        let path = self.input.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, vec![0u8; bytes]).unwrap();
        path
    }

    pub fn config(&self, preset: &str) -> TranscodeConfig {
        TranscodeConfig {
            input_path: self.input.clone(),
            output_dir: self.output.clone(),
            preset: preset.to_string(),
            ..Default::default()
        }
    }
}

/// Batch processor for a VendorGpu host backed by `ffmpeg`
pub fn processor(config: TranscodeConfig, ffmpeg: Arc<FakeFfmpeg>) -> BatchProcessor {
    processor_on(config, ffmpeg, Platform::VendorGpu)
}

pub fn processor_on(
    config: TranscodeConfig,
    ffmpeg: Arc<FakeFfmpeg>,
    platform: Platform,
) -> BatchProcessor {
    let registry = Arc::new(PresetRegistry::new(platform));
    let orchestrator = EncodingOrchestrator::new(ffmpeg, "ffmpeg");
    BatchProcessor::new(config, registry, orchestrator, platform)
}

pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
