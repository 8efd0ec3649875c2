use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DefaultsConfig, TranscodeConfig};

#[derive(Parser, Debug)]
#[command(name = "ffbatch")]
#[command(
    version,
    about = "Batch video transcoder with hardware acceleration and automatic fallback",
    long_about = None
)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub transcode: TranscodeArgs,
}

#[derive(Args, Debug, Default, Clone)]
pub struct TranscodeArgs {
    /// Input video file or directory
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Encoding preset (see `ffbatch presets`)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Process directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Overwrite existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Print each step and the ffmpeg commands being run
    #[arg(short, long)]
    pub verbose: bool,

    /// Show what would be processed without encoding
    #[arg(long)]
    pub dry_run: bool,

    /// NVIDIA GPU index
    #[arg(long = "gpu", value_name = "INDEX", allow_negative_numbers = true)]
    pub gpu: Option<i64>,

    /// Disable hardware acceleration and encode in software
    #[arg(long)]
    pub no_gpu: bool,

    /// Audio codec ("copy" keeps the original stream)
    #[arg(long, value_name = "CODEC")]
    pub audio_codec: Option<String>,

    /// Write per-file analytics to this CSV file
    #[arg(long, value_name = "FILE")]
    pub csv_output: Option<PathBuf>,

    /// Files to encode in parallel
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and hardware acceleration availability
    Check,

    /// List available encoding presets
    Presets {
        /// Include the presets of every platform
        #[arg(long)]
        all: bool,

        /// Print presets as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show config status and location, or create default config if missing
    InitConfig,
}

impl TranscodeArgs {
    /// Merge flags over the config file defaults
    pub fn to_config(&self, defaults: &DefaultsConfig) -> TranscodeConfig {
        TranscodeConfig {
            input_path: self.input.clone().unwrap_or_default(),
            output_dir: self.output.clone().unwrap_or_default(),
            preset: self.preset.clone().unwrap_or_else(|| defaults.preset.clone()),
            gpu_index: self.gpu.unwrap_or(defaults.gpu_index),
            audio_codec: self
                .audio_codec
                .clone()
                .unwrap_or_else(|| defaults.audio_codec.clone()),
            verbose: self.verbose,
            recursive: self.recursive,
            overwrite: self.overwrite || defaults.overwrite,
            no_hardware: self.no_gpu,
            dry_run: self.dry_run,
            skip_validation: false,
            workers: self.workers.unwrap_or(defaults.workers),
            csv_output: self.csv_output.clone(),
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
