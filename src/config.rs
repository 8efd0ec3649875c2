// Persistent defaults and the per-run transcoding contract

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::{DEFAULT_PRESET, ErrorKind, TranscodeError, TranscodeResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Preset used when `--preset` is not given
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Audio handling: "copy" or an encoder name
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// NVIDIA device index
    #[serde(default)]
    pub gpu_index: i64,

    /// Files encoded in parallel (1 = sequential)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Whether to overwrite existing output files
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_ffmpeg_bin")]
    pub ffmpeg_bin: String,

    #[serde(default = "default_nvidia_smi_bin")]
    pub nvidia_smi_bin: String,
}

fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}

fn default_audio_codec() -> String {
    "copy".to_string()
}

fn default_workers() -> usize {
    1
}

fn default_ffmpeg_bin() -> String {
    "ffmpeg".to_string()
}

fn default_nvidia_smi_bin() -> String {
    "nvidia-smi".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            audio_codec: default_audio_codec(),
            gpu_index: 0,
            workers: default_workers(),
            overwrite: false,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: default_ffmpeg_bin(),
            nvidia_smi_bin: default_nvidia_smi_bin(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("ffbatch")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("ffbatch")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk, falling back to built-in defaults when missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Check if config file exists
    pub fn exists() -> bool {
        Self::config_path().map(|p| p.exists()).unwrap_or(false)
    }
}

/// Settings for one transcoding run
#[derive(Debug, Clone)]
pub struct TranscodeConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub preset: String,
    pub gpu_index: i64,
    pub audio_codec: String,
    pub verbose: bool,
    pub recursive: bool,
    pub overwrite: bool,
    pub no_hardware: bool,
    pub dry_run: bool,
    /// Only set for capability checks, where no paths are involved
    pub skip_validation: bool,
    pub workers: usize,
    pub csv_output: Option<PathBuf>,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            output_dir: PathBuf::new(),
            preset: default_preset(),
            gpu_index: 0,
            audio_codec: default_audio_codec(),
            verbose: false,
            recursive: false,
            overwrite: false,
            no_hardware: false,
            dry_run: false,
            skip_validation: false,
            workers: default_workers(),
            csv_output: None,
        }
    }
}

impl TranscodeConfig {
    /// Check required paths and coerce out-of-range values
    pub fn validate(&mut self) -> TranscodeResult<()> {
        if !self.skip_validation {
            if self.input_path.as_os_str().is_empty() {
                return Err(TranscodeError::new(
                    ErrorKind::InvalidFilePath,
                    "input path is required",
                ));
            }
            if self.output_dir.as_os_str().is_empty() {
                return Err(TranscodeError::new(
                    ErrorKind::InvalidFilePath,
                    "output directory is required",
                ));
            }
        }

        self.gpu_index = self.gpu_index.max(0);
        if self.audio_codec.trim().is_empty() {
            self.audio_codec = default_audio_codec();
        }
        self.workers = self.workers.max(1);

        Ok(())
    }

    /// GPU index as a device slot
    pub fn gpu_device(&self) -> usize {
        usize::try_from(self.gpu_index).unwrap_or(0)
    }
}
