//! Platform detection and hardware encoder availability

use std::sync::{Arc, OnceLock};

use crate::engine::core::{
    CommandExecutor, ErrorKind, Platform, TranscodeError, TranscodeResult, encoder_listed,
    parse_gpu_list, parse_version_line,
};

/// VideoToolbox encoders that must be present on Apple Silicon
pub const VIDEOTOOLBOX_ENCODERS: &[&str] = &["h264_videotoolbox", "hevc_videotoolbox"];

/// Encoders reported by the `check` command for a platform
pub fn platform_encoders(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::AppleSilicon => &["h264_videotoolbox", "hevc_videotoolbox", "libsvtav1"],
        Platform::SoftwareOnly => &["libx264", "libx265", "libsvtav1"],
        Platform::VendorGpu | Platform::Unknown => &["h264_nvenc", "hevc_nvenc", "av1_nvenc"],
    }
}

/// Platform implied by an OS/architecture pair
pub fn detect_platform_for(os: &str, arch: &str) -> Platform {
    if os == "macos" && arch == "aarch64" {
        Platform::AppleSilicon
    } else {
        Platform::Unknown
    }
}

/// Platform of the running process, before any GPU probe
pub fn detect_platform() -> Platform {
    detect_platform_for(std::env::consts::OS, std::env::consts::ARCH)
}

/// Result of a GPU probe.
///
/// `platform` is what the caller should record from now on; a failed vendor
/// GPU probe downgrades to `SoftwareOnly`.
#[derive(Debug)]
pub struct GpuCheck {
    pub platform: Platform,
    pub devices: Vec<String>,
    pub result: TranscodeResult<()>,
}

impl GpuCheck {
    fn ok(platform: Platform, devices: Vec<String>) -> Self {
        Self {
            platform,
            devices,
            result: Ok(()),
        }
    }

    fn failed(platform: Platform, error: TranscodeError) -> Self {
        Self {
            platform,
            devices: Vec::new(),
            result: Err(error),
        }
    }
}

/// Probes the host through an executor so tests can script responses
pub struct PlatformDetector {
    executor: Arc<dyn CommandExecutor>,
    ffmpeg: String,
    nvidia_smi: String,
    /// Cache for the output of `ffmpeg -encoders`
    encoders_output: OnceLock<String>,
}

impl PlatformDetector {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self::with_tools(executor, "ffmpeg", "nvidia-smi")
    }

    pub fn with_tools(
        executor: Arc<dyn CommandExecutor>,
        ffmpeg: impl Into<String>,
        nvidia_smi: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            ffmpeg: ffmpeg.into(),
            nvidia_smi: nvidia_smi.into(),
            encoders_output: OnceLock::new(),
        }
    }

    /// Verify ffmpeg runs and return its version banner
    pub fn check_ffmpeg_availability(&self, platform: Platform) -> TranscodeResult<String> {
        let hint = if platform == Platform::AppleSilicon {
            "FFmpeg not found. Please install FFmpeg with VideoToolbox support (brew install ffmpeg)"
        } else {
            "FFmpeg not found. Please install FFmpeg with NVIDIA support"
        };

        match self.executor.run(&self.ffmpeg, &["-version".to_string()]) {
            Ok(out) if out.success => Ok(parse_version_line(&out.stdout)),
            Ok(out) => Err(TranscodeError::with_cause(
                ErrorKind::FfmpegNotFound,
                hint,
                format!("{} -version exited with {:?}", self.ffmpeg, out.code),
            )),
            Err(e) => Err(TranscodeError::with_cause(ErrorKind::FfmpegNotFound, hint, e)),
        }
    }

    fn encoders_listing(&self) -> TranscodeResult<&str> {
        if let Some(cached) = self.encoders_output.get() {
            return Ok(cached.as_str());
        }

        let args = ["-hide_banner".to_string(), "-encoders".to_string()];
        let output = match self.executor.run(&self.ffmpeg, &args) {
            Ok(out) if out.success => out.stdout,
            Ok(out) => {
                return Err(TranscodeError::with_cause(
                    ErrorKind::EncoderNotFound,
                    "failed to check encoders",
                    out.stderr_tail(5),
                ));
            }
            Err(e) => {
                return Err(TranscodeError::with_cause(
                    ErrorKind::EncoderNotFound,
                    "failed to check encoders",
                    e,
                ));
            }
        };

        Ok(self.encoders_output.get_or_init(|| output).as_str())
    }

    /// Whether ffmpeg lists `encoder`
    pub fn check_encoder_availability(&self, encoder: &str) -> TranscodeResult<bool> {
        Ok(encoder_listed(self.encoders_listing()?, encoder))
    }

    /// Probe for usable hardware acceleration on `current`
    pub fn check_gpu_availability(
        &self,
        current: Platform,
        gpu_index: usize,
        verbose: bool,
    ) -> GpuCheck {
        match current {
            Platform::AppleSilicon => self.check_videotoolbox(verbose),
            _ => self.check_nvidia(current, gpu_index),
        }
    }

    /// Platform to render commands for when nothing will be encoded.
    ///
    /// Runs the same GPU check as a real run so the planned commands match,
    /// but a failed check only warns and yields the downgraded platform.
    pub fn planning_platform(
        &self,
        detected: Platform,
        gpu_index: usize,
        no_hardware: bool,
    ) -> Platform {
        if no_hardware {
            return detected;
        }

        let check = self.check_gpu_availability(detected, gpu_index, false);
        if let Err(e) = &check.result {
            tracing::warn!(error = %e, platform = %check.platform, "hardware check failed");
        }
        check.platform
    }

    fn check_videotoolbox(&self, verbose: bool) -> GpuCheck {
        for encoder in VIDEOTOOLBOX_ENCODERS {
            match self.check_encoder_availability(encoder) {
                Ok(true) => {}
                Ok(false) => {
                    return GpuCheck::failed(
                        Platform::AppleSilicon,
                        TranscodeError::new(
                            ErrorKind::GpuNotAvailable,
                            "VideoToolbox encoders not available. Please ensure FFmpeg is built with VideoToolbox support",
                        ),
                    );
                }
                Err(e) => {
                    return GpuCheck::failed(
                        Platform::AppleSilicon,
                        TranscodeError::with_cause(
                            ErrorKind::GpuNotAvailable,
                            "Failed to check VideoToolbox encoder availability",
                            e,
                        ),
                    );
                }
            }
        }

        if verbose {
            self.log_apple_hardware();
        }

        GpuCheck::ok(Platform::AppleSilicon, Vec::new())
    }

    /// Best-effort hardware summary; never affects the check result
    fn log_apple_hardware(&self) {
        let args = ["SPHardwareDataType".to_string()];
        match self.executor.run("system_profiler", &args) {
            Ok(out) if out.success => {
                for line in out.stdout.lines().map(str::trim) {
                    if line.starts_with("Chip") || line.starts_with("Model Name") {
                        tracing::info!("{}", line);
                    }
                }
            }
            Ok(_) | Err(_) => tracing::debug!("system_profiler unavailable"),
        }
    }

    fn check_nvidia(&self, current: Platform, gpu_index: usize) -> GpuCheck {
        let output = match self.executor.run(&self.nvidia_smi, &["-L".to_string()]) {
            Ok(out) if out.success => out,
            Ok(out) => {
                tracing::debug!(code = ?out.code, stderr = %out.stderr, "nvidia-smi failed");
                return Self::no_nvidia_driver(format!("nvidia-smi exited with {:?}", out.code));
            }
            Err(e) => return Self::no_nvidia_driver(e.to_string()),
        };

        let devices = parse_gpu_list(&output.stdout);
        if devices.is_empty() {
            return GpuCheck::failed(
                Platform::SoftwareOnly,
                TranscodeError::new(ErrorKind::GpuNotAvailable, "no NVIDIA GPUs found"),
            );
        }

        if gpu_index >= devices.len() {
            return GpuCheck::failed(
                current,
                TranscodeError::new(
                    ErrorKind::GpuNotAvailable,
                    format!(
                        "GPU index {} not available ({} GPU(s) found)",
                        gpu_index,
                        devices.len()
                    ),
                ),
            );
        }

        tracing::debug!(gpu = %devices[gpu_index], "using NVIDIA GPU");
        GpuCheck::ok(Platform::VendorGpu, devices)
    }

    fn no_nvidia_driver(cause: String) -> GpuCheck {
        GpuCheck::failed(
            Platform::SoftwareOnly,
            TranscodeError::with_cause(
                ErrorKind::GpuNotAvailable,
                "NVIDIA GPU not detected. Please ensure NVIDIA drivers are installed",
                cause,
            ),
        )
    }
}
