use serde::Serialize;
use std::collections::BTreeMap;

use super::error::{ErrorKind, TranscodeError, TranscodeResult};
use super::types::{CodecFamily, Platform};

/// Default preset when none is configured
pub const DEFAULT_PRESET: &str = "1080p_h264";

/// A named encoding profile bound to one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: String,
    /// Target resolution as `WIDTHxHEIGHT`
    pub resolution: String,
    pub codec: CodecFamily,
    /// FFmpeg encoder identifier (e.g. `h264_nvenc`)
    pub encoder: String,
    pub bitrate: String,
    pub max_bitrate: String,
    pub description: String,
    /// Encoder arguments appended verbatim in hardware mode
    pub args: Vec<String>,
    pub platform: Platform,
}

impl Preset {
    /// Value of the `-vf` argument, if the preset scales
    pub fn scale_filter(&self) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == "-vf")
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// Shape shared by every platform's realization of a canonical preset
struct Shape {
    name: &'static str,
    width: u32,
    height: u32,
    label: &'static str,
    codec: CodecFamily,
    bitrate: &'static str,
    max_bitrate: &'static str,
    bufsize: &'static str,
    crf: u32,
}

#[rustfmt::skip]
const SHAPES: &[Shape] = &[
    Shape { name: "720p_av1", width: 1280, height: 720, label: "720p", codec: CodecFamily::Av1, bitrate: "2M", max_bitrate: "3M", bufsize: "6M", crf: 28 },
    Shape { name: "1080p_av1", width: 1920, height: 1080, label: "1080p", codec: CodecFamily::Av1, bitrate: "4M", max_bitrate: "6M", bufsize: "12M", crf: 26 },
    Shape { name: "720p_h264", width: 1280, height: 720, label: "720p", codec: CodecFamily::H264, bitrate: "3M", max_bitrate: "4M", bufsize: "8M", crf: 23 },
    Shape { name: "1080p_h264", width: 1920, height: 1080, label: "1080p", codec: CodecFamily::H264, bitrate: "5M", max_bitrate: "8M", bufsize: "16M", crf: 23 },
    Shape { name: "1080p_h265", width: 1920, height: 1080, label: "1080p", codec: CodecFamily::H265, bitrate: "3M", max_bitrate: "5M", bufsize: "10M", crf: 26 },
    Shape { name: "4k_av1", width: 3840, height: 2160, label: "4K", codec: CodecFamily::Av1, bitrate: "15M", max_bitrate: "20M", bufsize: "40M", crf: 28 },
    Shape { name: "4k_h265", width: 3840, height: 2160, label: "4K", codec: CodecFamily::H265, bitrate: "20M", max_bitrate: "30M", bufsize: "60M", crf: 26 },
];

impl Shape {
    fn is_4k(&self) -> bool {
        self.height >= 2160
    }

    /// Encoder, quality arguments and description suffix for a platform
    fn realize(&self, platform: Platform) -> (&'static str, Vec<String>, String) {
        let crf = self.crf.to_string();
        match (platform, self.codec) {
            (Platform::AppleSilicon, CodecFamily::Av1) | (Platform::SoftwareOnly, CodecFamily::Av1) => {
                let speed = if self.is_4k() { "5" } else { "6" };
                let suffix = if platform == Platform::AppleSilicon {
                    "(software, optimized for Apple Silicon)"
                } else {
                    "with SVT-AV1 (software)"
                };
                ("libsvtav1", args(&["-preset", speed, "-crf", crf.as_str()]), suffix.to_string())
            }
            (Platform::AppleSilicon, codec) => {
                let encoder = if codec == CodecFamily::H264 {
                    "h264_videotoolbox"
                } else {
                    "hevc_videotoolbox"
                };
                let quality = if self.is_4k() { "60" } else { "65" };
                (encoder, args(&["-q:v", quality]), "with VideoToolbox".to_string())
            }
            (Platform::SoftwareOnly, codec) => {
                let encoder = if codec == CodecFamily::H264 { "libx264" } else { "libx265" };
                (
                    encoder,
                    args(&["-preset", "medium", "-crf", crf.as_str()]),
                    format!("with {} (software)", encoder),
                )
            }
            (_, codec) => {
                let encoder = match codec {
                    CodecFamily::H264 => "h264_nvenc",
                    CodecFamily::H265 => "hevc_nvenc",
                    CodecFamily::Av1 => "av1_nvenc",
                };
                (encoder, args(&["-preset", "p7", "-crf", crf.as_str()]), "with NVENC".to_string())
            }
        }
    }

    fn build(&self, platform: Platform) -> Preset {
        let (encoder, quality_args, suffix) = self.realize(platform);

        let scale = format!("scale={}:{}", self.width, self.height);
        let mut preset_args = args(&["-c:v", encoder]);
        preset_args.extend(quality_args);
        preset_args.extend(args(&[
            "-b:v",
            self.bitrate,
            "-maxrate",
            self.max_bitrate,
            "-bufsize",
            self.bufsize,
            "-vf",
            scale.as_str(),
        ]));

        Preset {
            name: self.name.to_string(),
            resolution: format!("{}x{}", self.width, self.height),
            codec: self.codec,
            encoder: encoder.to_string(),
            bitrate: self.bitrate.to_string(),
            max_bitrate: self.max_bitrate.to_string(),
            description: format!("{} {} encoding {}", self.label, self.codec, suffix),
            args: preset_args,
            platform,
        }
    }
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Immutable catalog of presets, partitioned by platform, with a view
/// resolved for the detected platform.
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    catalog: Vec<Preset>,
    resolved: BTreeMap<String, Preset>,
    resolved_platform: Platform,
}

impl PresetRegistry {
    /// Build the catalog and resolve it for `detected`.
    ///
    /// Apple Silicon uses the VideoToolbox set; every other platform
    /// resolves to the NVENC set.
    pub fn new(detected: Platform) -> Self {
        let catalog: Vec<Preset> = Platform::CONCRETE
            .iter()
            .flat_map(|&platform| SHAPES.iter().map(move |shape| shape.build(platform)))
            .collect();

        let resolved_platform = match detected {
            Platform::AppleSilicon => Platform::AppleSilicon,
            _ => Platform::VendorGpu,
        };

        let resolved = catalog
            .iter()
            .filter(|p| p.platform == resolved_platform)
            .map(|p| (p.name.clone(), p.clone()))
            .collect();

        Self {
            catalog,
            resolved,
            resolved_platform,
        }
    }

    /// Platform whose presets back the resolved view
    pub fn resolved_platform(&self) -> Platform {
        self.resolved_platform
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.resolved.get(name)
    }

    /// Look up a preset, failing with `InvalidPreset` when it does not exist
    pub fn require(&self, name: &str) -> TranscodeResult<&Preset> {
        self.get(name).ok_or_else(|| {
            TranscodeError::new(ErrorKind::InvalidPreset, format!("preset {} not found", name))
        })
    }

    pub fn is_valid_preset(&self, name: &str) -> bool {
        self.resolved.contains_key(name)
    }

    /// Sorted names of the resolved presets
    pub fn available_presets(&self) -> Vec<String> {
        self.resolved.keys().cloned().collect()
    }

    /// Every preset bound to `platform`, in catalog order
    pub fn presets_for_platform(&self, platform: Platform) -> Vec<&Preset> {
        self.catalog
            .iter()
            .filter(|p| p.platform == platform)
            .collect()
    }

    pub fn resolved(&self) -> impl Iterator<Item = &Preset> {
        self.resolved.values()
    }
}
