// FFmpeg argument construction for every attempt tier

use std::path::Path;

use super::preset::Preset;
use super::types::Platform;

/// Audio bitrate used when audio is re-encoded
pub const AUDIO_BITRATE: &str = "128k";

/// Scale filter used when a preset carries none
pub const NO_SCALE_FILTER: &str = "scale=-1:-1";

/// Software encoder settings standing in for a hardware preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftwareEquivalent {
    pub codec: &'static str,
    pub crf: u32,
    pub speed: &'static str,
}

/// Map a preset's encoder to the software codec used in fallback.
///
/// AV1 deliberately maps to a slow, high-quality H.264 encode instead of
/// software AV1.
pub fn software_equivalent(encoder: &str) -> SoftwareEquivalent {
    match encoder {
        "h264_nvenc" | "h264_videotoolbox" | "libx264" => SoftwareEquivalent {
            codec: "libx264",
            crf: 23,
            speed: "medium",
        },
        "hevc_nvenc" | "hevc_videotoolbox" | "libx265" => SoftwareEquivalent {
            codec: "libx265",
            crf: 26,
            speed: "medium",
        },
        "av1_nvenc" | "libsvtav1" => SoftwareEquivalent {
            codec: "libx264",
            crf: 18,
            speed: "slower",
        },
        _ => SoftwareEquivalent {
            codec: "libx264",
            crf: 23,
            speed: "medium",
        },
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Hardware decode flag for the platform
fn hwaccel_args(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::AppleSilicon => &["-hwaccel", "videotoolbox"],
        Platform::VendorGpu => &["-hwaccel", "auto"],
        Platform::Unknown | Platform::SoftwareOnly => &[],
    }
}

/// Build the full argument list for one encode attempt.
///
/// In hardware mode the preset's own arguments are used when it belongs to
/// `platform` (or to no platform); everything else gets the software
/// equivalent.
pub fn build_arguments(
    input: &Path,
    output: &Path,
    preset: &Preset,
    platform: Platform,
    use_hardware: bool,
    audio_codec: &str,
) -> Vec<String> {
    let mut args: Vec<String> = vec!["-hide_banner".into(), "-loglevel".into(), "warning".into()];

    if use_hardware {
        args.extend(hwaccel_args(platform).iter().map(|s| s.to_string()));
    }

    args.push("-i".into());
    args.push(path_arg(input));

    let native = preset.platform == platform || preset.platform == Platform::Unknown;
    if use_hardware && native {
        args.extend(preset.args.iter().cloned());
    } else {
        args.extend(software_arguments(preset));
    }

    args.extend(audio_arguments(audio_codec));

    args.push("-y".into());
    args.push(path_arg(output));
    args
}

/// Software encoder arguments equivalent to `preset`
pub fn software_arguments(preset: &Preset) -> Vec<String> {
    let sw = software_equivalent(&preset.encoder);
    let mut args = vec![
        "-c:v".to_string(),
        sw.codec.to_string(),
        "-preset".to_string(),
        sw.speed.to_string(),
        "-crf".to_string(),
        sw.crf.to_string(),
        "-vf".to_string(),
        extract_scale_filter(&preset.args),
    ];

    if !preset.bitrate.is_empty() {
        let ceiling = if preset.max_bitrate.is_empty() {
            &preset.bitrate
        } else {
            &preset.max_bitrate
        };
        args.extend([
            "-b:v".to_string(),
            preset.bitrate.clone(),
            "-maxrate".to_string(),
            ceiling.clone(),
            "-bufsize".to_string(),
            ceiling.clone(),
        ]);
    }
    args
}

/// Value following `-vf`, or the no-scaling sentinel
pub fn extract_scale_filter(args: &[String]) -> String {
    args.iter()
        .position(|a| a == "-vf")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| NO_SCALE_FILTER.to_string())
}

pub fn audio_arguments(audio_codec: &str) -> Vec<String> {
    if audio_codec.is_empty() || audio_codec == "copy" {
        vec!["-c:a".into(), "copy".into()]
    } else {
        vec![
            "-c:a".into(),
            audio_codec.to_string(),
            "-b:a".into(),
            AUDIO_BITRATE.into(),
        ]
    }
}

/// Last-resort encode with the most compatible settings
pub fn safe_fallback_arguments(input: &Path, output: &Path) -> Vec<String> {
    let input = path_arg(input);
    let output = path_arg(output);
    [
        "-hide_banner",
        "-loglevel",
        "error",
        "-i",
        input.as_str(),
        "-c:v",
        "libx264",
        "-preset",
        "medium",
        "-crf",
        "23",
        "-c:a",
        "copy",
        "-y",
        output.as_str(),
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Decode the first second of the input and discard it
pub fn probe_arguments(input: &Path) -> Vec<String> {
    let input = path_arg(input);
    [
        "-hide_banner",
        "-loglevel",
        "error",
        "-i",
        input.as_str(),
        "-f",
        "null",
        "-t",
        "1",
        "-",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Render a command line that can be pasted into a POSIX shell
pub fn format_command(program: &str, args: &[String]) -> String {
    let words = std::iter::once(program).chain(args.iter().map(String::as_str));
    match shlex::try_join(words) {
        Ok(line) => line,
        // Only fails on NUL bytes, which cannot be shell-quoted
        Err(_) => std::iter::once(program.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" "),
    }
}
