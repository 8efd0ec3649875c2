// Rendered ffmpeg argument lists for each attempt tier

use ffbatch::engine::{
    AttemptTier, EncodeRequest, EncodingOrchestrator, Platform, PresetRegistry, probe_arguments,
};
use insta::assert_snapshot;
use std::path::Path;

fn render(
    platform: Platform,
    preset: &str,
    use_hardware: bool,
    audio: &str,
    tier: AttemptTier,
) -> String {
    let registry = PresetRegistry::new(platform);
    let req = EncodeRequest {
        input: Path::new("/tmp/input.mp4"),
        output: Path::new("/tmp/output.mkv"),
        preset: registry.get(preset).unwrap(),
        platform,
        use_hardware,
        audio_codec: audio,
    };
    EncodingOrchestrator::arguments_for(&req, tier).join(" ")
}

#[test]
fn snapshot_nvenc_hardware() {
    assert_snapshot!(
        render(Platform::VendorGpu, "1080p_h264", true, "copy", AttemptTier::Hardware),
        @"-hide_banner -loglevel warning -hwaccel auto -i /tmp/input.mp4 -c:v h264_nvenc -preset p7 -crf 23 -b:v 5M -maxrate 8M -bufsize 16M -vf scale=1920:1080 -c:a copy -y /tmp/output.mkv"
    );
}

#[test]
fn snapshot_software_fallback() {
    assert_snapshot!(
        render(Platform::VendorGpu, "1080p_h264", true, "copy", AttemptTier::Software),
        @"-hide_banner -loglevel warning -i /tmp/input.mp4 -c:v libx264 -preset medium -crf 23 -vf scale=1920:1080 -b:v 5M -maxrate 8M -bufsize 8M -c:a copy -y /tmp/output.mkv"
    );
}

#[test]
fn snapshot_videotoolbox_with_audio_reencode() {
    assert_snapshot!(
        render(Platform::AppleSilicon, "1080p_h265", true, "aac", AttemptTier::Hardware),
        @"-hide_banner -loglevel warning -hwaccel videotoolbox -i /tmp/input.mp4 -c:v hevc_videotoolbox -q:v 65 -b:v 3M -maxrate 5M -bufsize 10M -vf scale=1920:1080 -c:a aac -b:a 128k -y /tmp/output.mkv"
    );
}

#[test]
fn snapshot_safe_fallback() {
    assert_snapshot!(
        render(Platform::VendorGpu, "4k_av1", true, "aac", AttemptTier::Safe),
        @"-hide_banner -loglevel error -i /tmp/input.mp4 -c:v libx264 -preset medium -crf 23 -c:a copy -y /tmp/output.mkv"
    );
}

#[test]
fn snapshot_probe() {
    assert_snapshot!(
        probe_arguments(Path::new("/tmp/input.mp4")).join(" "),
        @"-hide_banner -loglevel error -i /tmp/input.mp4 -f null -t 1 -"
    );
}
