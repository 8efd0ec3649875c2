// Hardware -> software -> safe attempt ordering as seen by the batch

use crate::common::fake_ffmpeg::{Behavior, FakeFfmpeg};
use crate::common::{Workspace, processor, processor_on};
use ffbatch::engine::{AttemptTier, FileStatus, Platform};
use std::sync::Arc;

fn has(args: &[String], value: &str) -> bool {
    args.iter().any(|a| a == value)
}

#[test]
fn test_hardware_success_is_single_attempt() {
    let ws = Workspace::new();
    let input = ws.add_video("fast.mp4", 100);
    let ffmpeg = Arc::new(FakeFfmpeg::new());

    let outcome = processor(ws.config("1080p_h264"), ffmpeg.clone()).process_file(&input);

    assert_eq!(outcome.status, FileStatus::Success);
    assert_eq!(outcome.tier, Some(AttemptTier::Hardware));
    let calls = ffmpeg.encode_calls_for("fast");
    assert_eq!(calls.len(), 1);
    assert!(has(&calls[0], "h264_nvenc"));
    assert!(has(&calls[0], "-hwaccel"));
}

#[test]
fn test_software_fallback_after_hardware_failure() {
    let ws = Workspace::new();
    let input = ws.add_video("flaky.mp4", 100);
    let ffmpeg = Arc::new(FakeFfmpeg::new().rule("flaky", Behavior::FailAttempts(1)));

    let summary = processor(ws.config("1080p_h265"), ffmpeg.clone())
        .process_files(&[input], None)
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.fallbacks, 1);

    let calls = ffmpeg.encode_calls_for("flaky");
    assert_eq!(calls.len(), 2);
    assert!(has(&calls[0], "hevc_nvenc"));
    assert!(has(&calls[1], "libx265"));
    assert!(!has(&calls[1], "-hwaccel"));
    // Rate control carries over from the preset
    assert!(has(&calls[1], "3M"));
    assert!(has(&calls[1], "scale=1920:1080"));
}

#[test]
fn test_safe_fallback_when_software_also_fails() {
    let ws = Workspace::new();
    let input = ws.add_video("stubborn.mkv", 100);
    let ffmpeg = Arc::new(FakeFfmpeg::new().rule("stubborn", Behavior::FailAttempts(2)));

    let outcome = processor(ws.config("4k_av1"), ffmpeg.clone()).process_file(&input);

    assert_eq!(outcome.status, FileStatus::Success);
    assert_eq!(outcome.tier, Some(AttemptTier::Safe));

    let calls = ffmpeg.encode_calls_for("stubborn");
    assert_eq!(calls.len(), 3);
    assert!(has(&calls[0], "av1_nvenc"));
    // Software AV1 fallback is a slow H.264 encode
    assert!(has(&calls[1], "libx264"));
    assert!(has(&calls[1], "slower"));
    // Safe mode drops scaling and bitrate control entirely
    assert!(has(&calls[2], "libx264"));
    assert!(!has(&calls[2], "-vf"));
    assert!(!has(&calls[2], "-b:v"));
}

#[test]
fn test_exhausted_plan_reports_last_stderr() {
    let ws = Workspace::new();
    let input = ws.add_video("hopeless.mp4", 100);
    let ffmpeg = Arc::new(FakeFfmpeg::new().rule("hopeless", Behavior::AlwaysFail));

    let outcome = processor(ws.config("1080p_h264"), ffmpeg.clone()).process_file(&input);

    assert_eq!(outcome.status, FileStatus::Error);
    let error = outcome.error.unwrap();
    assert!(error.contains("all 3 encoding attempt(s) failed"));
    assert!(error.contains("Conversion failed!"));
    assert_eq!(ffmpeg.encode_calls_for("hopeless").len(), 3);
}

#[test]
fn test_no_hardware_makes_one_software_attempt() {
    let ws = Workspace::new();
    let input = ws.add_video("cpu.mp4", 100);
    let ffmpeg = Arc::new(FakeFfmpeg::new().rule("cpu", Behavior::FailAttempts(1)));

    let mut config = ws.config("1080p_h264");
    config.no_hardware = true;
    let outcome = processor(config, ffmpeg.clone()).process_file(&input);

    assert_eq!(outcome.status, FileStatus::Error);
    let calls = ffmpeg.encode_calls_for("cpu");
    assert_eq!(calls.len(), 1);
    assert!(has(&calls[0], "libx264"));
    assert!(!has(&calls[0], "-hwaccel"));
}

#[test]
fn test_software_only_run_does_not_count_fallbacks() {
    let ws = Workspace::new();
    let input = ws.add_video("cpu.mp4", 100);
    let ffmpeg = Arc::new(FakeFfmpeg::new());

    let mut config = ws.config("1080p_h264");
    config.no_hardware = true;
    let summary = processor(config, ffmpeg)
        .process_files(&[input], None)
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.fallbacks, 0);
}

#[test]
fn test_apple_silicon_uses_videotoolbox() {
    let ws = Workspace::new();
    let input = ws.add_video("mac.mov", 100);
    let ffmpeg = Arc::new(FakeFfmpeg::new());

    let outcome = processor_on(ws.config("1080p_h265"), ffmpeg.clone(), Platform::AppleSilicon)
        .process_file(&input);

    assert_eq!(outcome.status, FileStatus::Success);
    let calls = ffmpeg.encode_calls_for("mac");
    assert!(has(&calls[0], "hevc_videotoolbox"));
    assert!(has(&calls[0], "videotoolbox"));
}
