// Input discovery feeding a batch

use crate::common::fake_ffmpeg::FakeFfmpeg;
use crate::common::{Workspace, processor};
use ffbatch::engine::{ErrorKind, find_video_files};
use std::fs;
use std::sync::Arc;

#[test]
fn test_flat_and_recursive_discovery() {
    let ws = Workspace::new();
    ws.add_video("b.MKV", 1);
    ws.add_video("a.mp4", 1);
    ws.add_video("nested/c.webm", 1);
    fs::write(ws.input.join("notes.txt"), b"not a video").unwrap();

    let flat = find_video_files(&ws.input, false).unwrap();
    let names: Vec<_> = flat
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.mp4", "b.MKV"]);

    let all = find_video_files(&ws.input, true).unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|p| p.ends_with("nested/c.webm")));
}

#[test]
fn test_single_file_input() {
    let ws = Workspace::new();
    let video = ws.add_video("only.mov", 1);
    assert_eq!(find_video_files(&video, false).unwrap(), vec![video]);

    let text = ws.input.join("readme.md");
    fs::write(&text, b"#").unwrap();
    assert!(find_video_files(&text, true).unwrap().is_empty());
}

#[test]
fn test_missing_input_is_filesystem_error() {
    let ws = Workspace::new();
    let err = find_video_files(&ws.input.join("nope"), false).unwrap_err();
    assert!(err.is(ErrorKind::FileSystemError));
}

#[test]
fn test_discovered_tree_encodes_end_to_end() {
    let ws = Workspace::new();
    ws.add_video("top.mp4", 10);
    ws.add_video("deep/er/clip.ts", 10);

    let files = find_video_files(&ws.input, true).unwrap();
    let summary = processor(ws.config("720p_av1"), Arc::new(FakeFfmpeg::new()))
        .process_files(&files, None)
        .unwrap();

    assert_eq!(summary.succeeded, 2);
    assert!(ws.output.join("top_720p_av1.mkv").exists());
    assert!(ws.output.join("deep/er/clip_720p_av1.mkv").exists());
}
