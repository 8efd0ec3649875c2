// Per-file analytics rows written during a batch

use crate::common::Workspace;
use crate::common::fake_ffmpeg::{Behavior, FakeFfmpeg};
use crate::common::processor;
use ffbatch::stats::{ANALYTICS_HEADER, AnalyticsRecorder};
use std::fs;
use std::sync::Arc;

fn read_rows(path: &std::path::Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}

#[test]
fn test_one_row_per_file_in_header_order() {
    let ws = Workspace::new();
    let csv_path = ws.root.path().join("reports/run.csv");
    let files = vec![
        ws.add_video("good.mp4", 2 * 1024 * 1024),
        ws.add_video("bad.mp4", 1024 * 1024),
    ];
    let ffmpeg = Arc::new(
        FakeFfmpeg::new()
            .rule("bad", Behavior::AlwaysFail)
            .output_bytes(512 * 1024),
    );

    let mut recorder = AnalyticsRecorder::create(&csv_path).unwrap();
    let result = processor(ws.config("1080p_h264"), ffmpeg).process_files(&files, Some(&mut recorder));
    assert!(result.is_err());
    assert_eq!(recorder.rows(), 2);
    drop(recorder);

    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], ANALYTICS_HEADER.to_vec());

    let good = &rows[1];
    assert_eq!(good[0], "good.mp4");
    assert_eq!(good[4], "2.00");
    assert_eq!(good[5], "0.50");
    assert_eq!(good[6], "1.50");
    assert_eq!(good[7], "0.2500");
    assert_eq!(good[8], "1080p_h264");
    assert_eq!(good[9], "success");

    let bad = &rows[2];
    assert_eq!(bad[0], "bad.mp4");
    assert_eq!(bad[4], "1.00");
    assert_eq!(bad[5], "0.00");
    assert_eq!(bad[7], "0.0000");
    assert_eq!(bad[9], "error");
}

#[test]
fn test_skipped_file_is_recorded_as_success() {
    let ws = Workspace::new();
    let csv_path = ws.root.path().join("skip.csv");
    let input = ws.add_video("kept.mp4", 1024 * 1024);
    fs::create_dir_all(&ws.output).unwrap();
    fs::write(ws.output.join("kept_1080p_h264.mkv"), vec![0u8; 1024 * 1024]).unwrap();

    let mut recorder = AnalyticsRecorder::create(&csv_path).unwrap();
    processor(ws.config("1080p_h264"), Arc::new(FakeFfmpeg::new()))
        .process_files(&[input], Some(&mut recorder))
        .unwrap();
    drop(recorder);

    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][9], "success");
    assert_eq!(rows[1][7], "1.0000");
}
