use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::{ErrorKind, TranscodeError, TranscodeResult};

/// Video file extensions picked up by discovery
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "3gp", "ts", "mts", "m2ts",
];

/// Check if a path has a video file extension
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Find the video files to process under `input`, sorted by path.
///
/// A file input is returned as-is when its extension is recognised. A
/// directory is listed one level deep, or walked fully when `recursive`.
pub fn find_video_files(input: &Path, recursive: bool) -> TranscodeResult<Vec<PathBuf>> {
    let metadata = fs::metadata(input).map_err(|e| {
        TranscodeError::with_cause(ErrorKind::FileSystemError, "cannot access input path", e)
    })?;

    if !metadata.is_dir() {
        return Ok(if is_video_file(input) {
            vec![input.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut files = if recursive {
        walk_tree(input)?
    } else {
        list_directory(input)?
    };
    files.sort();
    Ok(files)
}

fn list_directory(dir: &Path) -> TranscodeResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        TranscodeError::with_cause(ErrorKind::FileSystemError, "cannot read directory", e)
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            TranscodeError::with_cause(ErrorKind::FileSystemError, "cannot read directory", e)
        })?;
        let path = entry.path();
        if path.is_file() && is_video_file(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

fn walk_tree(root: &Path) -> TranscodeResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    // Symlinked directories are not followed
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            TranscodeError::with_cause(ErrorKind::FileSystemError, "cannot read directory", e)
        })?;
        if entry.file_type().is_file() && is_video_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
