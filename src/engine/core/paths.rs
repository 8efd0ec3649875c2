use std::path::{Path, PathBuf};

use super::error::{ErrorKind, TranscodeError, TranscodeResult};

/// Container extension for every output file
pub const OUTPUT_EXTENSION: &str = "mkv";

/// Longest sanitized stem, leaving room for the preset suffix
pub const MAX_STEM_CHARS: usize = 180;

/// Classic Windows path length ceiling
pub const LONG_PATH_THRESHOLD: usize = 260;

const EXTENDED_PREFIX: &str = r"\\?\";

/// Characters reserved on the most restrictive common filesystem
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Derive `<out>/<rel>/<sanitized stem>_<preset>.mkv` for an input file.
///
/// `input_root` is the path the user passed; when it is a directory the
/// input's subdirectory under it is mirrored below `output_dir`.
pub fn generate_output_path(
    input: &Path,
    output_dir: &Path,
    input_root: &Path,
    preset_name: &str,
) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = format!(
        "{}_{}.{}",
        sanitize_filename(&stem),
        preset_name,
        OUTPUT_EXTENSION
    );

    if input_root.is_dir() {
        let relative = input
            .parent()
            .and_then(|parent| parent.strip_prefix(input_root).ok())
            .filter(|rel| !rel.as_os_str().is_empty());
        if let Some(rel) = relative {
            return output_dir.join(rel).join(file_name);
        }
    }

    output_dir.join(file_name)
}

/// Make a file name safe for every common filesystem. Idempotent.
pub fn sanitize_filename(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !RESERVED_CHARS.contains(c))
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();

    // Each non-overlapping ".." pair becomes one underscore
    let collapsed = stripped.replace("..", "_");

    let truncated: String = collapsed.chars().take(MAX_STEM_CHARS).collect();

    truncated.trim_end_matches(['.', ' ']).to_string()
}

/// Rewrite overlong paths into the extended-length `\\?\` form on Windows.
/// Other platforms have no such limit and get the path back unchanged.
pub fn sanitize_windows_path(path: &Path) -> PathBuf {
    if cfg!(windows) {
        extended_length_path(path)
    } else {
        path.to_path_buf()
    }
}

/// Prefix paths longer than `LONG_PATH_THRESHOLD` with `\\?\`
pub fn extended_length_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    if raw.len() <= LONG_PATH_THRESHOLD || raw.starts_with(EXTENDED_PREFIX) {
        return path.to_path_buf();
    }

    match std::path::absolute(path) {
        Ok(abs) => PathBuf::from(format!("{}{}", EXTENDED_PREFIX, abs.display())),
        Err(_) => path.to_path_buf(),
    }
}

/// Reject file names containing reserved characters. Long paths are allowed.
pub fn validate_file_path(path: &Path) -> TranscodeResult<()> {
    let Some(file_name) = path.file_name() else {
        return Ok(());
    };

    if file_name.to_string_lossy().contains(RESERVED_CHARS) {
        return Err(TranscodeError::new(
            ErrorKind::InvalidFilePath,
            "filename contains problematic character",
        ));
    }

    Ok(())
}
