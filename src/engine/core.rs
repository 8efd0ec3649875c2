mod error;
mod executor;
mod ffmpeg_cmd;
mod ffmpeg_info;
mod orchestrator;
mod paths;
mod preset;
mod scan;
mod types;

pub use error::{ErrorKind, TranscodeError, TranscodeResult};
pub use executor::{CommandExecutor, ExecOutput, SystemExecutor, tail_lines};
pub use ffmpeg_cmd::{
    AUDIO_BITRATE, NO_SCALE_FILTER, SoftwareEquivalent, audio_arguments, build_arguments,
    extract_scale_filter, format_command, probe_arguments, safe_fallback_arguments,
    software_arguments, software_equivalent,
};
pub use ffmpeg_info::{encoder_listed, parse_gpu_list, parse_version_line};
pub use orchestrator::{
    AttemptRecord, ERROR_TAIL_LINES, EncodeReport, EncodeRequest, EncodingOrchestrator,
};
pub use paths::{
    LONG_PATH_THRESHOLD, MAX_STEM_CHARS, OUTPUT_EXTENSION, extended_length_path,
    generate_output_path, sanitize_filename, sanitize_windows_path, validate_file_path,
};
pub use preset::{DEFAULT_PRESET, Preset, PresetRegistry};
pub use scan::{VIDEO_EXTENSIONS, find_video_files, is_video_file};
pub use types::{AttemptTier, CodecFamily, FileStatus, Platform, TranscodeOutcome};
