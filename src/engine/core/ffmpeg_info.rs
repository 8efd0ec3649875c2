/// First line of `ffmpeg -version` output, e.g. `ffmpeg version 7.1 ...`
pub fn parse_version_line(version_output: &str) -> String {
    version_output
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .unwrap_or("Unknown version")
        .to_string()
}

/// Check a `-encoders` listing for an encoder identifier
pub fn encoder_listed(encoders_output: &str, encoder: &str) -> bool {
    encoders_output
        .lines()
        .any(|line| line.split_whitespace().any(|word| word == encoder))
}

/// Device names from `nvidia-smi -L` output
pub fn parse_gpu_list(smi_output: &str) -> Vec<String> {
    smi_output
        .lines()
        .map(str::trim)
        .filter(|line| line.contains("GPU"))
        .map(str::to_string)
        .collect()
}
