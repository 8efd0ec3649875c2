// Scripted stand-in for the ffmpeg binary

use ffbatch::engine::{CommandExecutor, ExecOutput};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// The one-second decode probe fails
    BrokenInput,
    /// The first `n` encode attempts fail, later ones succeed
    FailAttempts(usize),
    /// Every encode attempt fails
    AlwaysFail,
}

/// Decides each run by the input's file name.
///
/// A successful encode writes `output_bytes` bytes to the last argument;
/// a failed one leaves a partial file behind so cleanup can be checked.
pub struct FakeFfmpeg {
    rules: Vec<(String, Behavior)>,
    output_bytes: usize,
    gpus: Option<String>,
    attempts: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeFfmpeg {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            output_bytes: 100,
            gpus: None,
            attempts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Apply `behavior` to inputs whose name contains `pattern`
    pub fn rule(mut self, pattern: &str, behavior: Behavior) -> Self {
        self.rules.push((pattern.to_string(), behavior));
        self
    }

    pub fn output_bytes(mut self, bytes: usize) -> Self {
        self.output_bytes = bytes;
        self
    }

    /// Answer `nvidia-smi -L` with these device lines instead of failing
    pub fn gpus(mut self, devices: &[&str]) -> Self {
        self.gpus = Some(devices.iter().map(|d| format!("{}\n", d)).collect());
        self
    }

    /// ffmpeg invocations in call order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Encode invocations (probes excluded) whose input contains `pattern`
    pub fn encode_calls_for(&self, pattern: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|args| !is_probe(args))
            .filter(|args| input_of(args).is_some_and(|i| file_name(i).contains(pattern)))
            .collect()
    }

    fn behavior_for(&self, input: &str) -> Option<Behavior> {
        let name = file_name(input);
        self.rules
            .iter()
            .find(|(pattern, _)| name.contains(pattern.as_str()))
            .map(|(_, behavior)| *behavior)
    }
}

/// Rules match the file name so temp directory names never interfere
fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_probe(args: &[String]) -> bool {
    args.windows(2).any(|w| w[0] == "-f" && w[1] == "null")
}

fn input_of(args: &[String]) -> Option<&str> {
    args.windows(2)
        .find(|w| w[0] == "-i")
        .map(|w| w[1].as_str())
}

fn exit(success: bool, stderr: &str) -> ExecOutput {
    ExecOutput {
        success,
        code: Some(if success { 0 } else { 1 }),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

impl CommandExecutor for FakeFfmpeg {
    fn run(&self, program: &str, args: &[String]) -> io::Result<ExecOutput> {
        if program.ends_with("nvidia-smi") {
            return match &self.gpus {
                Some(list) => Ok(ExecOutput {
                    stdout: list.clone(),
                    ..exit(true, "")
                }),
                None => Err(io::Error::new(io::ErrorKind::NotFound, "nvidia-smi not installed")),
            };
        }

        self.calls.lock().unwrap().push(args.to_vec());

        let input = input_of(args).unwrap_or_default().to_string();
        let behavior = self.behavior_for(&input);

        if is_probe(args) {
            return Ok(match behavior {
                Some(Behavior::BrokenInput) => exit(false, "moov atom not found\n"),
                _ => exit(true, ""),
            });
        }

        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let n = attempts.entry(input).or_insert(0);
            *n += 1;
            *n
        };

        let fails = match behavior {
            Some(Behavior::AlwaysFail) => true,
            Some(Behavior::FailAttempts(n)) => attempt <= n,
            Some(Behavior::BrokenInput) | None => false,
        };

        let output = args.last().map(Path::new);
        if let Some(parent) = output.and_then(Path::parent) {
            fs::create_dir_all(parent)?;
        }

        if fails {
            if let Some(out) = output {
                fs::write(out, b"partial")?;
            }
            Ok(exit(false, "Error initializing output stream\nConversion failed!\n"))
        } else {
            if let Some(out) = output {
                fs::write(out, vec![1u8; self.output_bytes])?;
            }
            Ok(exit(true, ""))
        }
    }
}
