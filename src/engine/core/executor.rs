// Process execution port used by detection and encoding

use std::io;
use std::process::{Command, Stdio};

/// Captured result of one external process run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    /// Last `n` lines of stderr, used in error messages
    pub fn stderr_tail(&self, n: usize) -> String {
        tail_lines(&self.stderr, n)
    }
}

pub fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() > n {
        lines[lines.len() - n..].join("\n")
    } else {
        text.trim_end().to_string()
    }
}

/// Runs a program with arguments and captures its exit status and output.
///
/// An `Err` means the program could not be started at all; a non-zero exit
/// is reported through `ExecOutput::success`.
pub trait CommandExecutor: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> io::Result<ExecOutput>;
}

/// Executor backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn run(&self, program: &str, args: &[String]) -> io::Result<ExecOutput> {
        tracing::debug!(program, args = %args.join(" "), "spawning process");

        // ffmpeg reads stdin for interactive commands; keep it detached
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let output = child.wait_with_output()?;

        Ok(ExecOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
