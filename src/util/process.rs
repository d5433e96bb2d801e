//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result};

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Run `script` through `sh -c`.
    ///
    /// Compiler flags arrive from the host build as a single string, so
    /// commands that embed them are handed to the shell as-is.
    pub fn shell(script: impl Into<String>) -> Self {
        ProcessBuilder::new("sh").arg("-c").arg(script.into())
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the working directory.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command and wait for completion.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        cmd.output()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))
    }

    /// Display the command for log and error messages.
    ///
    /// Shell invocations show the script itself.
    pub fn display_command(&self) -> String {
        if self.program == Path::new("sh") && self.args.len() == 2 && self.args[0] == "-c" {
            return self.args[1].clone();
        }
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Exit status and captured output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `-1` when the process was killed by a signal
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Non-empty stdout lines.
    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }
}

impl From<Output> for ProcessOutput {
    fn from(output: Output) -> Self {
        ProcessOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs external processes.
///
/// A non-zero exit is not an error at this level; callers decide what a
/// failure means for their stage. `Err` is reserved for processes that could
/// not be started at all.
pub trait CommandRunner {
    fn run(&mut self, cmd: &ProcessBuilder) -> Result<ProcessOutput>;
}

/// Runs processes on the local system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        tracing::debug!("Running: {}", cmd.display_command());
        let output = ProcessOutput::from(cmd.exec()?);
        if !output.success() {
            // Compiler diagnostics are the only detail a failing stage reports
            let stderr = output.stderr.trim_end();
            if !stderr.is_empty() {
                eprintln!("{}", stderr);
            }
        }
        Ok(output)
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Resolve the program of a command string such as `mpicxx -std=c++11`.
pub fn find_command(command: &str) -> Option<PathBuf> {
    command
        .split_whitespace()
        .next()
        .and_then(find_executable)
}
