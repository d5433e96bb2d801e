//! Test doubles for the installer's external collaborators.
//!
//! # Example
//!
//! ```rust,ignore
//! use hpddm_installer::test_support::{MockExecutor, MockFetcher, MockProcessOutput};
//!
//! let mut exec = MockExecutor::new();
//! exec.expect_contains("-c -o", MockProcessOutput::success(""));
//!
//! let mut fetcher = MockFetcher::new();
//! fetcher.serve("https://example.com/a.tar.gz", b"...".to_vec());
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Result};

use crate::sources::fetch::Fetcher;
use crate::util::fs::ensure_dir;
use crate::util::process::{CommandRunner, ProcessBuilder, ProcessOutput};

pub use fixtures::*;

/// Constructors for canned process output.
pub struct MockProcessOutput;

impl MockProcessOutput {
    /// A successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> ProcessOutput {
        ProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failure with the given status code and stderr.
    pub fn failure(status: i32, stderr: impl Into<String>) -> ProcessOutput {
        ProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on the full command string.
    Exact(String),
    /// Match if the command starts with the prefix.
    StartsWith(String),
    /// Match if the command contains the substring.
    Contains(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Any => true,
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    pub pattern: CommandPattern,
    pub output: ProcessOutput,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    pub used: usize,
}

impl CommandExpectation {
    pub fn new(pattern: CommandPattern, output: ProcessOutput) -> Self {
        CommandExpectation {
            pattern,
            output,
            times: None,
            used: 0,
        }
    }

    /// Limit how often this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

/// Records the commands it is asked to run and answers from expectations.
#[derive(Debug, Default)]
pub struct MockExecutor {
    expectations: Vec<CommandExpectation>,
    calls: Vec<String>,
    default_output: Option<ProcessOutput>,
}

impl MockExecutor {
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Expect a command containing `substring`.
    pub fn expect_contains(&mut self, substring: &str, output: ProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation::new(
            CommandPattern::Contains(substring.to_string()),
            output,
        ));
        self
    }

    /// Expect a command starting with `prefix`.
    pub fn expect_prefix(&mut self, prefix: &str, output: ProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation::new(
            CommandPattern::StartsWith(prefix.to_string()),
            output,
        ));
        self
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&mut self, expectation: CommandExpectation) -> &mut Self {
        self.expectations.push(expectation);
        self
    }

    /// Output for commands that match no expectation.
    pub fn set_default(&mut self, output: ProcessOutput) -> &mut Self {
        self.default_output = Some(output);
        self
    }

    /// Every command run so far, as displayed.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Number of recorded commands containing `substring`.
    pub fn count_containing(&self, substring: &str) -> usize {
        self.calls.iter().filter(|c| c.contains(substring)).count()
    }

    /// Verify that every expectation with a fixed count was used exactly that often.
    pub fn verify(&self) -> Result<()> {
        for (i, exp) in self.expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    bail!(
                        "expectation {} was used {} times, expected {}",
                        i,
                        exp.used,
                        expected
                    );
                }
            }
        }
        Ok(())
    }
}

impl CommandRunner for MockExecutor {
    fn run(&mut self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let full_cmd = cmd.display_command();
        self.calls.push(full_cmd.clone());

        for exp in &mut self.expectations {
            if exp.pattern.matches(&full_cmd) && exp.available() {
                exp.used += 1;
                return Ok(exp.output.clone());
            }
        }

        if let Some(ref default) = self.default_output {
            return Ok(default.clone());
        }

        bail!("unexpected command: {}", full_cmd)
    }
}

/// Serves canned bodies by URL and records every request.
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: HashMap<String, Vec<u8>>,
    requests: Vec<String>,
}

impl MockFetcher {
    pub fn new() -> Self {
        MockFetcher::default()
    }

    /// Serve `body` for `url`.
    pub fn serve(&mut self, url: &str, body: Vec<u8>) -> &mut Self {
        self.responses.insert(url.to_string(), body);
        self
    }

    /// Every URL requested so far.
    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    /// Number of requests for `url`.
    pub fn count(&self, url: &str) -> usize {
        self.requests.iter().filter(|r| *r == url).count()
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&mut self, url: &str, dest: &Path) -> Result<()> {
        self.requests.push(url.to_string());

        let Some(body) = self.responses.get(url) else {
            bail!("failed to download {}: HTTP 404 Not Found", url);
        };
        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }
        std::fs::write(dest, body)?;
        Ok(())
    }
}

/// Assertion helpers for testing.
pub mod assertions {
    /// Assert that an error message contains a substring.
    pub fn assert_error_contains<T: std::fmt::Debug, E: std::fmt::Display>(
        result: Result<T, E>,
        substring: &str,
    ) {
        match result {
            Ok(v) => panic!("expected Err containing '{}', got Ok: {:?}", substring, v),
            Err(e) => {
                let msg = e.to_string();
                assert!(
                    msg.contains(substring),
                    "error '{}' does not contain '{}'",
                    msg,
                    substring
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_basic() {
        let mut exec = MockExecutor::new();
        exec.expect_prefix("make", MockProcessOutput::success("a\nb\n"));

        let out = exec.run(&ProcessBuilder::shell("make -f X soname")).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout_lines(), vec!["a", "b"]);
        assert_eq!(exec.calls(), &["make -f X soname".to_string()]);
    }

    #[test]
    fn test_mock_executor_unexpected() {
        let mut exec = MockExecutor::new();
        assert!(exec.run(&ProcessBuilder::new("unknown")).is_err());
    }

    #[test]
    fn test_mock_executor_times() {
        let mut exec = MockExecutor::new();
        exec.expect_pattern(
            CommandExpectation::new(CommandPattern::Any, MockProcessOutput::success("")).times(2),
        );

        exec.run(&ProcessBuilder::new("a")).unwrap();
        assert!(exec.verify().is_err());
        exec.run(&ProcessBuilder::new("b")).unwrap();
        assert!(exec.verify().is_ok());
        assert!(exec.run(&ProcessBuilder::new("c")).is_err());
    }

    #[test]
    fn test_mock_fetcher() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut fetcher = MockFetcher::new();
        fetcher.serve("https://example.com/x", b"body".to_vec());

        let dest = tmp.path().join("sub").join("x");
        fetcher.fetch("https://example.com/x", &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"body");

        assert!(fetcher.fetch("https://example.com/missing", &dest).is_err());
        assert_eq!(fetcher.requests().len(), 2);
        assert_eq!(fetcher.count("https://example.com/x"), 1);
    }
}
