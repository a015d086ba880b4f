//! Remote command results and fault policies.

use serde::Serialize;

/// How a non-zero exit status is treated by `execute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Non-zero exit aborts the run.
    Fatal,
    /// Non-zero exit is recorded and the run continues.
    Tolerated,
}

/// Outcome of one remote command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub command: String,
    pub exit_code: u32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    #[must_use]
    pub fn new(command: impl Into<String>, exit_code: u32, stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            command: command.into(),
            exit_code,
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Last non-empty line of stderr, falling back to stdout. Used for
    /// one-line summaries of tolerated failures.
    #[must_use]
    pub fn brief(&self) -> &str {
        [self.stderr.as_str(), self.stdout.as_str()]
            .into_iter()
            .find_map(|text| text.lines().rev().find(|l| !l.trim().is_empty()))
            .map_or("", str::trim)
    }
}
