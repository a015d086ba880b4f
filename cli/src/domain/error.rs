//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::step::StepId;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Errors that abort a provisioning run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The host could not be reached, or the SSH handshake failed or timed out.
    /// Raised before any step runs.
    #[error("Cannot connect to {target}: {reason}")]
    Connection { target: String, reason: String },

    #[error("Authentication rejected for {user}@{host}")]
    Authentication { user: String, host: String },

    #[error(
        "Host key for {host} does not match known_hosts (offered {fingerprint}).\n\nRemove the stale entry from ~/.ssh/known_hosts if the host was rebuilt."
    )]
    HostKeyRejected { host: String, fingerprint: String },

    /// A fatal-class command exited non-zero.
    #[error("Command failed ({exit_code}) in step '{step}': {command}\nERR: {stderr}\nOUT: {stdout}")]
    FatalStep {
        step: StepId,
        command: String,
        exit_code: u32,
        stdout: String,
        stderr: String,
    },
}

impl ProvisionError {
    /// Short machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "CONNECTION_FAILED",
            Self::Authentication { .. } => "AUTH_REJECTED",
            Self::HostKeyRejected { .. } => "HOST_KEY_REJECTED",
            Self::FatalStep { .. } => "STEP_FAILED",
        }
    }
}

// ── Parameter errors ──────────────────────────────────────────────────────────

/// Errors raised while validating invocation parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("Invalid domain '{0}': expected a hostname such as example.org")]
    InvalidDomain(String),

    #[error("Invalid email '{0}'")]
    InvalidEmail(String),

    #[error("Invalid deploy path '{0}': must be absolute and at least two levels deep (e.g. /opt/app)")]
    InvalidPath(String),

    #[error("Invalid branch name '{0}'")]
    InvalidBranch(String),

    #[error("Host must not be empty")]
    EmptyHost,

    #[error("No credential given. Pass --password, --identity, or set HOIST_PASSWORD.")]
    MissingCredential,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to the optional configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown host key policy '{0}'. Valid values: known-hosts, accept-any")]
    UnknownHostKeyPolicy(String),

    #[error("Invalid port {0}: must be between 1 and 65535")]
    InvalidPort(u32),
}
