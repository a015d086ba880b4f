//! Invocation parameters and their validators.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::{ConfigError, ParamError};

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_EMAIL: &str = "admin@localhost";
pub const DEFAULT_REPO: &str = "https://github.com/cokepoppy/my-twitter.git";
pub const DEFAULT_PATH: &str = "/opt/my-twitter";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

static DOMAIN_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z][a-z0-9-]{0,61}[a-z0-9]$").ok()
});

static BRANCH_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._/-]{0,99}$").ok());

// ── Connection ───────────────────────────────────────────────────────────────

/// How the SSH session authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Password(String),
    KeyFile {
        path: PathBuf,
        passphrase: Option<String>,
    },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password(<redacted>)"),
            Self::KeyFile { path, .. } => f
                .debug_struct("KeyFile")
                .field("path", path)
                .finish_non_exhaustive(),
        }
    }
}

/// What to do with the server's host key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Trust on first use: learn unknown keys, reject changed ones.
    #[default]
    KnownHosts,
    /// Accept any key without checking.
    AcceptAny,
}

impl std::str::FromStr for HostKeyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "known-hosts" => Ok(Self::KnownHosts),
            "accept-any" => Ok(Self::AcceptAny),
            other => Err(ConfigError::UnknownHostKeyPolicy(other.to_string())),
        }
    }
}

/// Everything needed to open the session.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub credential: Credential,
    pub host_key_policy: HostKeyPolicy,
    pub connect_timeout: Duration,
}

impl ConnectionParams {
    /// `user@host:port`, used in messages.
    #[must_use]
    pub fn target(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}

// ── Deployment ───────────────────────────────────────────────────────────────

/// What to deploy and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployParams {
    pub domain: String,
    pub email: String,
    pub repo: String,
    pub path: String,
    pub branch: String,
    /// Local checkout used as the source of build definitions missing remotely.
    pub local_root: Option<PathBuf>,
}

impl DeployParams {
    /// Build validated deployment parameters. Inputs are trimmed; the domain is
    /// lower-cased.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError`] for an invalid domain, email, path or branch.
    pub fn new(
        domain: &str,
        email: &str,
        repo: &str,
        path: &str,
        branch: &str,
        local_root: Option<PathBuf>,
    ) -> Result<Self, ParamError> {
        let domain = validate_domain(domain)?;
        let email = validate_email(email)?;
        let path = validate_deploy_path(path)?;
        let branch = branch.trim();
        if !BRANCH_RE.as_ref().is_some_and(|re| re.is_match(branch)) || branch.contains("..") {
            return Err(ParamError::InvalidBranch(branch.to_string()));
        }
        Ok(Self {
            domain,
            email,
            repo: repo.trim().to_string(),
            path,
            branch: branch.to_string(),
            local_root,
        })
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validate and normalise a domain name.
///
/// # Errors
///
/// Returns [`ParamError::InvalidDomain`] unless the input is a dotted hostname.
pub fn validate_domain(domain: &str) -> Result<String, ParamError> {
    let normalised = domain.trim().trim_end_matches('.').to_lowercase();
    if normalised.len() <= 253 && DOMAIN_RE.as_ref().is_some_and(|re| re.is_match(&normalised)) {
        Ok(normalised)
    } else {
        Err(ParamError::InvalidDomain(domain.to_string()))
    }
}

/// Loose email check: one `@`, non-empty local part, no whitespace.
///
/// # Errors
///
/// Returns [`ParamError::InvalidEmail`] on malformed input.
pub fn validate_email(email: &str) -> Result<String, ParamError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, host))
            if !local.is_empty()
                && !host.is_empty()
                && !host.contains('@')
                && !email.chars().any(char::is_whitespace) =>
        {
            Ok(email.to_string())
        }
        _ => Err(ParamError::InvalidEmail(email.to_string())),
    }
}

/// Validate the remote deploy path.
///
/// The path is recursively deleted when it exists without a repository, so it
/// must be absolute, free of `.`/`..` segments, and at least two levels deep.
///
/// # Errors
///
/// Returns [`ParamError::InvalidPath`] when the path is unsafe.
pub fn validate_deploy_path(path: &str) -> Result<String, ParamError> {
    let trimmed = path.trim().trim_end_matches('/');
    let segments: Vec<&str> = trimmed.split('/').skip(1).collect();
    let ok = trimmed.starts_with('/')
        && segments.len() >= 2
        && segments
            .iter()
            .all(|s| !s.is_empty() && *s != "." && *s != "..");
    if ok {
        Ok(trimmed.to_string())
    } else {
        Err(ParamError::InvalidPath(path.to_string()))
    }
}

/// Validate a port value read from configuration.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPort`] outside `1..=65535`.
pub fn validate_port(port: u32) -> Result<u16, ConfigError> {
    u16::try_from(port)
        .ok()
        .filter(|p| *p != 0)
        .ok_or(ConfigError::InvalidPort(port))
}
