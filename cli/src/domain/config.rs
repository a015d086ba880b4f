//! Domain types for the optional Hoist configuration file.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::params::{
    DEFAULT_BRANCH, DEFAULT_CONNECT_TIMEOUT, DEFAULT_EMAIL, DEFAULT_PATH, DEFAULT_PORT,
    DEFAULT_REPO, DEFAULT_USER, HostKeyPolicy,
};

/// Top-level configuration read from `~/.hoist/config.yaml`.
///
/// Every field is optional; command-line flags win over file values, which
/// win over built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HoistConfig {
    pub ssh: SshConfig,
    pub deploy: DeployConfig,
}

/// Connection defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SshConfig {
    pub user: String,
    pub port: u32,
    /// Private key used when no password is given.
    pub identity: Option<PathBuf>,
    pub connect_timeout_secs: u64,
    pub host_key_policy: HostKeyPolicy,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            port: u32::from(DEFAULT_PORT),
            identity: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
            host_key_policy: HostKeyPolicy::default(),
        }
    }
}

/// Deployment defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeployConfig {
    pub repo: String,
    pub path: String,
    pub branch: String,
    pub email: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            path: DEFAULT_PATH.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            email: DEFAULT_EMAIL.to_string(),
        }
    }
}
