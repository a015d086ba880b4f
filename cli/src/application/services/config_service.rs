//! Application service: configuration use-cases.
//!
//! Merges command-line values over the optional config file. Flags win, then
//! file values, then built-in defaults (already folded into the file schema).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::{DeployConfig, HoistConfig, SshConfig};
use crate::domain::params::validate_port;
use crate::domain::{ConnectionParams, Credential, DeployParams, HostKeyPolicy, ParamError};

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<HoistConfig> {
    let path = store.path()?;
    store
        .load()
        .with_context(|| format!("loading {}", path.display()))
}

/// Connection values given on the command line; `None` defers to the file.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub host: String,
    pub user: Option<String>,
    pub port: Option<u32>,
    pub password: Option<String>,
    pub identity: Option<PathBuf>,
    pub passphrase: Option<String>,
    pub host_key_policy: Option<HostKeyPolicy>,
    pub connect_timeout_secs: Option<u64>,
}

/// Deployment values given on the command line; `None` defers to the file.
#[derive(Debug, Clone, Default)]
pub struct DeployOverrides {
    pub domain: String,
    pub email: Option<String>,
    pub repo: Option<String>,
    pub path: Option<String>,
    pub branch: Option<String>,
    pub local_root: Option<PathBuf>,
}

/// Build validated connection parameters.
///
/// Credential precedence: `--identity`, then a password, then the key file
/// named in the config file.
///
/// # Errors
///
/// Returns an error for an empty host, an invalid port, or no credential.
pub fn resolve_connection(ssh: &SshConfig, cli: ConnectionOverrides) -> Result<ConnectionParams> {
    let host = cli.host.trim().to_string();
    if host.is_empty() {
        return Err(ParamError::EmptyHost.into());
    }
    let port = validate_port(cli.port.unwrap_or(ssh.port))?;

    let credential = match (cli.identity, cli.password, ssh.identity.clone()) {
        (Some(path), _, _) | (None, None, Some(path)) => Credential::KeyFile {
            path,
            passphrase: cli.passphrase,
        },
        (None, Some(password), _) => Credential::Password(password),
        (None, None, None) => return Err(ParamError::MissingCredential.into()),
    };

    Ok(ConnectionParams {
        host,
        port,
        user: cli.user.unwrap_or_else(|| ssh.user.clone()),
        credential,
        host_key_policy: cli.host_key_policy.unwrap_or(ssh.host_key_policy),
        connect_timeout: Duration::from_secs(
            cli.connect_timeout_secs.unwrap_or(ssh.connect_timeout_secs),
        ),
    })
}

/// Build validated deployment parameters.
///
/// # Errors
///
/// Returns [`ParamError`] for an invalid domain, email, path or branch.
pub fn resolve_deploy(deploy: &DeployConfig, cli: DeployOverrides) -> Result<DeployParams> {
    let params = DeployParams::new(
        &cli.domain,
        cli.email.as_deref().unwrap_or(&deploy.email),
        cli.repo.as_deref().unwrap_or(&deploy.repo),
        cli.path.as_deref().unwrap_or(&deploy.path),
        cli.branch.as_deref().unwrap_or(&deploy.branch),
        cli.local_root,
    )?;
    Ok(params)
}
