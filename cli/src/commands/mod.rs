//! Command implementations

pub mod config;
pub mod plan;
pub mod provision;
pub mod render;
pub mod version;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::config_service::{
    self, ConnectionOverrides, DeployOverrides,
};
use crate::domain::config::SshConfig;
use crate::domain::{ConnectionParams, HostKeyPolicy};

/// How to reach the host.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Host name or IP address
    #[arg(long)]
    pub host: String,

    /// SSH user [default: root]
    #[arg(long)]
    pub user: Option<String>,

    /// SSH port [default: 22]
    #[arg(long, short = 'p')]
    pub port: Option<u32>,

    /// SSH password
    #[arg(long, env = "HOIST_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Private key file
    #[arg(long, short = 'i', value_name = "FILE")]
    pub identity: Option<PathBuf>,

    /// Passphrase for the private key
    #[arg(long, env = "HOIST_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Host key policy: known-hosts or accept-any [default: known-hosts]
    #[arg(long, value_name = "POLICY")]
    pub host_key_policy: Option<HostKeyPolicy>,

    /// Connection timeout [default: 20]
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,
}

impl ConnectionArgs {
    fn into_overrides(self) -> ConnectionOverrides {
        ConnectionOverrides {
            host: self.host,
            user: self.user,
            port: self.port,
            password: self.password,
            identity: self.identity,
            passphrase: self.passphrase,
            host_key_policy: self.host_key_policy,
            connect_timeout_secs: self.connect_timeout,
        }
    }
}

/// What to deploy.
#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// Public domain name, e.g. example.org
    #[arg(long)]
    pub domain: String,

    /// Contact email for certificate registration
    #[arg(long)]
    pub email: Option<String>,

    /// Git repository to deploy
    #[arg(long)]
    pub repo: Option<String>,

    /// Remote deploy directory
    #[arg(long)]
    pub path: Option<String>,

    /// Branch to deploy
    #[arg(long)]
    pub branch: Option<String>,

    /// Local checkout providing build definitions missing on the host
    #[arg(long, value_name = "DIR")]
    pub local_root: Option<PathBuf>,
}

impl DeployArgs {
    fn into_overrides(self) -> DeployOverrides {
        DeployOverrides {
            domain: self.domain,
            email: self.email,
            repo: self.repo,
            path: self.path,
            branch: self.branch,
            local_root: self.local_root,
        }
    }
}

/// Arguments shared by `provision` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    #[command(flatten)]
    pub deploy: DeployArgs,
}

/// Resolve connection parameters, prompting for a password when no
/// credential was given anywhere and a terminal is available.
fn connection_params(
    app: &AppContext,
    ssh: &SshConfig,
    args: ConnectionArgs,
) -> Result<ConnectionParams> {
    let mut overrides = args.into_overrides();
    if overrides.password.is_none()
        && overrides.identity.is_none()
        && ssh.identity.is_none()
    {
        let user = overrides.user.as_deref().unwrap_or(&ssh.user);
        overrides.password =
            app.prompt_password(&format!("Password for {user}@{}", overrides.host))?;
    }
    config_service::resolve_connection(ssh, overrides)
}
