//! SSH transport: implements `ShellExecutor` and `FileTransfer` over russh.
//!
//! One session per run. Every command gets its own exec channel; uploads
//! stream the content over that channel's stdin so it never appears on a
//! command line.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::{ChannelMsg, Disconnect};
use russh_keys::key::PublicKey;

use crate::application::ports::{FileTransfer, ShellExecutor};
use crate::domain::shell as cmd;
use crate::domain::{CommandResult, ConnectionParams, Credential, HostKeyPolicy, ProvisionError};

/// Exit code recorded when the remote side closes without an exit status.
const NO_EXIT_STATUS: u32 = 255;

/// Authenticated session to one host.
pub struct SshSession {
    handle: Handle<HostKeyCheck>,
    target: String,
}

impl SshSession {
    /// Open and authenticate a session, bounded by the connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Connection`] on network failure or timeout,
    /// [`ProvisionError::HostKeyRejected`] when the key differs from
    /// `known_hosts`, and [`ProvisionError::Authentication`] when the server
    /// refuses the credential.
    pub async fn connect(params: &ConnectionParams) -> Result<Self> {
        let target = params.target();
        tracing::info!(%target, policy = ?params.host_key_policy, "connecting");
        match tokio::time::timeout(params.connect_timeout, Self::establish(params)).await {
            Ok(session) => session,
            Err(_) => Err(ProvisionError::Connection {
                target,
                reason: format!("timed out after {}s", params.connect_timeout.as_secs()),
            }
            .into()),
        }
    }

    async fn establish(params: &ConnectionParams) -> Result<Self> {
        let target = params.target();
        let rejected = Arc::new(Mutex::new(None));
        let handler = HostKeyCheck {
            host: params.host.clone(),
            port: params.port,
            policy: params.host_key_policy,
            rejected: Arc::clone(&rejected),
        };
        let config = Arc::new(client::Config::default());

        let mut handle =
            match client::connect(config, (params.host.as_str(), params.port), handler).await {
                Ok(handle) => handle,
                Err(e) => {
                    let offered = rejected.lock().ok().and_then(|slot| slot.clone());
                    return Err(match offered {
                        Some(fingerprint) => ProvisionError::HostKeyRejected {
                            host: params.host.clone(),
                            fingerprint,
                        },
                        None => ProvisionError::Connection {
                            target,
                            reason: e.to_string(),
                        },
                    }
                    .into());
                }
            };

        let accepted = match &params.credential {
            Credential::Password(password) => {
                handle.authenticate_password(&params.user, password).await
            }
            Credential::KeyFile { path, passphrase } => {
                let key = russh_keys::load_secret_key(path, passphrase.as_deref())
                    .with_context(|| format!("cannot load private key {}", path.display()))?;
                handle.authenticate_publickey(&params.user, Arc::new(key)).await
            }
        }
        .map_err(|e| ProvisionError::Connection {
            target: target.clone(),
            reason: e.to_string(),
        })?;

        if !accepted {
            return Err(ProvisionError::Authentication {
                user: params.user.clone(),
                host: params.host.clone(),
            }
            .into());
        }
        tracing::info!(%target, "authenticated");
        Ok(Self { handle, target })
    }

    /// Disconnect cleanly.
    ///
    /// # Errors
    ///
    /// Returns an error if the disconnect message cannot be sent.
    pub async fn close(self) -> Result<()> {
        tracing::debug!(target = %self.target, "closing session");
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
            .with_context(|| format!("closing session to {}", self.target))
    }

    /// Run `command` with `input` on stdin. Stdin is always closed, so a
    /// command that reads it sees end-of-file instead of waiting forever.
    async fn run(&self, command: &str, input: &[u8]) -> Result<CommandResult> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .with_context(|| format!("opening channel to {}", self.target))?;
        channel.exec(true, command).await.context("sending exec request")?;
        if !input.is_empty() {
            channel.data(input).await.context("streaming stdin")?;
        }
        channel.eof().await.context("closing stdin")?;

        let mut captured = Captured::default();
        while let Some(msg) = channel.wait().await {
            captured.push(&msg);
        }
        Ok(captured.finish(command))
    }
}

/// Output accumulated from one exec channel.
#[derive(Debug, Default)]
struct Captured {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_status: Option<u32>,
}

impl Captured {
    fn push(&mut self, msg: &ChannelMsg) {
        match msg {
            ChannelMsg::Data { data } => self.stdout.extend_from_slice(data),
            ChannelMsg::ExtendedData { data, ext: 1 } => self.stderr.extend_from_slice(data),
            ChannelMsg::ExitStatus { exit_status } => self.exit_status = Some(*exit_status),
            _ => {}
        }
    }

    fn finish(self, command: &str) -> CommandResult {
        let code = self.exit_status.unwrap_or_else(|| {
            tracing::debug!(command, "channel closed without exit status");
            NO_EXIT_STATUS
        });
        CommandResult::new(command, code, &self.stdout, &self.stderr)
    }
}

fn ensure_success(result: &CommandResult) -> Result<()> {
    if !result.success() {
        bail!(
            "`{}` exited {}: {}",
            result.command,
            result.exit_code,
            result.brief()
        );
    }
    Ok(())
}

impl ShellExecutor for SshSession {
    async fn exec(&self, command: &str) -> Result<CommandResult> {
        self.run(command, &[]).await
    }

    async fn exec_with_stdin(&self, command: &str, input: &[u8]) -> Result<CommandResult> {
        self.run(command, input).await
    }
}

impl FileTransfer for SshSession {
    async fn upload(&self, remote_path: &str, content: &[u8]) -> Result<()> {
        ensure_success(&self.exec_with_stdin(&cmd::write_stdin_to(remote_path), content).await?)
    }

    async fn set_mode(&self, remote_path: &str, mode: u32) -> Result<()> {
        ensure_success(&self.exec(&cmd::chmod(mode, remote_path)).await?)
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        ensure_success(&self.exec(&cmd::rename(from, to)).await?)
    }

    async fn remove(&self, remote_path: &str) -> Result<()> {
        ensure_success(&self.exec(&cmd::remove_file(remote_path)).await?)
    }
}

/// Client handler that applies the host key policy.
struct HostKeyCheck {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
    /// Fingerprint of a rejected key, read back after `connect` fails.
    rejected: Arc<Mutex<Option<String>>>,
}

#[async_trait]
impl client::Handler for HostKeyCheck {
    type Error = russh::Error;

    async fn check_server_key(&mut self, key: &PublicKey) -> Result<bool, Self::Error> {
        let fingerprint = key.fingerprint();
        match self.policy {
            HostKeyPolicy::AcceptAny => {
                tracing::info!(host = %self.host, %fingerprint, "host key accepted without verification");
                Ok(true)
            }
            HostKeyPolicy::KnownHosts => {
                match russh_keys::check_known_hosts(&self.host, self.port, key) {
                    Ok(true) => {
                        tracing::debug!(host = %self.host, %fingerprint, "host key matches known_hosts");
                        Ok(true)
                    }
                    Ok(false) => {
                        tracing::info!(host = %self.host, %fingerprint, "learning new host key");
                        if let Err(e) = russh_keys::learn_known_hosts(&self.host, self.port, key) {
                            tracing::warn!(error = %e, "could not record host key in known_hosts");
                        }
                        Ok(true)
                    }
                    Err(e) => {
                        tracing::warn!(host = %self.host, %fingerprint, error = %e, "host key rejected");
                        if let Ok(mut slot) = self.rejected.lock() {
                            *slot = Some(fingerprint);
                        }
                        Ok(false)
                    }
                }
            }
        }
    }
}
