//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`: never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::CommandResult;
use crate::domain::config::HoistConfig;

// ── Remote Host Port Traits ───────────────────────────────────────────────────

/// Command execution on the remote host.
///
/// A non-zero exit is not an error at this level; `Err` means the transport
/// itself failed (channel closed, session dropped).
#[allow(async_fn_in_trait)]
pub trait ShellExecutor {
    /// Run a shell command line and capture its output.
    async fn exec(&self, command: &str) -> Result<CommandResult>;
    /// Run a shell command line with `input` streamed to its stdin.
    async fn exec_with_stdin(&self, command: &str, input: &[u8]) -> Result<CommandResult>;
}

/// File placement primitives on the remote host.
///
/// Each call either completes or returns `Err`; none of them is atomic on its
/// own. `application::services::atomic_write` composes them.
#[allow(async_fn_in_trait)]
pub trait FileTransfer {
    /// Write `content` to `remote_path`, creating or truncating it.
    async fn upload(&self, remote_path: &str, content: &[u8]) -> Result<()>;
    /// Set the permission bits of `remote_path`.
    async fn set_mode(&self, remote_path: &str, mode: u32) -> Result<()>;
    /// Rename `from` onto `to` within one filesystem.
    async fn rename(&self, from: &str, to: &str) -> Result<()>;
    /// Remove `remote_path`; succeeds if it does not exist.
    async fn remove(&self, remote_path: &str) -> Result<()>;
}

/// Composite trait: any type implementing both sub-traits is a `RemoteHost`.
pub trait RemoteHost: ShellExecutor + FileTransfer {}

/// Blanket implementation: any type implementing both sub-traits is a `RemoteHost`.
impl<T> RemoteHost for T where T: ShellExecutor + FileTransfer {}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Local Filesystem Port ─────────────────────────────────────────────────────

/// Read access to the operator's machine.
#[allow(async_fn_in_trait)]
pub trait LocalFiles {
    /// Read a UTF-8 file, returning `None` when it does not exist.
    async fn read_optional(&self, path: &Path) -> Result<Option<String>>;
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Abstracts loading of the optional configuration file.
pub trait ConfigStore {
    /// Load configuration, returning defaults when no file exists.
    fn load(&self) -> Result<HoistConfig>;
    /// Where the configuration file is (or would be).
    fn path(&self) -> Result<PathBuf>;
}
