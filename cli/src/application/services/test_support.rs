//! Shared test double for service tests.
//!
//! `ScriptedHost` answers commands from a table (unlisted commands exit 0),
//! keeps an in-memory filesystem for `FileTransfer`, and records every call.

#![allow(clippy::expect_used)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::application::ports::{FileTransfer, LocalFiles, ProgressReporter, ShellExecutor};
use crate::domain::CommandResult;

#[derive(Default)]
pub struct ScriptedHost {
    responses: HashMap<String, (u32, String, String)>,
    pub calls: RefCell<Vec<String>>,
    pub files: RefCell<HashMap<String, (Vec<u8>, u32)>>,
    /// Number of upcoming renames that fail.
    pub rename_failures: Cell<u32>,
    pub fail_chmod: Cell<bool>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, command: &str, code: u32, stdout: &str, stderr: &str) -> Self {
        self.responses
            .insert(command.to_string(), (code, stdout.to_string(), stderr.to_string()));
        self
    }

    pub fn with_file(self, path: &str, content: &str, mode: u32) -> Self {
        self.files
            .borrow_mut()
            .insert(path.to_string(), (content.as_bytes().to_vec(), mode));
        self
    }

    pub fn file(&self, path: &str) -> Option<(String, u32)> {
        self.files
            .borrow()
            .get(path)
            .map(|(c, m)| (String::from_utf8_lossy(c).into_owned(), *m))
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ShellExecutor for ScriptedHost {
    async fn exec(&self, command: &str) -> Result<CommandResult> {
        self.calls.borrow_mut().push(command.to_string());
        let (code, out, err) = self
            .responses
            .get(command)
            .cloned()
            .unwrap_or((0, String::new(), String::new()));
        Ok(CommandResult::new(command, code, out.as_bytes(), err.as_bytes()))
    }

    async fn exec_with_stdin(&self, command: &str, _input: &[u8]) -> Result<CommandResult> {
        self.exec(command).await
    }
}

impl FileTransfer for ScriptedHost {
    async fn upload(&self, remote_path: &str, content: &[u8]) -> Result<()> {
        self.calls.borrow_mut().push(format!("upload {remote_path}"));
        self.files
            .borrow_mut()
            .insert(remote_path.to_string(), (content.to_vec(), 0o600));
        Ok(())
    }

    async fn set_mode(&self, remote_path: &str, mode: u32) -> Result<()> {
        self.calls.borrow_mut().push(format!("chmod {mode:o} {remote_path}"));
        if self.fail_chmod.get() {
            bail!("chmod failed");
        }
        match self.files.borrow_mut().get_mut(remote_path) {
            Some(entry) => {
                entry.1 = mode;
                Ok(())
            }
            None => bail!("no such file: {remote_path}"),
        }
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("rename {from} {to}"));
        let remaining = self.rename_failures.get();
        if remaining > 0 {
            self.rename_failures.set(remaining - 1);
            bail!("rename refused: {to} exists");
        }
        let mut files = self.files.borrow_mut();
        let entry = files
            .remove(from)
            .ok_or_else(|| anyhow::anyhow!("no such file: {from}"))?;
        files.insert(to.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, remote_path: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("remove {remote_path}"));
        self.files.borrow_mut().remove(remote_path);
        Ok(())
    }
}

/// Local files keyed by path.
#[derive(Default)]
pub struct MemoryFiles(pub HashMap<PathBuf, String>);

impl MemoryFiles {
    pub fn with(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.0.insert(path.into(), content.to_string());
        self
    }
}

impl LocalFiles for MemoryFiles {
    async fn read_optional(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.0.get(path).cloned())
    }
}

/// Collects reporter events as `"<kind>: <message>"`.
#[derive(Default)]
pub struct RecordingReporter(pub RefCell<Vec<String>>);

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.0.borrow_mut().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.0.borrow_mut().push(format!("success: {message}"));
    }
    fn warn(&self, message: &str) {
        self.0.borrow_mut().push(format!("warn: {message}"));
    }
}
