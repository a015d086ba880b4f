//! Filesystem infrastructure: implements `LocalFiles`.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::LocalFiles;

/// Production filesystem implementation of `LocalFiles`.
pub struct LocalFs;

impl LocalFiles for LocalFs {
    async fn read_optional(&self, path: &Path) -> Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }
}
