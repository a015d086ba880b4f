//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and the pretty printer for command results.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{ConfigError, ParamError, ProvisionError};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{json}");
    Ok(())
}

/// Machine-readable code for a command error.
#[must_use]
pub fn error_code(error: &anyhow::Error) -> &'static str {
    if let Some(e) = error.downcast_ref::<ProvisionError>() {
        e.code()
    } else if error.downcast_ref::<ParamError>().is_some() {
        "INVALID_ARGUMENT"
    } else if error.downcast_ref::<ConfigError>().is_some() {
        "INVALID_CONFIG"
    } else {
        "ERROR"
    }
}
