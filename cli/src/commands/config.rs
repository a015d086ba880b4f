//! `hoist config`: inspect the optional configuration file.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;
use crate::output::json;

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show effective configuration (file values over defaults)
    Show,
    /// Print where the configuration file is read from
    Path,
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => show_config(app),
        ConfigCommand::Path => show_path(app),
    }
}

fn show_config(app: &AppContext) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let path = app.config_store.path()?;
    if app.is_json() {
        json::print(&serde_json::json!({ "path": path, "config": config }))?;
    } else {
        app.output.kv("File:", &path.display().to_string());
        let yaml = serde_yaml::to_string(&config).context("cannot serialize config")?;
        print!("{yaml}");
    }
    Ok(ExitCode::SUCCESS)
}

fn show_path(app: &AppContext) -> Result<ExitCode> {
    let path = app.config_store.path()?;
    if app.is_json() {
        json::print(&serde_json::json!({ "path": path }))?;
    } else {
        println!("{}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
