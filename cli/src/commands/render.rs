//! `hoist render`: print the generated files for a domain without connecting.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::domain::artifacts::{project_artifacts, proxy_artifact};
use crate::domain::params::{validate_deploy_path, validate_domain};
use crate::domain::secret::generate_secret;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Placeholder printed instead of the secret.
pub const REDACTED: &str = "<redacted>";

/// Arguments for the render command.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Public domain name, e.g. example.org
    #[arg(long)]
    pub domain: String,

    /// Remote deploy directory used in file paths
    #[arg(long)]
    pub path: Option<String>,

    /// Print a freshly generated secret instead of a placeholder
    #[arg(long)]
    pub show_secret: bool,
}

/// Run the render command.
///
/// # Errors
///
/// Returns an error for an invalid domain or path, or an unreadable config.
pub fn run(app: &AppContext, args: &RenderArgs) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let domain = validate_domain(&args.domain)?;
    let path = validate_deploy_path(args.path.as_deref().unwrap_or(&config.deploy.path))?;
    let secret = if args.show_secret {
        generate_secret()
    } else {
        REDACTED.to_string()
    };

    let mut artifacts = project_artifacts(&path, &domain, &secret);
    artifacts.push(proxy_artifact(&domain));

    if app.is_json() {
        json::print(&artifacts)?;
    } else {
        HumanRenderer::new(&app.output).render_artifacts(&artifacts);
    }
    Ok(ExitCode::SUCCESS)
}
