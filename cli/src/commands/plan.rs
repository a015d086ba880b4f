//! `hoist plan`: report what `provision` would do, changing nothing.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::provision::plan;
use crate::commands::{TargetArgs, connection_params};
use crate::infra::ssh::SshSession;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Run the plan command.
///
/// # Errors
///
/// Returns an error for invalid parameters or a failed connection.
pub async fn run(app: &AppContext, args: TargetArgs) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let deploy = config_service::resolve_deploy(&config.deploy, args.deploy.into_overrides())?;
    let connection = connection_params(app, &config.ssh, args.connection)?;

    let session = SshSession::connect(&connection).await?;
    let outcome = plan(&session, &deploy, &connection.target()).await;
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "session did not close cleanly");
    }
    let report = outcome?;

    if app.is_json() {
        json::print(&report)?;
    } else {
        HumanRenderer::new(&app.output).render_plan(&report);
    }
    Ok(ExitCode::SUCCESS)
}
