//! `hoist provision`: run the full sequence against one host.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::provision::{ProvisionOptions, provision};
use crate::commands::{TargetArgs, connection_params};
use crate::infra::fs::LocalFs;
use crate::infra::ssh::SshSession;
use crate::output::human::HumanRenderer;
use crate::output::json;
use crate::output::reporter::TerminalReporter;

/// Run the provision command.
///
/// # Errors
///
/// Returns an error for invalid parameters, a failed connection, or the first
/// fatal step failure. The session is closed before the error is returned.
pub async fn run(app: &AppContext, args: TargetArgs) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let deploy = config_service::resolve_deploy(&config.deploy, args.deploy.into_overrides())?;
    let connection = connection_params(app, &config.ssh, args.connection)?;
    let target = connection.target();

    if !app.confirm(
        &format!("Provision {target} for {}? Packages are installed and nginx is restarted.", deploy.domain),
        true,
    )? {
        app.output.info("Aborted.");
        return Ok(ExitCode::SUCCESS);
    }

    let session = SshSession::connect(&connection).await?;
    let outcome = {
        let reporter = TerminalReporter::new(&app.output);
        provision(
            &session,
            &LocalFs,
            ProvisionOptions {
                reporter: &reporter,
                deploy: &deploy,
                target: &target,
            },
        )
        .await
    };
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "session did not close cleanly");
    }
    let report = outcome?;

    if app.is_json() {
        json::print(&report)?;
    } else {
        HumanRenderer::new(&app.output).render_run(&report);
    }
    Ok(ExitCode::SUCCESS)
}
