//! Remote command dispatch with fault classification.

use anyhow::Result;

use crate::application::ports::ShellExecutor;
use crate::domain::report::ToleratedFailure;
use crate::domain::{CommandResult, FaultPolicy, ProvisionError, StepId};

/// Run `command` on the host under `policy`.
///
/// `Fatal` turns a non-zero exit into [`ProvisionError::FatalStep`]; `Tolerated`
/// logs it and hands the result back for the caller to record.
///
/// # Errors
///
/// Returns an error on transport failure, or on non-zero exit under `Fatal`.
pub async fn execute(
    shell: &impl ShellExecutor,
    step: StepId,
    command: &str,
    policy: FaultPolicy,
) -> Result<CommandResult> {
    tracing::debug!(%step, command, ?policy, "remote exec");
    let result = shell.exec(command).await?;
    if result.success() {
        return Ok(result);
    }
    match policy {
        FaultPolicy::Fatal => {
            tracing::error!(%step, command, exit_code = result.exit_code, "fatal command failed");
            Err(fatal(step, result).into())
        }
        FaultPolicy::Tolerated => {
            tracing::warn!(
                %step,
                command,
                exit_code = result.exit_code,
                stderr = result.brief(),
                "tolerated command failed"
            );
            Ok(result)
        }
    }
}

/// Run a read-only check; `true` when it exits zero.
///
/// # Errors
///
/// Returns an error only on transport failure.
pub async fn probe(shell: &impl ShellExecutor, command: &str) -> Result<bool> {
    let result = shell.exec(command).await?;
    tracing::debug!(command, exit_code = result.exit_code, "probe");
    Ok(result.success())
}

/// Build the fatal error for a failed command.
#[must_use]
pub fn fatal(step: StepId, result: CommandResult) -> ProvisionError {
    ProvisionError::FatalStep {
        step,
        command: result.command,
        exit_code: result.exit_code,
        stdout: result.stdout,
        stderr: result.stderr,
    }
}

/// Summarise a tolerated non-zero result for the run report.
#[must_use]
pub fn tolerated(step: StepId, result: &CommandResult) -> ToleratedFailure {
    ToleratedFailure {
        step,
        command: result.command.clone(),
        exit_code: result.exit_code,
        message: result.brief().to_string(),
    }
}
