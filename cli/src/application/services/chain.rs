//! Ordered fallback chains.
//!
//! A chain is a list of alternative commands for the same goal. They run in
//! order and the first one that succeeds (and passes its verification, when
//! it has one) ends the chain. Every attempt is logged and recorded.

use anyhow::Result;

use crate::application::ports::ShellExecutor;
use crate::application::services::remote;
use crate::domain::report::AttemptRecord;
use crate::domain::{CommandResult, ProvisionError, StepId};

/// One way of reaching a chain's goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub label: String,
    pub command: String,
    /// Re-check run after a zero exit; the attempt only counts if it passes.
    pub verify: Option<String>,
}

impl Alternative {
    #[must_use]
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
            verify: None,
        }
    }

    #[must_use]
    pub fn verified_by(mut self, check: impl Into<String>) -> Self {
        self.verify = Some(check.into());
        self
    }
}

/// Result of running a chain.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    /// Label of the alternative that succeeded.
    pub winner: Option<String>,
    pub attempts: Vec<AttemptRecord>,
    /// The failing command (or verification) of the last attempt.
    pub last_failure: Option<CommandResult>,
}

impl ChainOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.winner.is_some()
    }

    /// Fatal error describing the last failed attempt.
    #[must_use]
    pub fn into_fatal(self, step: StepId) -> ProvisionError {
        match self.last_failure {
            Some(result) => remote::fatal(step, result),
            None => ProvisionError::FatalStep {
                step,
                command: String::new(),
                exit_code: 1,
                stdout: String::new(),
                stderr: "no alternatives available".to_string(),
            },
        }
    }
}

/// Run `alternatives` in order, stopping at the first success.
///
/// Non-zero exits never abort the chain; callers decide whether an exhausted
/// chain is fatal.
///
/// # Errors
///
/// Returns an error only on transport failure.
pub async fn run_chain(
    shell: &impl ShellExecutor,
    step: StepId,
    alternatives: &[Alternative],
) -> Result<ChainOutcome> {
    let mut outcome = ChainOutcome {
        winner: None,
        attempts: Vec::with_capacity(alternatives.len()),
        last_failure: None,
    };

    for alt in alternatives {
        tracing::debug!(%step, label = %alt.label, command = %alt.command, "trying alternative");
        let result = shell.exec(&alt.command).await?;

        let verified = match (&alt.verify, result.success()) {
            (Some(check), true) => {
                let check_result = shell.exec(check).await?;
                let passed = check_result.success();
                if !passed {
                    outcome.last_failure = Some(check_result);
                }
                Some(passed)
            }
            _ => None,
        };

        let record = AttemptRecord {
            label: alt.label.clone(),
            exit_code: result.exit_code,
            verified,
        };

        if record.succeeded() {
            tracing::info!(%step, label = %alt.label, "alternative succeeded");
            outcome.winner = Some(alt.label.clone());
            outcome.attempts.push(record);
            outcome.last_failure = None;
            return Ok(outcome);
        }

        if result.success() {
            tracing::warn!(%step, label = %alt.label, "alternative exited 0 but verification failed");
        } else {
            tracing::warn!(
                %step,
                label = %alt.label,
                exit_code = result.exit_code,
                stderr = result.brief(),
                "alternative failed"
            );
            outcome.last_failure = Some(result);
        }
        outcome.attempts.push(record);
    }

    Ok(outcome)
}
