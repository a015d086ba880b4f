//! Record of a provisioning run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::os::OsFamily;
use crate::domain::step::{StepId, StepOutcome, StepStatus};

/// One alternative tried in a fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub label: String,
    pub exit_code: u32,
    /// `None` when the alternative has no separate verification.
    pub verified: Option<bool>,
}

impl AttemptRecord {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0 && self.verified != Some(false)
    }
}

/// A failure that was logged and did not stop the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToleratedFailure {
    pub step: StepId,
    pub command: String,
    pub exit_code: u32,
    pub message: String,
}

/// What happened in one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: StepId,
    #[serde(flatten)]
    pub outcome: StepOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<AttemptRecord>,
}

/// Result of `hoist provision`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub host: String,
    pub domain: String,
    pub os: Option<OsFamily>,
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
    pub tolerated: Vec<ToleratedFailure>,
    /// `compose ps` output after bring-up.
    pub service_status: Option<String>,
    /// Printed when certificate issuance needs to be retried by hand.
    pub manual_followup: Option<String>,
}

impl RunReport {
    #[must_use]
    pub fn new(host: &str, domain: &str) -> Self {
        Self {
            host: host.to_string(),
            domain: domain.to_string(),
            os: None,
            started_at: Utc::now(),
            steps: Vec::new(),
            tolerated: Vec::new(),
            service_status: None,
            manual_followup: None,
        }
    }

    #[must_use]
    pub fn outcome_of(&self, step: StepId) -> Option<&StepOutcome> {
        self.steps.iter().find(|r| r.step == step).map(|r| &r.outcome)
    }

    /// Where the site is reachable: plain HTTP until a certificate is issued.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.manual_followup.is_some() { "http" } else { "https" };
        format!("{scheme}://{}", self.domain)
    }
}

/// Result of `hoist plan`: each step's precondition, nothing changed.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub host: String,
    pub os: OsFamily,
    pub steps: Vec<(StepId, StepStatus)>,
}
