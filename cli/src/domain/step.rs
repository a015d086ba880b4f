//! The fixed provisioning sequence and its failure classification.

use std::fmt;

use serde::Serialize;

/// One unit of the provisioning sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepId {
    Packages,
    Docker,
    Compose,
    Source,
    Artifacts,
    Proxy,
    Services,
    Certificate,
}

/// How a step's failure affects the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureClass {
    /// Logged; the sequence continues.
    Tolerated,
    /// Aborts the sequence immediately.
    Fatal,
    /// Alternatives are tried in order; fatal only when the last one fails.
    Escalating,
}

impl StepId {
    /// Execution order. Later steps assume earlier postconditions.
    pub const ORDER: [Self; 8] = [
        Self::Packages,
        Self::Docker,
        Self::Compose,
        Self::Source,
        Self::Artifacts,
        Self::Proxy,
        Self::Services,
        Self::Certificate,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Packages => "packages",
            Self::Docker => "docker",
            Self::Compose => "compose",
            Self::Source => "source",
            Self::Artifacts => "artifacts",
            Self::Proxy => "proxy",
            Self::Services => "services",
            Self::Certificate => "certificate",
        }
    }

    /// Operator-facing progress line.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Packages => "installing base packages...",
            Self::Docker => "ensuring container runtime...",
            Self::Compose => "ensuring docker compose...",
            Self::Source => "syncing application source...",
            Self::Artifacts => "writing configuration files...",
            Self::Proxy => "configuring nginx reverse proxy...",
            Self::Services => "building and starting services...",
            Self::Certificate => "requesting TLS certificate...",
        }
    }

    #[must_use]
    pub fn failure_class(self) -> FailureClass {
        match self {
            Self::Packages | Self::Certificate => FailureClass::Tolerated,
            Self::Compose => FailureClass::Escalating,
            Self::Docker | Self::Source | Self::Artifacts | Self::Proxy | Self::Services => {
                FailureClass::Fatal
            }
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tolerated => "tolerated",
            Self::Fatal => "fatal",
            Self::Escalating => "fallback chain",
        })
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a step's precondition check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum StepStatus {
    /// Goal state already holds; the action is skipped.
    Satisfied(String),
    /// The action must run.
    Pending(String),
}

impl StepStatus {
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Satisfied(d) | Self::Pending(d) => d,
        }
    }
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "lowercase")]
pub enum StepOutcome {
    /// Precondition held; nothing was changed.
    Skipped(String),
    /// The action ran and succeeded.
    Applied(String),
    /// The action ran and failed with a tolerated failure.
    Degraded(String),
}
