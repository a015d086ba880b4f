//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod artifacts;
pub mod command;
pub mod config;
pub mod error;
pub mod os;
pub mod params;
pub mod report;
pub mod secret;
pub mod shell;
pub mod step;

pub use command::{CommandResult, FaultPolicy};
pub use error::{ConfigError, ParamError, ProvisionError};
pub use os::OsFamily;
pub use params::{ConnectionParams, Credential, DeployParams, HostKeyPolicy};
pub use step::{StepId, StepOutcome, StepStatus};
