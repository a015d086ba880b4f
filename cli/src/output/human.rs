//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::domain::artifacts::Artifact;
use crate::domain::report::{PlanReport, RunReport};
use crate::domain::step::StepStatus;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Summary printed after the streamed step lines of `hoist provision`.
    pub fn render_run(&self, report: &RunReport) {
        if !report.tolerated.is_empty() {
            println!();
            self.ctx.header("Tolerated failures:");
            for failure in &report.tolerated {
                self.ctx.warn(&format!(
                    "[{}] exited {}: {}",
                    failure.step, failure.exit_code, failure.message
                ));
                if !self.ctx.quiet {
                    self.ctx.command(&failure.command);
                }
            }
        }

        if let Some(status) = &report.service_status
            && !self.ctx.quiet
        {
            println!();
            self.ctx.header("Services:");
            for line in status.lines() {
                println!("    {}", line.style(self.ctx.styles.dim));
            }
        }

        if let Some(command) = &report.manual_followup {
            println!();
            self.ctx.warn("Certificate not issued. Once DNS points at this host, run:");
            self.ctx.command(command);
        }

        println!();
        self.ctx
            .success(&format!("Deployed to {}: {}", report.host, report.url()));
    }

    /// Render the precondition of every step.
    pub fn render_plan(&self, report: &PlanReport) {
        self.ctx
            .header(&format!("Plan for {} ({}):", report.host, report.os));
        for (step, status) in &report.steps {
            match status {
                StepStatus::Satisfied(detail) => self.ctx.success(&format!("{step}: {detail}")),
                StepStatus::Pending(detail) => self.ctx.step(&format!(
                    "{step}: {detail} [{} on failure]",
                    step.failure_class()
                )),
            }
        }
    }

    /// Print every artifact with a path header. Always printed: this is the
    /// command's primary output.
    pub fn render_artifacts(&self, artifacts: &[Artifact]) {
        for (i, artifact) in artifacts.iter().enumerate() {
            if i > 0 {
                println!();
            }
            let header = format!(
                "# {} ({}, mode {:04o})",
                artifact.path, artifact.kind, artifact.mode
            );
            println!("{}", header.style(self.ctx.styles.header));
            print!("{}", artifact.content);
        }
    }
}
