//! Terminal implementation of `ProgressReporter` for `hoist provision`.

use std::cell::RefCell;

use indicatif::ProgressBar;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// On a TTY each `step()` starts a spinner that the next `success()` or
/// `warn()` finishes. Otherwise lines are printed as they come, with the same
/// markers as [`OutputContext`]. Everything is suppressed when `ctx.quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    active: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            active: RefCell::new(None),
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if !self.ctx.show_progress() {
            self.ctx.step(message);
        } else if let Some(previous) = self.active.replace(Some(progress::spinner(message))) {
            previous.finish_and_clear();
        }
    }

    fn success(&self, message: &str) {
        match self.active.take() {
            Some(pb) => progress::finish_ok(&pb, message),
            None => self.ctx.success(message),
        }
    }

    fn warn(&self, message: &str) {
        match self.active.take() {
            Some(pb) => progress::finish_warn(&pb, message),
            None => self.ctx.warn(message),
        }
    }
}

impl Drop for TerminalReporter<'_> {
    // A step that failed fatally leaves its spinner line on screen.
    fn drop(&mut self) {
        if let Some(pb) = self.active.get_mut().take() {
            pb.abandon();
        }
    }
}
