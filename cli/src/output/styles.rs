//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Stylesheet for terminal output. Every field is a no-op style until
/// [`Styles::colorize`] runs.
#[derive(Default, Clone)]
pub struct Styles {
    /// Applied or satisfied steps (green)
    pub ok: Style,
    /// Degraded steps and tolerated failures (yellow)
    pub degraded: Style,
    /// Steps a plan would apply (blue)
    pub pending: Style,
    /// Secondary text such as `compose ps` output
    pub dim: Style,
    /// Section titles and artifact path headers
    pub header: Style,
    /// Remote command lines the operator may copy
    pub command: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        self.ok = Style::new().green();
        self.degraded = Style::new().yellow();
        self.pending = Style::new().blue();
        self.dim = Style::new().dimmed();
        self.header = Style::new().bold().cyan();
        self.command = Style::new().bold();
    }
}
