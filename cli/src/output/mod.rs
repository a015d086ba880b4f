//! Output formatting module

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use styles::Styles;

/// Marker printed before an applied or satisfied step.
pub const OK_MARK: &str = "✓";
/// Marker printed before a degraded step or tolerated failure.
pub const WARN_MARK: &str = "!";

/// Styling and terminal state shared by every renderer.
pub struct OutputContext {
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Suppress progress and summaries. Artifacts and follow-up commands are
    /// still printed.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are used only on a TTY, and never with `--no-color` or `NO_COLOR`.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let mut styles = Styles::default();
        if !no_color && is_tty && std::env::var_os("NO_COLOR").is_none() {
            styles.colorize();
        }
        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Spinners only make sense on an interactive, non-quiet terminal.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", OK_MARK.style(self.styles.ok));
        }
    }

    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", WARN_MARK.style(self.styles.degraded));
        }
    }

    /// A step that is about to run, or would run under `plan`.
    pub fn step(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "→".style(self.styles.pending));
        }
    }

    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {msg}");
        }
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.style(self.styles.header));
        }
    }

    /// Key-value line with the key dimmed.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }

    /// An indented command line. Never suppressed: the operator has to run it.
    pub fn command(&self, cmd: &str) {
        println!("    {}", cmd.style(self.styles.command));
    }
}
