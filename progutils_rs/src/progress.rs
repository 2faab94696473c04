//! Progress bar for sequential batch runs.
//!
//! Drawn on stderr so command output on stdout stays clean. indicatif does not
//! draw when stderr is not a terminal, so piped and captured runs see nothing.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str = "{bar:40.green/red} {pos}/{len} {percent:>3}% [{elapsed_precise}] {msg}";

/// One bar counting finished batch commands.
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    /// Bar over `total` commands on stderr.
    pub fn new(total: usize) -> Self {
        Self::with_target(total, ProgressDrawTarget::stderr())
    }

    /// Bar that never draws.
    pub fn hidden(total: usize) -> Self {
        Self::with_target(total, ProgressDrawTarget::hidden())
    }

    fn with_target(total: usize, target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), target);
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);
        Self { bar }
    }

    /// Hide the bar while `f` writes to the terminal.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    /// Mark one command finished; `label` names the next one.
    pub fn advance(&self, label: &str) {
        self.bar.inc(1);
        self.bar.set_message(label.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
