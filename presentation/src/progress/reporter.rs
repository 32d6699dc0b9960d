//! Progress reporting for long-running capabilities

use capdispatch_domain::{Progress, ProgressSink};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;

/// Reports handler progress with an indicatif bar on stderr.
///
/// The bar is created on the first update, so capabilities that never
/// report progress print nothing.
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: false,
        }
    }

    /// A reporter that tracks progress without drawing (for tests and pipes).
    pub fn hidden() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: true,
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn create_bar(&self, capability: &str, total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if self.hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.set_style(Self::bar_style());
        pb.set_prefix(capability.to_string());
        pb
    }

    /// Position of the current bar, if one was started.
    pub fn position(&self) -> Option<u64> {
        self.bar
            .lock()
            .ok()
            .and_then(|bar| bar.as_ref().map(ProgressBar::position))
    }

    /// Finish the bar (if any) with a status message.
    pub fn finish(&self, succeeded: bool) {
        let Ok(mut bar) = self.bar.lock() else {
            return;
        };
        if let Some(pb) = bar.take() {
            if succeeded {
                pb.finish_with_message(format!("{}", "done".green()));
            } else {
                pb.abandon_with_message(format!("{}", "failed".red()));
            }
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressReporter {
    fn report(&self, capability: &str, progress: &Progress) {
        let Ok(mut bar) = self.bar.lock() else {
            return;
        };
        let pb = bar.get_or_insert_with(|| self.create_bar(capability, progress.total));

        if pb.length() != Some(progress.total) {
            pb.set_length(progress.total);
        }
        pb.set_position(progress.current);
        let message = match &progress.stage {
            Some(stage) => format!("{} {}", format!("[{}]", stage).dimmed(), progress.message),
            None => progress.message.clone(),
        };
        pb.set_message(message);
    }
}

/// Simple text-based progress (no fancy UI), one line per update on stderr.
pub struct SimpleProgress;

impl ProgressSink for SimpleProgress {
    fn report(&self, capability: &str, progress: &Progress) {
        eprintln!(
            "{} {} {:>5.1}% {}",
            "->".cyan(),
            capability.bold(),
            progress.percentage,
            progress.message
        );
    }
}
