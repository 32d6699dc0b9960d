//! Presentation-level configuration
//!
//! How results are rendered, after command-line flags have been applied
//! on top of the `[output]` section of the configuration file.

use capdispatch_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show a progress bar while a capability runs
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// `--output` wins over the configured format.
    pub fn with_format_override(mut self, format: Option<OutputFormat>) -> Self {
        if let Some(format) = format {
            self.format = format;
        }
        self
    }

    /// Turn off ANSI colors process-wide when disabled.
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }

    /// Progress is shown for human output only.
    pub fn progress_enabled(&self, no_progress_flag: bool) -> bool {
        self.show_progress && !no_progress_flag && self.format == OutputFormat::Human
    }
}
