//! Output configuration from TOML (`[output]` section)

use capdispatch_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format used when `--output` is not given
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show a progress bar for capabilities that report progress
    pub progress: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
            progress: true,
        }
    }
}
