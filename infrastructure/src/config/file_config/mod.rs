//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod builtin;
mod capabilities;
mod dispatch;
mod output;

pub use builtin::FileBuiltinConfig;
pub use capabilities::{
    FileCapabilitiesConfig, FileCapabilityParameter, FileCommandCapabilityConfig, PLACEHOLDER,
};
pub use dispatch::{DEFAULT_TIMEOUT_SECS, FileDispatchConfig};
pub use output::FileOutputConfig;

use crate::capabilities::BUILTIN_NAMES;
use capdispatch_domain::config::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Dispatcher settings
    pub dispatch: FileDispatchConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Built-in capability settings
    pub builtin: FileBuiltinConfig,
    /// Configured capabilities
    pub capabilities: FileCapabilitiesConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks every command capability definition, then names that would
    /// collide with an enabled built-in.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (name, command) in &self.capabilities.command {
            issues.extend(command.validate(name));

            if self.builtin.enabled && BUILTIN_NAMES.contains(&name.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ShadowsBuiltin,
                    format!(
                        "capabilities.command.{}: name is taken by a built-in capability",
                        name
                    ),
                ));
            }
        }

        issues
    }

    /// True if any issue is an error.
    pub fn has_errors(&self) -> bool {
        self.validate().iter().any(ConfigIssue::is_error)
    }
}
