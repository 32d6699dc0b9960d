//! Built-in capabilities configuration (`[builtin]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBuiltinConfig {
    /// Whether the built-in capabilities (`echo`, `wait`) are registered
    pub enabled: bool,
}

impl Default for FileBuiltinConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
