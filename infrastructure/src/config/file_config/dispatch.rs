//! Dispatcher configuration from TOML (`[dispatch]` section)
//!
//! ```toml
//! [dispatch]
//! timeout_secs = 30                          # 0 disables the deadline
//! invocation_log = "logs/invocations.jsonl"  # optional
//! ```

use capdispatch_application::DispatchConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default per-call deadline in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatchConfig {
    /// Deadline applied to calls without their own, in seconds (0 = none)
    pub timeout_secs: u64,
    /// Append one JSON line per invocation to this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_log: Option<PathBuf>,
}

impl Default for FileDispatchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            invocation_log: None,
        }
    }
}

impl FileDispatchConfig {
    pub fn to_dispatch_config(&self) -> DispatchConfig {
        DispatchConfig::from_timeout_seconds(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_timeout() {
        let config = FileDispatchConfig::default();
        assert_eq!(
            config.to_dispatch_config().default_timeout,
            Some(Duration::from_secs(30))
        );
        assert!(config.invocation_log.is_none());
    }

    #[test]
    fn test_zero_disables_deadline() {
        let config = FileDispatchConfig {
            timeout_secs: 0,
            invocation_log: None,
        };
        assert_eq!(config.to_dispatch_config().default_timeout, None);
    }
}
