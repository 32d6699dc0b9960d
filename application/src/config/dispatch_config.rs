//! Dispatcher behavior configuration.

use std::time::Duration;

/// Controls runtime behavior of the dispatcher.
///
/// The dispatcher imposes no deadline on its own; `default_timeout` only
/// applies when the caller did not pass one for the call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Deadline applied to calls that do not carry their own.
    pub default_timeout: Option<Duration>,
}

impl DispatchConfig {
    /// Creates a DispatchConfig from a timeout in seconds; `0` disables it.
    pub fn from_timeout_seconds(seconds: u64) -> Self {
        Self {
            default_timeout: (seconds > 0).then(|| Duration::from_secs(seconds)),
        }
    }

    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_deadline() {
        assert_eq!(DispatchConfig::default().default_timeout, None);
    }

    #[test]
    fn test_from_timeout_seconds() {
        assert_eq!(
            DispatchConfig::from_timeout_seconds(30).default_timeout,
            Some(Duration::from_secs(30))
        );
        assert_eq!(DispatchConfig::from_timeout_seconds(0).default_timeout, None);
    }
}
