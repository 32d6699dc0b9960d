//! Execution envelope: the uniform result of every capability invocation.
//!
//! Every call, whether rejected, failed or successful, produces exactly one
//! [`ExecutionEnvelope`]. Callers only ever inspect [`succeeded`]; they never
//! need to catch an error from a capability.
//!
//! Field presence on the wire:
//!
//! | `succeeded` | `output` | `error_message` |
//! |:-----------:|:--------:|:---------------:|
//! | `true`  | present | absent |
//! | `false` | absent  | present |
//!
//! [`succeeded`]: ExecutionEnvelope::succeeded

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Result of invoking a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEnvelope {
    /// Whether the capability completed successfully
    pub succeeded: bool,
    /// Capability-specific payload (success only); a present `null` is kept
    #[serde(
        default,
        deserialize_with = "present_output",
        skip_serializing_if = "Option::is_none"
    )]
    pub output: Option<serde_json::Value>,
    /// Display text of the error (failure only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Wall-clock time spent in the handler; validation is not included
    #[serde(rename = "elapsed_ms", with = "elapsed_millis")]
    pub elapsed: Duration,
    /// When this envelope was constructed
    pub timestamp: DateTime<Utc>,
    /// Side-channel information that does not belong in `output`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ExecutionEnvelope {
    /// Successful envelope carrying `output`.
    pub fn success(output: impl Into<serde_json::Value>, elapsed: Duration) -> Self {
        Self {
            succeeded: true,
            output: Some(output.into()),
            error_message: None,
            elapsed,
            timestamp: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    /// Failed envelope. Only the error's display text is kept.
    pub fn failure(error: &impl fmt::Display, elapsed: Duration) -> Self {
        Self {
            succeeded: false,
            output: None,
            error_message: Some(error.to_string()),
            elapsed,
            timestamp: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    /// Add one metadata entry (builder style).
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.insert_metadata(key, value);
        self
    }

    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn is_success(&self) -> bool {
        self.succeeded
    }

    pub fn output(&self) -> Option<&serde_json::Value> {
        self.output.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn metadata_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// A present `output` field is `Some`, even when it is `null`.
fn present_output<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// `Duration` on the wire as fractional milliseconds.
mod elapsed_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = f64::deserialize(deserializer)?;
        if !millis.is_finite() || millis < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "elapsed_ms must be a non-negative number, got {}",
                millis
            )));
        }
        Ok(Duration::from_secs_f64(millis / 1000.0))
    }
}
