//! Per-invocation context handed to capability handlers.
//!
//! The context carries the caller's cancellation token, an optional progress
//! sink and free-form call options. Long-running handlers are expected to
//! call [`InvocationContext::check_cancelled`] between steps, or race their
//! work against [`InvocationContext::cancelled`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::error::CapabilityError;

/// A progress update from a running handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    /// 0.0 to 100.0
    pub percentage: f64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl Progress {
    /// Progress at `current` of `total`; the percentage is derived.
    pub fn new(current: u64, total: u64, message: impl Into<String>) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            (current.min(total) as f64 / total as f64) * 100.0
        };
        Self {
            current,
            total,
            percentage,
            message: message.into(),
            stage: None,
        }
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.current >= self.total
    }
}

/// Receiver of progress updates (CLI spinner, log, test recorder).
pub trait ProgressSink: Send + Sync {
    fn report(&self, capability: &str, progress: &Progress);
}

/// Context for a single capability invocation.
#[derive(Clone)]
pub struct InvocationContext {
    capability: String,
    cancellation: CancellationToken,
    progress: Option<Arc<dyn ProgressSink>>,
    options: BTreeMap<String, String>,
}

impl InvocationContext {
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            cancellation: CancellationToken::new(),
            progress: None,
            options: BTreeMap::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_options(mut self, options: BTreeMap<String, String>) -> Self {
        self.options.extend(options);
        self
    }

    /// The same context, addressed to another capability.
    pub fn scoped_to(&self, capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            ..self.clone()
        }
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// `Err(Cancelled)` once the caller has abandoned the call.
    pub fn check_cancelled(&self) -> Result<(), CapabilityError> {
        if self.cancellation.is_cancelled() {
            Err(CapabilityError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves when the call is cancelled.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }

    /// Forward a progress update to the sink, if one is attached.
    pub fn report_progress(&self, progress: Progress) {
        if let Some(sink) = &self.progress {
            sink.report(&self.capability, &progress);
        }
    }
}

impl fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationContext")
            .field("capability", &self.capability)
            .field("cancelled", &self.cancellation.is_cancelled())
            .field("progress", &self.progress.is_some())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, u64)>>);

    impl ProgressSink for Recorder {
        fn report(&self, capability: &str, progress: &Progress) {
            self.0
                .lock()
                .unwrap()
                .push((capability.to_string(), progress.current));
        }
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(Progress::new(1, 4, "").percentage, 25.0);
        assert_eq!(Progress::new(5, 0, "").percentage, 0.0);
        assert_eq!(Progress::new(9, 4, "").percentage, 100.0);
        assert!(Progress::new(4, 4, "").is_complete());
        assert!(!Progress::new(0, 0, "").is_complete());
    }

    #[test]
    fn test_check_cancelled() {
        let token = CancellationToken::new();
        let ctx = InvocationContext::new("scan").with_cancellation(token.clone());
        assert!(ctx.check_cancelled().is_ok());

        token.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.check_cancelled(), Err(CapabilityError::Cancelled));
    }

    #[test]
    fn test_report_progress_reaches_sink() {
        let recorder = Arc::new(Recorder::default());
        let ctx = InvocationContext::new("scan").with_progress(recorder.clone());

        ctx.report_progress(Progress::new(1, 3, "first"));
        ctx.scoped_to("nested").report_progress(Progress::new(2, 3, "second"));

        let seen = recorder.0.lock().unwrap();
        assert_eq!(
            *seen,
            vec![("scan".to_string(), 1), ("nested".to_string(), 2)]
        );
    }

    #[test]
    fn test_report_progress_without_sink_is_noop() {
        InvocationContext::new("scan").report_progress(Progress::new(1, 1, "done"));
    }

    #[test]
    fn test_options() {
        let ctx = InvocationContext::new("scan")
            .with_option("request_id", "abc")
            .with_option("caller", "cli");
        assert_eq!(ctx.option("request_id"), Some("abc"));
        assert_eq!(ctx.option("missing"), None);
        assert_eq!(ctx.options().len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_cancel() {
        let token = CancellationToken::new();
        let ctx = InvocationContext::new("scan").with_cancellation(token.clone());
        token.cancel();
        ctx.cancelled().await;
        assert!(ctx.is_cancelled());
    }
}
