//! Port for the invocation audit log.
//!
//! `tracing` carries diagnostics; this port receives one [`InvocationEvent`]
//! per finished call so an adapter can keep a machine-readable trail of
//! outcomes.

use capdispatch_domain::capability::{ExecutionEnvelope, Invocation, InvocationId, InvocationPhase};
use serde::Serialize;

/// Outcome of one finished call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationEvent {
    pub invocation_id: InvocationId,
    pub capability: String,
    /// Terminal phase: `succeeded`, `failed` or `rejected`
    pub phase: InvocationPhase,
    pub succeeded: bool,
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl InvocationEvent {
    /// Summarize a terminal invocation and the envelope it produced.
    pub fn finished(invocation: &Invocation, envelope: &ExecutionEnvelope) -> Self {
        Self {
            invocation_id: invocation.id.clone(),
            capability: invocation.capability.clone(),
            phase: invocation.phase(),
            succeeded: envelope.succeeded,
            elapsed_ms: envelope.elapsed_ms(),
            error: envelope.error_message().map(str::to_string),
            error_code: envelope
                .metadata_value("error_code")
                .and_then(|code| code.as_str())
                .map(str::to_string),
        }
    }
}

/// Sink for invocation events.
///
/// Synchronous and infallible: a broken log never changes a call's outcome.
pub trait InvocationLogger: Send + Sync {
    fn log(&self, event: &InvocationEvent);
}

/// Discards every event.
pub struct NoInvocationLogger;

impl InvocationLogger for NoInvocationLogger {
    fn log(&self, _event: &InvocationEvent) {}
}
