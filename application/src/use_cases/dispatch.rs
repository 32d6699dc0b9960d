//! Dispatch capability use case
//!
//! Routes one call to a registered capability and always answers with an
//! [`ExecutionEnvelope`]:
//!
//! 1. **Lookup**: unknown name → failure envelope (`NOT_FOUND`)
//! 2. **Validate**: schema violation → failure envelope (`INVALID_ARGUMENT`),
//!    the handler is never invoked
//! 3. **Execute**: the handler runs, raced against the call's deadline and
//!    cancellation token
//! 4. **Finish**: `capability` is added to the envelope metadata, the outcome
//!    is logged to `tracing` and to the [`InvocationLogger`]
//!
//! `elapsed` covers the handler only; rejected calls report zero.
//!
//! ```ignore
//! let dispatcher = DispatchCapabilityUseCase::new(Arc::new(registry))
//!     .with_config(DispatchConfig::from_timeout_seconds(30));
//!
//! let request = DispatchRequest::new("echo", Arguments::new().with("message", "hi"));
//! let envelope = dispatcher.execute(request, DispatchOptions::default()).await;
//! assert!(envelope.succeeded);
//! ```

use crate::config::DispatchConfig;
use crate::ports::invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger};
use capdispatch_domain::capability::{
    Arguments, Capability, CapabilityError, CapabilityRegistry, CapabilitySchema,
    ExecutionEnvelope, Invocation, InvocationContext, InvocationPhase, ProgressSink,
    ValidatedArguments,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A call to dispatch: capability name plus raw arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    pub capability: String,
    pub arguments: Arguments,
}

impl DispatchRequest {
    pub fn new(capability: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            capability: capability.into(),
            arguments,
        }
    }

    /// Build a request from loosely-typed JSON arguments.
    pub fn from_json(
        capability: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Result<Self, CapabilityError> {
        Ok(Self::new(capability, Arguments::from_json(arguments)?))
    }
}

/// Per-call options.
#[derive(Clone, Default)]
pub struct DispatchOptions {
    /// Deadline for this call; falls back to the configured default.
    pub timeout: Option<Duration>,
    /// Caller-owned token; cancelling it abandons the call.
    pub cancellation: Option<CancellationToken>,
    pub progress: Option<Arc<dyn ProgressSink>>,
    /// Free-form options handed to the handler through its context.
    pub metadata: BTreeMap<String, String>,
}

impl DispatchOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for DispatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchOptions")
            .field("timeout", &self.timeout)
            .field("cancellation", &self.cancellation.is_some())
            .field("progress", &self.progress.is_some())
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Use case for dispatching capability calls.
pub struct DispatchCapabilityUseCase {
    registry: Arc<CapabilityRegistry>,
    config: DispatchConfig,
    logger: Arc<dyn InvocationLogger>,
    next_id: AtomicU64,
}

impl DispatchCapabilityUseCase {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            config: DispatchConfig::default(),
            logger: Arc::new(NoInvocationLogger),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn InvocationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Dispatch one call. Never fails: every outcome is an envelope.
    pub async fn execute(
        &self,
        request: DispatchRequest,
        options: DispatchOptions,
    ) -> ExecutionEnvelope {
        let mut invocation = Invocation::new(self.next_invocation_id(), &request.capability);
        debug!(
            capability = %request.capability,
            invocation = %invocation.id,
            arguments = request.arguments.len(),
            "Dispatching capability call"
        );

        let Some(capability) = self.registry.get(&request.capability) else {
            invocation.advance(InvocationPhase::Rejected);
            let error = CapabilityError::NotFound(request.capability.clone());
            return self.finish(&invocation, error_envelope(&error, Duration::ZERO));
        };

        invocation.advance(InvocationPhase::Validating);
        let input = match capability.validate(&request.arguments) {
            Ok(input) => input,
            Err(failure) => {
                invocation.advance(InvocationPhase::Rejected);
                let parameter = failure.parameter.clone();
                let error = CapabilityError::from(failure);
                let envelope =
                    error_envelope(&error, Duration::ZERO).with_metadata("parameter", parameter);
                return self.finish(&invocation, envelope);
            }
        };
        invocation.advance(InvocationPhase::Validated);

        invocation.advance(InvocationPhase::Executing);
        let envelope = self.run_guarded(capability.as_ref(), &input, options).await;
        invocation.advance(if envelope.succeeded {
            InvocationPhase::Succeeded
        } else {
            InvocationPhase::Failed
        });

        self.finish(&invocation, envelope)
    }

    /// Validate a call without executing it.
    pub fn validate(&self, request: &DispatchRequest) -> Result<(), CapabilityError> {
        let capability = self
            .registry
            .get(&request.capability)
            .ok_or_else(|| CapabilityError::NotFound(request.capability.clone()))?;
        capability.validate(&request.arguments)?;
        Ok(())
    }

    pub fn describe(&self, name: &str) -> Option<&CapabilitySchema> {
        self.registry.describe(name)
    }

    pub fn schemas(&self) -> Vec<&CapabilitySchema> {
        self.registry.schemas()
    }

    /// Run the handler against the deadline and the caller's token.
    ///
    /// The handler gets a child token: it is cancelled when the caller
    /// cancels and also when the deadline passes, so spawned work that
    /// holds the token stops as well.
    async fn run_guarded(
        &self,
        capability: &dyn Capability,
        input: &ValidatedArguments,
        options: DispatchOptions,
    ) -> ExecutionEnvelope {
        let caller = options.cancellation.unwrap_or_default();
        let call_token = caller.child_token();

        let mut ctx = InvocationContext::new(capability.name())
            .with_cancellation(call_token.clone())
            .with_options(options.metadata);
        if let Some(sink) = options.progress {
            ctx = ctx.with_progress(sink);
        }

        let deadline = options.timeout.or(self.config.default_timeout);
        let started = Instant::now();
        let handler = capability.execute(&ctx, input);

        let outcome = match deadline {
            Some(limit) => tokio::select! {
                biased;
                _ = caller.cancelled() => Err(CapabilityError::Cancelled),
                result = tokio::time::timeout(limit, handler) => {
                    result.map_err(|_| CapabilityError::Timeout(limit))
                }
            },
            None => tokio::select! {
                biased;
                _ = caller.cancelled() => Err(CapabilityError::Cancelled),
                envelope = handler => Ok(envelope),
            },
        };
        let elapsed = started.elapsed();

        match outcome {
            Ok(envelope) => envelope.with_elapsed(elapsed),
            Err(error) => {
                call_token.cancel();
                error_envelope(&error, elapsed)
            }
        }
    }

    fn finish(&self, invocation: &Invocation, mut envelope: ExecutionEnvelope) -> ExecutionEnvelope {
        envelope.insert_metadata("capability", invocation.capability.clone());

        let elapsed_ms = envelope.elapsed_ms();
        let error = envelope.error_message().unwrap_or_default();
        match invocation.phase() {
            InvocationPhase::Succeeded => info!(
                capability = %invocation.capability,
                invocation = %invocation.id,
                elapsed_ms,
                "Capability succeeded"
            ),
            InvocationPhase::Rejected => warn!(
                capability = %invocation.capability,
                invocation = %invocation.id,
                error = %error,
                "Capability call rejected"
            ),
            _ => warn!(
                capability = %invocation.capability,
                invocation = %invocation.id,
                elapsed_ms,
                error = %error,
                "Capability failed"
            ),
        }

        self.logger.log(&InvocationEvent::finished(invocation, &envelope));

        envelope
    }

    fn next_invocation_id(&self) -> String {
        format!("inv-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

fn error_envelope(error: &CapabilityError, elapsed: Duration) -> ExecutionEnvelope {
    ExecutionEnvelope::failure(error, elapsed).with_metadata("error_code", error.code())
}
