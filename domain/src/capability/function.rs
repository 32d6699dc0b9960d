//! Capabilities built from a schema plus an async handler closure.
//!
//! ```ignore
//! let greet = FnCapability::new(schema, |_ctx, args| async move {
//!     let name = args.require_str("name")?;
//!     Ok::<_, CapabilityError>(HandlerOutput::from(json!({ "greeting": format!("hello {name}") })))
//! });
//! ```

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use super::context::InvocationContext;
use super::envelope::ExecutionEnvelope;
use super::error::CapabilityError;
use super::schema::CapabilitySchema;
use super::traits::Capability;
use super::validation::ValidatedArguments;
use super::value::Arguments;

/// What a handler returns on success: the payload and optional metadata
/// to attach to the envelope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandlerOutput {
    pub value: serde_json::Value,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl HandlerOutput {
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self {
            value: value.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl From<serde_json::Value> for HandlerOutput {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}

type Handler = dyn Fn(InvocationContext, Arguments) -> BoxFuture<'static, Result<HandlerOutput, CapabilityError>>
    + Send
    + Sync;

/// A [`Capability`] backed by a closure.
#[derive(Clone)]
pub struct FnCapability {
    schema: CapabilitySchema,
    handler: Arc<Handler>,
}

impl FnCapability {
    pub fn new<F, Fut>(schema: CapabilitySchema, handler: F) -> Self
    where
        F: Fn(InvocationContext, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerOutput, CapabilityError>> + Send + 'static,
    {
        Self {
            schema,
            handler: Arc::new(move |ctx: InvocationContext, args: Arguments| {
                handler(ctx, args).boxed()
            }),
        }
    }
}

#[async_trait]
impl Capability for FnCapability {
    fn schema(&self) -> &CapabilitySchema {
        &self.schema
    }

    async fn execute(
        &self,
        ctx: &InvocationContext,
        input: &ValidatedArguments,
    ) -> ExecutionEnvelope {
        assert_eq!(
            input.schema_name(),
            self.schema.name(),
            "arguments validated for '{}' passed to capability '{}'",
            input.schema_name(),
            self.schema.name()
        );

        let started = Instant::now();
        let result = (self.handler)(ctx.clone(), input.arguments().clone()).await;
        let elapsed = started.elapsed();

        match result {
            Ok(output) => {
                let mut envelope = ExecutionEnvelope::success(output.value, elapsed);
                envelope.metadata.extend(output.metadata);
                envelope
            }
            Err(error) => {
                ExecutionEnvelope::failure(&error, elapsed).with_metadata("error_code", error.code())
            }
        }
    }
}

impl fmt::Debug for FnCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCapability")
            .field("name", &self.schema.name())
            .finish_non_exhaustive()
    }
}
