//! The capability contract.
//!
//! A capability is dispatchable when it can describe its input
//! ([`Capability::schema`]) and run on input that already passed validation
//! ([`Capability::execute`]). Expected failures never escape `execute`: they
//! come back as a failure [`ExecutionEnvelope`].

use async_trait::async_trait;

use super::context::InvocationContext;
use super::envelope::ExecutionEnvelope;
use super::error::ValidationFailure;
use super::schema::CapabilitySchema;
use super::validation::ValidatedArguments;
use super::value::Arguments;

/// A named, independently invocable unit of behavior.
///
/// Implementations must be safe to execute concurrently; the dispatcher
/// shares one instance across all calls.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Declared input shape. Built once, never changes.
    fn schema(&self) -> &CapabilitySchema;

    /// Stable name, unique across a registry.
    fn name(&self) -> &str {
        self.schema().name()
    }

    fn description(&self) -> &str {
        self.schema().description()
    }

    /// Check `arguments` against [`schema`](Self::schema).
    fn validate(&self, arguments: &Arguments) -> Result<ValidatedArguments, ValidationFailure> {
        self.schema().validated(arguments.clone())
    }

    /// Run the handler on validated input.
    ///
    /// `input` must have been validated against this capability's schema;
    /// passing arguments validated for another schema is a programming error.
    async fn execute(&self, ctx: &InvocationContext, input: &ValidatedArguments)
    -> ExecutionEnvelope;
}
