//! Capability domain module
//!
//! Defines how a named capability declares its input, how raw input is
//! checked against that declaration, and what every invocation returns.
//!
//! # Overview
//!
//! ```text
//! ┌──────────────────┐    ┌────────────────────┐    ┌───────────────────┐
//! │ CapabilitySchema │───▶│ ValidatedArguments │───▶│ ExecutionEnvelope │
//! │ (declaration)    │    │ (checked input)    │    │ (uniform result)  │
//! └────────┬─────────┘    └────────────────────┘    └───────────────────┘
//!          │
//!          └─ parameters: ParameterSpec (kind + enum/pattern/length/range)
//! ```
//!
//! # Key Types
//!
//! - [`Value`] / [`Arguments`]: neutral tagged union that raw JSON is decoded into
//! - [`ParameterSpec`] / [`CapabilitySchema`]: the input declaration
//! - [`ValidatedArguments`]: proof that input passed validation
//! - [`ExecutionEnvelope`]: success/failure, elapsed time, timestamp, metadata
//! - [`Capability`]: the contract every capability implements
//! - [`FnCapability`]: a capability built from a schema and an async closure
//! - [`CapabilityRegistry`]: name → capability table, read-only after startup
//! - [`Invocation`]: per-call state machine driven by the dispatcher
//!
//! # Architecture
//!
//! - **Domain** (this module): pure definitions, no I/O
//! - **Application** (`DispatchCapabilityUseCase`): lookup, validate, execute
//! - **Infrastructure**: command-backed and built-in capabilities

pub mod context;
pub mod envelope;
pub mod error;
pub mod function;
pub mod invocation;
pub mod registry;
pub mod schema;
pub mod traits;
pub mod validation;
pub mod value;

pub use context::{InvocationContext, Progress, ProgressSink};
pub use envelope::ExecutionEnvelope;
pub use error::{CapabilityError, RegistryError, SchemaError, ValidationFailure, Violation};
pub use function::{FnCapability, HandlerOutput};
pub use invocation::{Invocation, InvocationId, InvocationPhase};
pub use registry::CapabilityRegistry;
pub use schema::{CapabilityExample, CapabilitySchema, ParameterKind, ParameterSpec};
pub use traits::Capability;
pub use validation::{ValidatedArguments, validate_arguments};
pub use value::{Arguments, Value};
