//! Domain layer for capdispatch
//!
//! This crate contains the capability model: schemas, the validator, the
//! execution envelope, the capability contract and the registry.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Capability
//!
//! A named, independently invocable unit of behavior with a declared input
//! schema. Input is validated against the schema before the handler runs;
//! the handler's outcome is always wrapped in an [`ExecutionEnvelope`].
//!
//! ## Registry
//!
//! An explicit [`CapabilityRegistry`] value, populated once at startup and
//! shared read-only afterwards. There is no process-wide singleton.

pub mod capability;
pub mod config;

// Re-export commonly used types
pub use capability::{
    Arguments, Capability, CapabilityError, CapabilityExample, CapabilityRegistry,
    CapabilitySchema, ExecutionEnvelope, FnCapability, HandlerOutput, Invocation,
    InvocationContext, InvocationId, InvocationPhase, ParameterKind, ParameterSpec, Progress,
    ProgressSink, RegistryError, SchemaError, ValidatedArguments, ValidationFailure, Value,
    Violation, validate_arguments,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
