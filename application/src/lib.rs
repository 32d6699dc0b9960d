//! Application layer for capdispatch
//!
//! This crate contains the dispatch use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::DispatchConfig;
pub use ports::{
    command_runner::{CommandOutput, CommandRunner, RunnerError},
    invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger},
    schema_export::SchemaExportPort,
};
pub use use_cases::dispatch::{DispatchCapabilityUseCase, DispatchOptions, DispatchRequest};
