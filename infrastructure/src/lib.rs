//! Infrastructure layer for capdispatch
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration loading, command and built-in
//! capabilities, the shell command runner, JSON Schema export and the
//! JSONL invocation log.

pub mod capabilities;
pub mod config;
pub mod logging;
pub mod runner;
pub mod schema;

// Re-export commonly used types
pub use capabilities::{CapabilityCatalog, CommandCapability};
pub use config::{ConfigLoader, ConfigSource, FileConfig};
pub use logging::JsonlInvocationLogger;
pub use runner::ShellCommandRunner;
pub use schema::JsonSchemaExporter;
