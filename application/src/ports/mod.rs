//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod command_runner;
pub mod invocation_logger;
pub mod schema_export;
