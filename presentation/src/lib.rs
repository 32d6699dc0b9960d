//! Presentation layer for capdispatch
//!
//! This crate contains CLI definitions, output formatters
//! and progress reporters.

pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{ArgsInput, Cli, Command, OutputArg};
pub use config::OutputConfig;
pub use output::console::ConsoleFormatter;
pub use output::formatter::{ConfigReport, OutputFormatter, SourceLine, formatter_for};
pub use output::json::JsonFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
