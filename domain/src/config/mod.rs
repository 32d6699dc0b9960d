//! Configuration value objects for the domain layer
//!
//! Shared by the configuration loader (which produces issues) and the
//! presentation layer (which renders them and picks an output format).

mod issue;
mod output_format;

pub use issue::{ConfigIssue, ConfigIssueCode, Severity};
pub use output_format::OutputFormat;
