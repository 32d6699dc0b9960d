//! Output formatter trait

use capdispatch_domain::{
    CapabilityError, CapabilitySchema, ConfigIssue, ExecutionEnvelope, OutputFormat,
};

use super::console::ConsoleFormatter;
use super::json::JsonFormatter;

/// One configuration source as shown by `capdispatch config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub label: String,
    pub location: String,
    pub found: bool,
}

/// Everything `capdispatch config` prints.
#[derive(Debug, Clone)]
pub struct ConfigReport {
    /// Sources in priority order, highest first
    pub sources: Vec<SourceLine>,
    /// The merged configuration
    pub resolved: serde_json::Value,
    pub issues: Vec<ConfigIssue>,
}

/// Trait for rendering command results
pub trait OutputFormatter {
    /// Result of `call`
    fn format_envelope(&self, capability: &str, envelope: &ExecutionEnvelope) -> String;

    /// Result of `validate`
    fn format_validation(&self, capability: &str, result: &Result<(), CapabilityError>) -> String;

    /// Result of `list`
    fn format_list(&self, schemas: &[&CapabilitySchema]) -> String;

    /// Result of `describe`
    fn format_schema(&self, schema: &CapabilitySchema) -> String;

    /// Result of `config`
    fn format_config(&self, report: &ConfigReport) -> String;
}

/// The formatter for an output format.
pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Human => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Pretty JSON, falling back to compact on the (unreachable) error path.
pub fn to_pretty_json(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
