//! JSON output: one pretty-printed document per command.

use capdispatch_domain::{CapabilityError, CapabilitySchema, ExecutionEnvelope};
use serde_json::json;

use super::formatter::{ConfigReport, OutputFormatter, to_pretty_json};

/// Formats results as JSON for scripts and tool-calling clients.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_envelope(&self, _capability: &str, envelope: &ExecutionEnvelope) -> String {
        to_pretty_json(envelope)
    }

    fn format_validation(&self, capability: &str, result: &Result<(), CapabilityError>) -> String {
        let value = match result {
            Ok(()) => json!({ "capability": capability, "valid": true }),
            Err(error) => {
                let mut value = json!({
                    "capability": capability,
                    "valid": false,
                    "error": error.to_string(),
                    "error_code": error.code(),
                });
                if let CapabilityError::Validation(failure) = error {
                    value["parameter"] = json!(failure.parameter);
                    value["violation"] = json!(failure.violation);
                }
                value
            }
        };
        to_pretty_json(&value)
    }

    fn format_list(&self, schemas: &[&CapabilitySchema]) -> String {
        let entries: Vec<serde_json::Value> = schemas
            .iter()
            .map(|s| json!({ "name": s.name(), "description": s.description() }))
            .collect();
        to_pretty_json(&entries)
    }

    fn format_schema(&self, schema: &CapabilitySchema) -> String {
        to_pretty_json(schema)
    }

    fn format_config(&self, report: &ConfigReport) -> String {
        let sources: Vec<serde_json::Value> = report
            .sources
            .iter()
            .map(|s| json!({ "label": s.label, "location": s.location, "found": s.found }))
            .collect();
        to_pretty_json(&json!({
            "sources": sources,
            "config": report.resolved,
            "issues": report.issues,
        }))
    }
}
