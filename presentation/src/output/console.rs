//! Console output formatter for capability results

use crate::output::formatter::{ConfigReport, OutputFormatter, to_pretty_json};
use capdispatch_domain::{CapabilityError, CapabilitySchema, ExecutionEnvelope, Severity};
use colored::Colorize;

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// String output is shown as-is; anything else as pretty JSON.
    fn payload(value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.trim_end().to_string(),
            other => to_pretty_json(other),
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_envelope(&self, capability: &str, envelope: &ExecutionEnvelope) -> String {
        let mut output = String::new();
        let timing = format!("in {:.2}ms", envelope.elapsed_ms()).dimmed();

        if envelope.succeeded {
            output.push_str(&format!(
                "{} {} {}\n",
                "v".green().bold(),
                format!("{} succeeded", capability).green().bold(),
                timing
            ));
            if let Some(value) = &envelope.output {
                output.push('\n');
                output.push_str(&Self::payload(value));
                output.push('\n');
            }
        } else {
            output.push_str(&format!(
                "{} {} {}\n",
                "x".red().bold(),
                format!("{} failed", capability).red().bold(),
                timing
            ));
            output.push_str(&format!(
                "{} {}\n",
                "Error:".red(),
                envelope.error_message().unwrap_or("Unknown")
            ));
        }

        if !envelope.metadata.is_empty() {
            output.push('\n');
            for (key, value) in &envelope.metadata {
                let shown = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                output.push_str(&format!("  {} {}\n", format!("{}:", key).dimmed(), shown));
            }
        }

        output
    }

    fn format_validation(&self, capability: &str, result: &Result<(), CapabilityError>) -> String {
        match result {
            Ok(()) => format!(
                "{} arguments are valid for '{}'\n",
                "v".green().bold(),
                capability
            ),
            Err(error) => format!(
                "{} {} {}\n",
                "x".red().bold(),
                error,
                format!("[{}]", error.code()).dimmed()
            ),
        }
    }

    fn format_list(&self, schemas: &[&CapabilitySchema]) -> String {
        if schemas.is_empty() {
            return format!("{}\n", "No capabilities registered.".yellow());
        }

        let width = schemas.iter().map(|s| s.name().len()).max().unwrap_or(0);
        let mut output = String::new();
        for schema in schemas {
            output.push_str(&format!(
                "  {}  {}\n",
                format!("{:width$}", schema.name(), width = width).cyan().bold(),
                schema.description()
            ));
        }
        output
    }

    fn format_schema(&self, schema: &CapabilitySchema) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(schema.name()));
        output.push('\n');
        if !schema.description().is_empty() {
            output.push_str(schema.description());
            output.push('\n');
        }

        output.push_str(&Self::section_header("Parameters"));
        if schema.parameters().is_empty() {
            output.push_str("  (no parameters)\n");
        }
        for param in schema.parameters() {
            let line = format!("  {}\n", param.usage_line());
            if param.required {
                output.push_str(&line.bold().to_string());
            } else {
                output.push_str(&line);
            }
        }

        if !schema.examples().is_empty() {
            output.push_str(&Self::section_header("Examples"));
            for example in schema.examples() {
                output.push_str(&format!(
                    "\n  {}\n  $ capdispatch call {} --args '{}'\n  {} {}\n",
                    example.description.yellow(),
                    schema.name(),
                    example.parameters.to_json(),
                    "->".dimmed(),
                    example.expected
                ));
            }
        }

        output
    }

    fn format_config(&self, report: &ConfigReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n",
            "Configuration sources (in priority order):".cyan().bold()
        ));
        for source in &report.sources {
            let status = if source.found {
                "[FOUND]".green().to_string()
            } else {
                "[     ]".dimmed().to_string()
            };
            output.push_str(&format!(
                "  {} {:<8} {}\n",
                status,
                format!("{}:", source.label),
                source.location
            ));
        }

        output.push_str(&Self::section_header("Resolved configuration"));
        output.push_str(&to_pretty_json(&report.resolved));
        output.push('\n');

        if !report.issues.is_empty() {
            output.push_str(&Self::section_header("Issues"));
            for issue in &report.issues {
                let label = match issue.severity {
                    Severity::Error => "error:".red().bold(),
                    Severity::Warning => "warning:".yellow().bold(),
                };
                output.push_str(&format!("  {} {}\n", label, issue.message));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::formatter::SourceLine;
    use capdispatch_domain::{ConfigIssue, ConfigIssueCode, ParameterSpec};
    use serde_json::json;
    use std::time::Duration;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_success_envelope() {
        plain();
        let envelope = ExecutionEnvelope::success("hello\n", Duration::from_micros(1500))
            .with_metadata("exit_code", 0);
        let text = ConsoleFormatter.format_envelope("greet", &envelope);

        assert!(text.starts_with("v greet succeeded in 1.50ms"));
        assert!(text.contains("\nhello\n"));
        assert!(text.contains("exit_code: 0"));
    }

    #[test]
    fn test_failure_envelope() {
        plain();
        let envelope = ExecutionEnvelope::failure(&"disk full", Duration::ZERO)
            .with_metadata("error_code", "EXECUTION_FAILED");
        let text = ConsoleFormatter.format_envelope("store", &envelope);

        assert!(text.contains("x store failed"));
        assert!(text.contains("Error: disk full"));
        assert!(text.contains("error_code: EXECUTION_FAILED"));
    }

    #[test]
    fn test_structured_output_is_pretty_json() {
        plain();
        let envelope = ExecutionEnvelope::success(json!({"a": 1}), Duration::ZERO);
        let text = ConsoleFormatter.format_envelope("x", &envelope);
        assert!(text.contains("{\n  \"a\": 1\n}"));
    }

    #[test]
    fn test_list_aligns_names() {
        plain();
        let short = CapabilitySchema::new("ls", "List", vec![]).unwrap();
        let long = CapabilitySchema::new("deploy", "Deploy", vec![]).unwrap();
        let text = ConsoleFormatter.format_list(&[&long, &short]);
        assert_eq!(text, "  deploy  Deploy\n  ls      List\n");
        assert!(ConsoleFormatter.format_list(&[]).contains("No capabilities"));
    }

    #[test]
    fn test_schema_lists_parameters() {
        plain();
        let schema = CapabilitySchema::new(
            "deploy",
            "Deploy a service",
            vec![ParameterSpec::integer("port", "Port").with_range(1.0, 65535.0)],
        )
        .unwrap();
        let text = ConsoleFormatter.format_schema(&schema);
        assert!(text.contains("Deploy a service"));
        assert!(text.contains("port (integer): Port [range: 1..=65535]"));
    }

    #[test]
    fn test_validation_messages() {
        plain();
        assert_eq!(
            ConsoleFormatter.format_validation("echo", &Ok(())),
            "v arguments are valid for 'echo'\n"
        );
        let err = CapabilityError::NotFound("nope".into());
        assert_eq!(
            ConsoleFormatter.format_validation("nope", &Err(err)),
            "x capability 'nope' not found [NOT_FOUND]\n"
        );
    }

    #[test]
    fn test_config_report() {
        plain();
        let report = ConfigReport {
            sources: vec![SourceLine {
                label: "Project".into(),
                location: "./capdispatch.toml".into(),
                found: true,
            }],
            resolved: json!({"dispatch": {"timeout_secs": 30}}),
            issues: vec![ConfigIssue::warning(
                ConfigIssueCode::UnusedParameter,
                "parameter 'x' never appears in the command",
            )],
        };
        let text = ConsoleFormatter.format_config(&report);
        assert!(text.contains("[FOUND] Project: ./capdispatch.toml"));
        assert!(text.contains("\"timeout_secs\": 30"));
        assert!(text.contains("warning: parameter 'x' never appears"));
    }
}
