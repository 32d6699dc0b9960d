//! Command capabilities from TOML (`[capabilities.command.<name>]`)
//!
//! Registers external commands as first-class capabilities. The command
//! template uses `{param_name}` placeholders that are replaced with
//! shell-escaped argument values at execution time.
//!
//! ```toml
//! [capabilities.command.disk_usage]
//! description = "Report disk usage for a path"
//! command = "du -sh {path}"
//!
//! [[capabilities.command.disk_usage.parameters]]
//! name = "path"
//! type = "string"
//! description = "Path to measure"
//! required = true
//! min_length = 1
//! ```

use capdispatch_domain::capability::{CapabilitySchema, ParameterKind, ParameterSpec, Value};
use capdispatch_domain::config::{ConfigIssue, ConfigIssueCode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::LazyLock;

/// `{name}` placeholder in a command template.
pub static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid")
});

/// `[capabilities]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCapabilitiesConfig {
    /// Command-backed capabilities by name
    pub command: BTreeMap<String, FileCommandCapabilityConfig>,
}

/// One parameter of a command capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCapabilityParameter {
    pub name: String,
    /// "string", "number", "integer", "boolean", "object" or "array"
    #[serde(rename = "type", default = "default_string_type")]
    pub param_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

fn default_string_type() -> String {
    "string".to_string()
}

impl FileCapabilityParameter {
    pub fn kind(&self) -> Result<ParameterKind, String> {
        self.param_type.parse()
    }

    pub fn to_parameter_spec(&self) -> Result<ParameterSpec, String> {
        let mut spec = ParameterSpec::new(self.name.as_str(), self.kind()?, self.description.as_str());
        spec.required = self.required;
        spec.default = self.default.clone();
        spec.enum_values = self.enum_values.clone();
        spec.pattern = self.pattern.clone();
        spec.min_length = self.min_length;
        spec.max_length = self.max_length;
        spec.minimum = self.minimum;
        spec.maximum = self.maximum;
        Ok(spec)
    }
}

/// A command capability definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileCommandCapabilityConfig {
    /// Human-readable description of what this capability does
    #[serde(default)]
    pub description: String,
    /// Command template with `{param_name}` placeholders
    pub command: String,
    /// Directory to run the command in (default: current directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    /// Parameters, in the order they are documented and validated
    #[serde(default)]
    pub parameters: Vec<FileCapabilityParameter>,
}

impl FileCommandCapabilityConfig {
    /// Placeholder names referenced by the command template.
    pub fn placeholders(&self) -> BTreeSet<&str> {
        PLACEHOLDER
            .captures_iter(&self.command)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect()
    }

    /// Build the capability schema.
    pub fn to_schema(&self, name: &str) -> Result<CapabilitySchema, ConfigIssue> {
        let parameters = self
            .parameters
            .iter()
            .map(|p| {
                p.to_parameter_spec().map_err(|e| {
                    ConfigIssue::error(
                        ConfigIssueCode::UnknownParameterType,
                        format!("capabilities.command.{}.{}: {}", name, p.name, e),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        CapabilitySchema::new(name, self.description.as_str(), parameters).map_err(|e| {
            ConfigIssue::error(
                ConfigIssueCode::InvalidSchema,
                format!("capabilities.command.{}: {}", name, e),
            )
        })
    }

    /// All issues with this definition. Any error means it is not registered.
    pub fn validate(&self, name: &str) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.command.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyCommand,
                format!("capabilities.command.{}: command is empty", name),
            ));
        }

        if let Err(issue) = self.to_schema(name) {
            issues.push(issue);
        }

        let placeholders = self.placeholders();
        let declared: BTreeSet<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();

        for placeholder in placeholders.difference(&declared) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::UndeclaredPlaceholder,
                format!(
                    "capabilities.command.{}: placeholder '{{{}}}' has no parameter and is always removed",
                    name, placeholder
                ),
            ));
        }

        for parameter in declared.difference(&placeholders) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::UnusedParameter,
                format!(
                    "capabilities.command.{}: parameter '{}' never appears in the command",
                    name, parameter
                ),
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capdispatch_domain::config::Severity;

    fn parameter(name: &str, param_type: &str) -> FileCapabilityParameter {
        FileCapabilityParameter {
            name: name.to_string(),
            param_type: param_type.to_string(),
            description: String::new(),
            required: true,
            default: None,
            enum_values: Vec::new(),
            pattern: None,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
        }
    }

    fn command(template: &str, parameters: Vec<FileCapabilityParameter>) -> FileCommandCapabilityConfig {
        FileCommandCapabilityConfig {
            description: "test".to_string(),
            command: template.to_string(),
            working_dir: None,
            parameters,
        }
    }

    #[test]
    fn test_deserialize_parameter_list() {
        let toml_str = r#"
description = "Report disk usage for a path"
command = "du -sh {path}"

[[parameters]]
name = "path"
type = "string"
description = "Path to measure"
required = true
min_length = 1

[[parameters]]
name = "depth"
type = "integer"
minimum = 0
maximum = 5
"#;
        let config: FileCommandCapabilityConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.parameters.len(), 2);
        assert_eq!(config.parameters[0].min_length, Some(1));
        assert!(!config.parameters[1].required);
        assert_eq!(config.parameters[1].maximum, Some(5.0));

        let schema = config.to_schema("disk_usage").unwrap();
        assert_eq!(schema.parameters()[0].name, "path");
        assert_eq!(schema.parameters()[1].kind, ParameterKind::Integer);
    }

    #[test]
    fn test_type_defaults_to_string() {
        let config: FileCapabilityParameter = toml::from_str("name = \"path\"").unwrap();
        assert_eq!(config.kind(), Ok(ParameterKind::String));
    }

    #[test]
    fn test_placeholders() {
        let config = command("grep {pattern} {path} {not-a-placeholder} {}", vec![]);
        let found: Vec<&str> = config.placeholders().into_iter().collect();
        assert_eq!(found, vec!["path", "pattern"]);
    }

    #[test]
    fn test_validate_clean_definition() {
        let config = command("du -sh {path}", vec![parameter("path", "string")]);
        assert!(config.validate("disk_usage").is_empty());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let config = command(
            "   ",
            vec![parameter("path", "path"), parameter("path", "string")],
        );
        let issues = config.validate("broken");
        let codes: Vec<ConfigIssueCode> = issues.iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::EmptyCommand,
                ConfigIssueCode::UnknownParameterType,
                ConfigIssueCode::UnusedParameter,
            ]
        );
        assert!(issues[1].message.contains("unknown parameter type 'path'"));
    }

    #[test]
    fn test_invalid_schema_is_error() {
        let mut port = parameter("port", "integer");
        port.pattern = Some("^[0-9]+$".to_string());
        let issues = command("serve {port}", vec![port]).validate("serve");

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::InvalidSchema);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_placeholder_mismatches_are_warnings() {
        let issues = command("echo {message} {extra}", vec![
            parameter("message", "string"),
            parameter("unused", "string"),
        ])
        .validate("echo_cmd");

        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
        assert_eq!(issues[0].code, ConfigIssueCode::UndeclaredPlaceholder);
        assert_eq!(issues[1].code, ConfigIssueCode::UnusedParameter);
    }
}
