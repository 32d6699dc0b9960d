//! Capability schema model
//!
//! A [`CapabilitySchema`] is the single source of truth for what input a
//! capability accepts. It is built once at registration time and never
//! mutated afterwards; construction rejects malformed schemas with a
//! [`SchemaError`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::error::{SchemaError, ValidationFailure};
use super::validation::{self, ValidatedArguments};
use super::value::{Arguments, Value};

/// Accepted type of a single parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::Number => "number",
            ParameterKind::Integer => "integer",
            ParameterKind::Boolean => "boolean",
            ParameterKind::Object => "object",
            ParameterKind::Array => "array",
        }
    }

    /// Name with its indefinite article ("a string", "an integer").
    pub fn with_article(&self) -> &'static str {
        match self {
            ParameterKind::String => "a string",
            ParameterKind::Number => "a number",
            ParameterKind::Integer => "an integer",
            ParameterKind::Boolean => "a boolean",
            ParameterKind::Object => "an object",
            ParameterKind::Array => "an array",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ParameterKind::Number | ParameterKind::Integer)
    }

    /// Whether a value has the shape this kind requires.
    ///
    /// `integer` accepts integer values and whole floats that fit in `i64`,
    /// which is exactly what [`Value::as_i64`] can read back.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ParameterKind::String, Value::String(_)) => true,
            (ParameterKind::Number, Value::Integer(_) | Value::Float(_)) => true,
            (ParameterKind::Integer, Value::Integer(_)) => true,
            (ParameterKind::Integer, Value::Float(_)) => value.as_i64().is_some(),
            (ParameterKind::Boolean, Value::Bool(_)) => true,
            (ParameterKind::Object, Value::Object(_)) => true,
            (ParameterKind::Array, Value::Array(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParameterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(ParameterKind::String),
            "number" => Ok(ParameterKind::Number),
            "integer" => Ok(ParameterKind::Integer),
            "boolean" => Ok(ParameterKind::Boolean),
            "object" => Ok(ParameterKind::Object),
            "array" => Ok(ParameterKind::Array),
            other => Err(format!(
                "unknown parameter type '{}' (expected string, number, integer, boolean, object or array)",
                other
            )),
        }
    }
}

/// One named input slot and its constraints.
///
/// `default` is informational only: validation never injects it, handlers
/// apply it themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Allowed canonical string forms
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl ParameterSpec {
    /// Optional parameter of the given kind, without constraints.
    pub fn new(name: impl Into<String>, kind: ParameterKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
            default: None,
            enum_values: Vec::new(),
            pattern: None,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::String, description)
    }

    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Number, description)
    }

    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Integer, description)
    }

    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Boolean, description)
    }

    pub fn object(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Object, description)
    }

    pub fn array(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Array, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Inclusive length bounds, in bytes.
    pub fn with_length(self, min: usize, max: usize) -> Self {
        self.with_min_length(min).with_max_length(max)
    }

    pub fn with_minimum(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }

    pub fn with_maximum(mut self, max: f64) -> Self {
        self.maximum = Some(max);
        self
    }

    /// Inclusive numeric bounds.
    pub fn with_range(self, min: f64, max: f64) -> Self {
        self.with_minimum(min).with_maximum(max)
    }

    /// Construction-time checks for this parameter alone.
    fn check(&self, schema: &str) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyParameterName {
                schema: schema.to_string(),
            });
        }

        if self.kind != ParameterKind::String {
            let misplaced = [
                ("pattern", self.pattern.is_some()),
                ("minLength", self.min_length.is_some()),
                ("maxLength", self.max_length.is_some()),
            ]
            .into_iter()
            .find_map(|(constraint, set)| set.then_some(constraint));
            if let Some(constraint) = misplaced {
                return Err(SchemaError::StringConstraintOnNonString {
                    parameter: self.name.clone(),
                    kind: self.kind,
                    constraint,
                });
            }
        }

        if !self.kind.is_numeric() {
            let misplaced = [
                ("minimum", self.minimum.is_some()),
                ("maximum", self.maximum.is_some()),
            ]
            .into_iter()
            .find_map(|(constraint, set)| set.then_some(constraint));
            if let Some(constraint) = misplaced {
                return Err(SchemaError::NumericConstraintOnNonNumeric {
                    parameter: self.name.clone(),
                    kind: self.kind,
                    constraint,
                });
            }
        }

        if let (Some(min), Some(max)) = (self.min_length, self.max_length)
            && min > max
        {
            return Err(SchemaError::InvertedLength {
                parameter: self.name.clone(),
                min,
                max,
            });
        }

        if self.minimum.is_some_and(|v| !v.is_finite()) || self.maximum.is_some_and(|v| !v.is_finite())
        {
            return Err(SchemaError::NonFiniteBound {
                parameter: self.name.clone(),
            });
        }

        if let (Some(min), Some(max)) = (self.minimum, self.maximum)
            && min > max
        {
            return Err(SchemaError::InvertedRange {
                parameter: self.name.clone(),
                min,
                max,
            });
        }

        Ok(())
    }

    /// One-line summary of type and constraints for help output.
    pub fn usage_line(&self) -> String {
        let mut line = format!(
            "{} ({}{})",
            self.name,
            self.kind,
            if self.required { ", required" } else { "" }
        );
        if !self.description.is_empty() {
            line.push_str(": ");
            line.push_str(&self.description);
        }

        let mut notes = Vec::new();
        if !self.enum_values.is_empty() {
            notes.push(format!("one of: {}", self.enum_values.join(", ")));
        }
        if let Some(pattern) = &self.pattern {
            notes.push(format!("pattern: {}", pattern));
        }
        match (self.min_length, self.max_length) {
            (Some(min), Some(max)) => notes.push(format!("length: {}..={}", min, max)),
            (Some(min), None) => notes.push(format!("length: >= {}", min)),
            (None, Some(max)) => notes.push(format!("length: <= {}", max)),
            (None, None) => {}
        }
        match (self.minimum, self.maximum) {
            (Some(min), Some(max)) => notes.push(format!("range: {}..={}", min, max)),
            (Some(min), None) => notes.push(format!("range: >= {}", min)),
            (None, Some(max)) => notes.push(format!("range: <= {}", max)),
            (None, None) => {}
        }
        if let Some(default) = &self.default {
            notes.push(format!("default: {}", default));
        }

        if !notes.is_empty() {
            line.push_str(" [");
            line.push_str(&notes.join("; "));
            line.push(']');
        }
        line
    }
}

/// Usage example attached to a schema, for documentation only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityExample {
    pub description: String,
    pub parameters: Arguments,
    pub expected: String,
}

impl CapabilityExample {
    pub fn new(
        description: impl Into<String>,
        parameters: Arguments,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            parameters,
            expected: expected.into(),
        }
    }
}

/// A pattern compiled at construction; compile errors are kept and reported
/// as validation failures when the parameter is checked.
pub(crate) type CompiledPattern = Result<Regex, String>;

/// Declared input shape of one capability.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilitySchema {
    name: String,
    description: String,
    parameters: Vec<ParameterSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    examples: Vec<CapabilityExample>,
    /// Parameter name -> position in `parameters`
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    patterns: HashMap<String, CompiledPattern>,
}

impl CapabilitySchema {
    /// Build a schema, rejecting duplicate names and misplaced constraints.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ParameterSpec>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }

        let mut index = HashMap::with_capacity(parameters.len());
        let mut patterns = HashMap::new();
        for (position, param) in parameters.iter().enumerate() {
            param.check(&name)?;
            if index.insert(param.name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateParameter {
                    schema: name,
                    parameter: param.name.clone(),
                });
            }
            if let Some(pattern) = &param.pattern {
                patterns.insert(
                    param.name.clone(),
                    Regex::new(pattern).map_err(|e| e.to_string()),
                );
            }
        }

        Ok(Self {
            name,
            description: description.into(),
            parameters,
            examples: Vec::new(),
            index,
            patterns,
        })
    }

    pub fn with_example(mut self, example: CapabilityExample) -> Self {
        self.examples.push(example);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn examples(&self) -> &[CapabilityExample] {
        &self.examples
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.index.get(name).map(|&i| &self.parameters[i])
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| p.required)
    }

    pub(crate) fn compiled_pattern(&self, parameter: &str) -> Option<&CompiledPattern> {
        self.patterns.get(parameter)
    }

    /// Check arguments against this schema, reporting the first violation.
    pub fn validate(&self, arguments: &Arguments) -> Result<(), ValidationFailure> {
        validation::validate_arguments(self, arguments)
    }

    /// Validate and wrap arguments as proof of validation.
    pub fn validated(&self, arguments: Arguments) -> Result<ValidatedArguments, ValidationFailure> {
        self.validate(&arguments)?;
        Ok(ValidatedArguments::new(self.name.clone(), arguments))
    }

    /// Multi-line help text: description followed by one line per parameter.
    pub fn usage(&self) -> String {
        let mut text = format!("{} - {}", self.name, self.description);
        if self.parameters.is_empty() {
            text.push_str("\n  (no parameters)");
        }
        for param in &self.parameters {
            text.push_str("\n  ");
            text.push_str(&param.usage_line());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_kind_accepts() {
        assert!(ParameterKind::String.accepts(&Value::from("x")));
        assert!(!ParameterKind::String.accepts(&Value::Integer(1)));
        assert!(ParameterKind::Number.accepts(&Value::Integer(1)));
        assert!(ParameterKind::Number.accepts(&Value::Float(1.5)));
        assert!(ParameterKind::Integer.accepts(&Value::Integer(1)));
        assert!(ParameterKind::Integer.accepts(&Value::Float(2.0)));
        assert!(!ParameterKind::Integer.accepts(&Value::Float(2.5)));
        assert!(!ParameterKind::Integer.accepts(&Value::Float(1e20)));
        assert!(ParameterKind::Boolean.accepts(&Value::Bool(false)));
        assert!(!ParameterKind::Boolean.accepts(&Value::from("true")));
        assert!(ParameterKind::Array.accepts(&Value::Array(vec![])));
        assert!(ParameterKind::Object.accepts(&Value::Object(Default::default())));
        assert!(!ParameterKind::Object.accepts(&Value::Null));
    }

    #[test]
    fn test_parameter_kind_from_str() {
        assert_eq!("Integer".parse::<ParameterKind>(), Ok(ParameterKind::Integer));
        assert!("path".parse::<ParameterKind>().is_err());
    }

    #[test]
    fn test_schema_index_lookup() {
        let schema = CapabilitySchema::new(
            "deploy",
            "Deploy a service",
            vec![
                ParameterSpec::string("name", "Service name").required(),
                ParameterSpec::integer("replicas", "Replica count").with_range(1.0, 10.0),
            ],
        )
        .unwrap();

        assert_eq!(schema.parameter("replicas").unwrap().kind, ParameterKind::Integer);
        assert!(schema.parameter("missing").is_none());
        assert_eq!(schema.required_parameters().count(), 1);
        assert_eq!(schema.parameters()[0].name, "name");
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let err = CapabilitySchema::new(
            "dup",
            "",
            vec![
                ParameterSpec::string("name", "first"),
                ParameterSpec::integer("name", "second"),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateParameter {
                schema: "dup".into(),
                parameter: "name".into()
            }
        );
    }

    #[test]
    fn test_empty_names_rejected() {
        assert_eq!(
            CapabilitySchema::new(" ", "", vec![]).unwrap_err(),
            SchemaError::EmptyName
        );
        assert!(matches!(
            CapabilitySchema::new("x", "", vec![ParameterSpec::string("", "")]).unwrap_err(),
            SchemaError::EmptyParameterName { .. }
        ));
    }

    #[test]
    fn test_string_constraints_on_non_string_rejected() {
        let err = CapabilitySchema::new(
            "bad",
            "",
            vec![ParameterSpec::integer("port", "").with_pattern("^[0-9]+$")],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::StringConstraintOnNonString {
                constraint: "pattern",
                ..
            }
        ));

        let err = CapabilitySchema::new(
            "bad",
            "",
            vec![ParameterSpec::boolean("flag", "").with_max_length(3)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::StringConstraintOnNonString {
                constraint: "maxLength",
                ..
            }
        ));
    }

    #[test]
    fn test_numeric_constraints_on_string_rejected() {
        let err = CapabilitySchema::new(
            "bad",
            "",
            vec![ParameterSpec::string("name", "").with_minimum(1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::NumericConstraintOnNonNumeric { .. }));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert!(matches!(
            CapabilitySchema::new("b", "", vec![ParameterSpec::string("s", "").with_length(5, 2)])
                .unwrap_err(),
            SchemaError::InvertedLength { min: 5, max: 2, .. }
        ));
        assert!(matches!(
            CapabilitySchema::new("b", "", vec![ParameterSpec::number("n", "").with_range(3.0, 1.0)])
                .unwrap_err(),
            SchemaError::InvertedRange { .. }
        ));
        assert!(matches!(
            CapabilitySchema::new(
                "b",
                "",
                vec![ParameterSpec::number("n", "").with_maximum(f64::NAN)]
            )
            .unwrap_err(),
            SchemaError::NonFiniteBound { .. }
        ));
    }

    #[test]
    fn test_malformed_pattern_is_not_a_construction_error() {
        let schema = CapabilitySchema::new(
            "p",
            "",
            vec![ParameterSpec::string("s", "").with_pattern("([unclosed")],
        )
        .unwrap();
        assert!(matches!(schema.compiled_pattern("s"), Some(Err(_))));
    }

    #[test]
    fn test_serialize_uses_wire_field_names() {
        let schema = CapabilitySchema::new(
            "scan",
            "Scan things",
            vec![
                ParameterSpec::string("mode", "Scan mode")
                    .with_enum(["fast", "slow"])
                    .with_length(1, 8)
                    .with_default("fast"),
                ParameterSpec::integer("depth", "Depth").with_minimum(0.0),
            ],
        )
        .unwrap();

        let json = serde_json::to_value(&schema).unwrap();
        let mode = &json["parameters"][0];
        assert_eq!(mode["type"], "string");
        assert_eq!(mode["enum"], serde_json::json!(["fast", "slow"]));
        assert_eq!(mode["minLength"], 1);
        assert_eq!(mode["maxLength"], 8);
        assert_eq!(mode["default"], "fast");
        assert_eq!(mode["required"], false);
        assert!(mode.get("pattern").is_none());
        assert_eq!(json["parameters"][1]["minimum"], 0.0);
        assert!(json.get("examples").is_none());
        assert!(json.get("index").is_none());
    }

    #[test]
    fn test_usage_lists_parameters_in_order() {
        let schema = CapabilitySchema::new(
            "scan",
            "Scan things",
            vec![
                ParameterSpec::string("target", "What to scan").required(),
                ParameterSpec::string("mode", "Scan mode").with_enum(["fast", "slow"]),
            ],
        )
        .unwrap();

        let usage = schema.usage();
        let lines: Vec<&str> = usage.lines().collect();
        assert_eq!(lines[0], "scan - Scan things");
        assert_eq!(lines[1], "  target (string, required): What to scan");
        assert_eq!(lines[2], "  mode (string): Scan mode [one of: fast, slow]");
    }

    #[test]
    fn test_examples_attach() {
        let schema = CapabilitySchema::new("echo", "Echo", vec![])
            .unwrap()
            .with_example(CapabilityExample::new(
                "Say hi",
                Arguments::new().with("message", "hi"),
                "Returns hi",
            ));
        assert_eq!(schema.examples().len(), 1);
        assert_eq!(schema.examples()[0].parameters.get_str("message"), Some("hi"));
    }
}
