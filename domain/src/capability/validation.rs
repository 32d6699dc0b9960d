//! Argument validation
//!
//! Checks an [`Arguments`] map against a [`CapabilitySchema`]. Parameters are
//! visited in schema order and each parameter's rules run in a fixed order:
//!
//! ```text
//! presence ─▶ type ─▶ enum ─▶ pattern ─▶ length ─▶ range
//! ```
//!
//! The first violation wins and is returned as a single
//! [`ValidationFailure`]; later problems are not reported. Keys that the
//! schema does not declare are ignored, and defaults are never injected.

use std::cmp::Ordering;
use std::ops::Deref;

use regex::Regex;

use super::error::{ValidationFailure, Violation};
use super::schema::{CapabilitySchema, ParameterKind, ParameterSpec};
use super::value::{Arguments, Value};

/// Arguments that passed validation against the named schema.
///
/// Only [`CapabilitySchema::validated`] can create one, so holding a value of
/// this type is proof that validation ran before execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedArguments {
    schema: String,
    arguments: Arguments,
}

impl ValidatedArguments {
    pub(crate) fn new(schema: String, arguments: Arguments) -> Self {
        Self { schema, arguments }
    }

    /// Name of the schema these arguments were validated against.
    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn into_inner(self) -> Arguments {
        self.arguments
    }
}

impl Deref for ValidatedArguments {
    type Target = Arguments;

    fn deref(&self) -> &Arguments {
        &self.arguments
    }
}

/// Validate `arguments` against `schema`, stopping at the first violation.
pub fn validate_arguments(
    schema: &CapabilitySchema,
    arguments: &Arguments,
) -> Result<(), ValidationFailure> {
    for param in schema.parameters() {
        let Some(value) = arguments.get(&param.name) else {
            if param.required {
                return Err(ValidationFailure::new(
                    &param.name,
                    Violation::Missing,
                    format!("required parameter '{}' is missing", param.name),
                ));
            }
            continue;
        };

        validate_value(schema, param, value)?;
    }

    Ok(())
}

fn validate_value(
    schema: &CapabilitySchema,
    param: &ParameterSpec,
    value: &Value,
) -> Result<(), ValidationFailure> {
    if !param.kind.accepts(value) {
        return Err(ValidationFailure::new(
            &param.name,
            Violation::Type,
            format!(
                "parameter '{}' must be {}, got {}",
                param.name,
                param.kind.with_article(),
                value.kind_name()
            ),
        )
        .with_value(value));
    }

    if !param.enum_values.is_empty() {
        let rendered = value.canonical_string();
        if !param.enum_values.iter().any(|allowed| *allowed == rendered) {
            return Err(ValidationFailure::new(
                &param.name,
                Violation::Enum,
                format!(
                    "parameter '{}' must be one of: {}",
                    param.name,
                    param.enum_values.join(", ")
                ),
            )
            .with_value(value));
        }
    }

    if let Value::String(text) = value
        && param.kind == ParameterKind::String
    {
        if let Some(pattern) = &param.pattern {
            check_pattern(schema, param, pattern, text, value)?;
        }
        check_length(param, text, value)?;
    }

    if param.kind.is_numeric() {
        check_range(param, value)?;
    }

    Ok(())
}

/// Unanchored: the value passes when the pattern matches anywhere in it.
fn check_pattern(
    schema: &CapabilitySchema,
    param: &ParameterSpec,
    pattern: &str,
    text: &str,
    value: &Value,
) -> Result<(), ValidationFailure> {
    let compiled = match schema.compiled_pattern(&param.name) {
        Some(compiled) => compiled.clone(),
        None => Regex::new(pattern).map_err(|e| e.to_string()),
    };

    match compiled {
        Ok(regex) if regex.is_match(text) => Ok(()),
        Ok(_) => Err(ValidationFailure::new(
            &param.name,
            Violation::Pattern,
            format!(
                "parameter '{}' does not match required pattern: {}",
                param.name, pattern
            ),
        )
        .with_value(value)),
        Err(reason) => Err(ValidationFailure::new(
            &param.name,
            Violation::InvalidPattern,
            format!(
                "parameter '{}' has invalid pattern '{}': {}",
                param.name, pattern, reason
            ),
        )
        .with_value(value)),
    }
}

/// Length is counted in bytes of the UTF-8 encoding.
fn check_length(param: &ParameterSpec, text: &str, value: &Value) -> Result<(), ValidationFailure> {
    let length = text.len();

    if let Some(min) = param.min_length
        && length < min
    {
        return Err(ValidationFailure::new(
            &param.name,
            Violation::MinLength,
            format!(
                "parameter '{}' must be at least {} characters long",
                param.name, min
            ),
        )
        .with_value(value));
    }

    if let Some(max) = param.max_length
        && length > max
    {
        return Err(ValidationFailure::new(
            &param.name,
            Violation::MaxLength,
            format!(
                "parameter '{}' must be at most {} characters long",
                param.name, max
            ),
        )
        .with_value(value));
    }

    Ok(())
}

fn check_range(param: &ParameterSpec, value: &Value) -> Result<(), ValidationFailure> {
    if let Some(min) = param.minimum
        && compare_to_bound(value, min) == Some(Ordering::Less)
    {
        return Err(ValidationFailure::new(
            &param.name,
            Violation::Minimum,
            format!("parameter '{}' must be at least {}", param.name, min),
        )
        .with_value(value));
    }

    if let Some(max) = param.maximum
        && compare_to_bound(value, max) == Some(Ordering::Greater)
    {
        return Err(ValidationFailure::new(
            &param.name,
            Violation::Maximum,
            format!("parameter '{}' must be at most {}", param.name, max),
        )
        .with_value(value));
    }

    Ok(())
}

/// 2^63, the first whole float above `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Order a numeric value against a (finite) bound.
///
/// Integers are compared exactly: casting them to `f64` rounds above 2^53.
fn compare_to_bound(value: &Value, bound: f64) -> Option<Ordering> {
    match value {
        Value::Integer(i) => Some(if bound >= I64_BOUND {
            Ordering::Less
        } else if bound < -I64_BOUND {
            Ordering::Greater
        } else if bound.fract() == 0.0 {
            i.cmp(&(bound as i64))
        } else {
            // A fractional bound is below 2^52 in magnitude, so rounding `i`
            // cannot move it across the bound.
            (*i as f64).total_cmp(&bound)
        }),
        Value::Float(f) => f.partial_cmp(&bound),
        _ => None,
    }
}
