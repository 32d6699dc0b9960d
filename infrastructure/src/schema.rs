//! JSON Schema exporter.
//!
//! Default implementation of [`SchemaExportPort`] that produces a
//! provider-neutral JSON Schema tool definition per capability:
//!
//! ```json
//! { "name": "...", "description": "...",
//!   "input_schema": { "type": "object", "properties": {...}, "required": [...] } }
//! ```

use capdispatch_application::SchemaExportPort;
use capdispatch_domain::capability::{CapabilitySchema, ParameterSpec};
use serde_json::{Map, Value, json};

/// Default implementation producing provider-neutral JSON Schema.
///
/// Parameter kinds map one-to-one onto JSON Schema types. Constraints
/// (`enum`, `pattern`, `minLength`, `maxLength`, `minimum`, `maximum`) and
/// documented defaults are carried over.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaExporter;

impl JsonSchemaExporter {
    fn property(param: &ParameterSpec) -> Value {
        let mut prop = Map::new();
        prop.insert("type".to_string(), json!(param.kind.as_str()));
        prop.insert("description".to_string(), json!(param.description));

        if let Some(default) = &param.default {
            prop.insert("default".to_string(), default.to_json());
        }
        if !param.enum_values.is_empty() {
            prop.insert("enum".to_string(), json!(param.enum_values));
        }
        if let Some(pattern) = &param.pattern {
            prop.insert("pattern".to_string(), json!(pattern));
        }
        if let Some(min) = param.min_length {
            prop.insert("minLength".to_string(), json!(min));
        }
        if let Some(max) = param.max_length {
            prop.insert("maxLength".to_string(), json!(max));
        }
        if let Some(min) = param.minimum {
            prop.insert("minimum".to_string(), number(min));
        }
        if let Some(max) = param.maximum {
            prop.insert("maximum".to_string(), number(max));
        }

        Value::Object(prop)
    }
}

/// Whole bounds are written as integers (`1`, not `1.0`).
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

impl SchemaExportPort for JsonSchemaExporter {
    fn schema_to_json(&self, schema: &CapabilitySchema) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in schema.parameters() {
            properties.insert(param.name.clone(), Self::property(param));
            if param.required {
                required.push(json!(param.name));
            }
        }

        json!({
            "name": schema.name(),
            "description": schema.description(),
            "input_schema": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }
}
