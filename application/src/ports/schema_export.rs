//! Schema export port.
//!
//! Separates "what a capability accepts" (domain) from "how that is
//! serialized for a tool-calling client" (infrastructure).

use capdispatch_domain::capability::{CapabilityRegistry, CapabilitySchema};

/// Port for converting capability schemas to provider-neutral JSON Schema.
pub trait SchemaExportPort: Send + Sync {
    /// Convert a single schema to a JSON Schema tool definition.
    fn schema_to_json(&self, schema: &CapabilitySchema) -> serde_json::Value;

    /// Convert every registered capability (sorted by name).
    fn all_schemas(&self, registry: &CapabilityRegistry) -> Vec<serde_json::Value> {
        registry
            .schemas()
            .into_iter()
            .map(|schema| self.schema_to_json(schema))
            .collect()
    }
}
