//! Capability registry
//!
//! Name → capability lookup table. The table is populated once at startup
//! (registration needs `&mut self`) and then shared read-only behind an
//! `Arc`, so lookups need no locking.
//!
//! ```ignore
//! let mut registry = CapabilityRegistry::new();
//! registry.register(echo_capability())?;
//! let registry = Arc::new(registry);
//!
//! let cap = registry.get("echo").unwrap();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::error::RegistryError;
use super::schema::CapabilitySchema;
use super::traits::Capability;

#[derive(Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under its own name.
    ///
    /// Empty and duplicate names are rejected; an existing entry is never
    /// overwritten.
    pub fn register<C: Capability + 'static>(&mut self, capability: C) -> Result<(), RegistryError> {
        self.register_arc(Arc::new(capability))
    }

    /// Register a capability (Arc version)
    pub fn register_arc(&mut self, capability: Arc<dyn Capability>) -> Result<(), RegistryError> {
        let name = capability.name().to_string();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.capabilities.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.capabilities.insert(name, capability);
        Ok(())
    }

    /// Register several capabilities, keeping every one that succeeds.
    ///
    /// Returns the errors of the ones that were rejected, in input order.
    pub fn register_all<I>(&mut self, capabilities: I) -> Vec<RegistryError>
    where
        I: IntoIterator<Item = Arc<dyn Capability>>,
    {
        capabilities
            .into_iter()
            .filter_map(|capability| self.register_arc(capability).err())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.capabilities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Schemas of all registered capabilities, sorted by name.
    pub fn schemas(&self) -> Vec<&CapabilitySchema> {
        let mut schemas: Vec<&CapabilitySchema> =
            self.capabilities.values().map(|c| c.schema()).collect();
        schemas.sort_by(|a, b| a.name().cmp(b.name()));
        schemas
    }

    /// Schema (with examples) of one capability.
    pub fn describe(&self, name: &str) -> Option<&CapabilitySchema> {
        self.capabilities.get(name).map(|c| c.schema())
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &self.names())
            .finish()
    }
}
