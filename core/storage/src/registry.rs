//! Provider registry for dynamic provider resolution.

use std::collections::HashMap;
use std::sync::Arc;
use serde_json::Value;

use docmirror_common::{Error, ProviderKind, Result};
use crate::provider::CloudProvider;

/// Factory function type for creating providers.
pub type ProviderFactory = Box<dyn Fn(Value) -> Result<Arc<dyn CloudProvider>> + Send + Sync>;

/// Registry for cloud provider factories.
///
/// Allows dynamic registration and resolution of providers by name and
/// configuration. The set of real backends is closed; the registry exists
/// so callers pick one by config rather than by concrete type.
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a provider factory.
    ///
    /// # Errors
    /// - Returns error if name is already registered
    pub fn register(&mut self, name: impl Into<String>, factory: ProviderFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::InvalidInput(format!(
                "Provider '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Resolve a provider by name and configuration.
    ///
    /// # Errors
    /// - Provider not found
    /// - Configuration invalid
    pub fn resolve(&self, name: &str, config: Value) -> Result<Arc<dyn CloudProvider>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("Provider '{}' is not registered", name)))?;
        factory(config)
    }

    /// Get list of registered provider names.
    pub fn providers(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Check if a provider is registered.
    pub fn has_provider(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with the default providers.
pub fn create_default_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    // Register memory provider (for testing)
    registry
        .register(
            "memory",
            Box::new(|_config| {
                Ok(Arc::new(crate::memory::MemoryCloudProvider::new(
                    ProviderKind::Dropbox,
                )))
            }),
        )
        .expect("Failed to register memory provider");

    // Register Dropbox provider
    registry
        .register(
            "dropbox",
            Box::new(crate::dropbox::create_dropbox_provider),
        )
        .expect("Failed to register dropbox provider");

    // Register Google Drive provider
    registry
        .register("gdrive", Box::new(crate::gdrive::create_gdrive_provider))
        .expect("Failed to register gdrive provider");

    registry
}
