//! Driver registry for CAN-FD bridges.
//!
//! Maps the `driver` name of a `[[networks]]` entry to a [`BridgeFactory`].
//! Every `create_bridge` call returns a fresh bridge with its own bus
//! state, because each network exclusively owns its bridge; two networks
//! naming the same driver never share a controller.
//!
//! The registry is passed to stack assembly explicitly; there is no global
//! instance. Registering a name twice is an error, not a replacement.

use ecu_common::hal::driver::{BridgeFactory, CanFdBridge, HalError};
use std::collections::HashMap;

/// Registry of available bridge drivers.
///
/// Constructed at startup, populated via `register()`, and consulted when
/// networks are built from configuration.
pub struct DriverRegistry {
    factories: HashMap<&'static str, BridgeFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with every built-in driver registered.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_all_drivers(&mut registry);
        registry
    }

    /// Register a bridge factory.
    ///
    /// # Errors
    /// Returns `HalError::InitFailed` if a driver with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: BridgeFactory) -> Result<(), HalError> {
        if self.factories.contains_key(name) {
            return Err(HalError::InitFailed(format!(
                "Driver '{name}' is already registered"
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Get a bridge factory by name.
    pub fn get_factory(&self, name: &str) -> Option<BridgeFactory> {
        self.factories.get(name).copied()
    }

    /// Create a bridge instance by name.
    ///
    /// # Errors
    /// Returns `HalError::DriverNotFound` if no driver with the given name is registered.
    pub fn create_bridge(&self, name: &str) -> Result<Box<dyn CanFdBridge>, HalError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| HalError::DriverNotFound(name.to_string()))?;
        Ok(factory())
    }

    /// List all registered driver names.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
