//! CAN-FD bridge implementations.
//!
//! - [`simulation`] - Software bridge with a motor controller model
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `CanFdBridge` trait from `ecu_common::hal::driver`
//! 3. Register the factory in [`register_all_drivers`]

pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    if let Err(e) = registry.register(simulation::DRIVER_NAME, simulation::create_driver) {
        tracing::warn!("{e}");
    }
}
