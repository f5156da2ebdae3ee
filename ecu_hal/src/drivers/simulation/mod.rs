//! Simulation driver module.
//!
//! Software CAN-FD bridge for development and testing without a
//! transceiver. A motor controller model answers every motor command
//! frame with a motor status frame.

mod bridge;
mod motor;

pub use bridge::{
    RX_QUEUE_CAPACITY, SUPPORTED_BAUD_RATES, SimulatedCanFd, SimulationHandle, TX_LOG_CAPACITY,
};
pub use motor::{FAULT_NONE, FAULT_OVERTORQUE, MotorModel};

use ecu_common::hal::driver::CanFdBridge;

/// Registry name of the simulation driver.
pub const DRIVER_NAME: &str = "simulation";

/// Factory function to create a simulation bridge instance.
pub fn create_driver() -> Box<dyn CanFdBridge> {
    Box::new(SimulatedCanFd::new())
}
