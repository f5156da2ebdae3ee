//! # ECU HAL Library
//!
//! Hardware side of the com stack. Bridges implement the `CanFdBridge`
//! trait defined in `ecu_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Bridge factory registration
//! - [`drivers`] - Bridge implementations
//! - [`adc`] - Per-channel ADC conversion notification slots
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                       ecu_hal                          │
//! │  ┌─────────────────┐        ┌───────────────────────┐  │
//! │  │ DriverRegistry  │──────► │ CanFdBridge (trait)   │  │
//! │  │ name → factory  │        │  simulation, ...      │  │
//! │  └─────────────────┘        └───────────────────────┘  │
//! │  ┌─────────────────┐                                   │
//! │  │ AdcNotifier     │  channel → Option<handler>        │
//! │  └─────────────────┘                                   │
//! └────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod adc;
pub mod driver_registry;
pub mod drivers;

pub use crate::adc::AdcNotifier;
pub use crate::driver_registry::DriverRegistry;
