//! Communication mode management.
//!
//! - [`registry`] - Channel Mode Registry (per-channel max-wins arbitration)
//! - [`decision`] - Mode Decision Engine (system mode and network fan-out)

pub mod decision;
pub mod registry;
