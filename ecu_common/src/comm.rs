//! Communication mode types, network states and the channel/network configuration table.

pub mod config;
pub mod mode;
pub mod state;
