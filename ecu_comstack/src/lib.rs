//! # ECU Com Stack
//!
//! Communication-mode arbitration and network state management.
//!
//! ```text
//! requesters ──► ChannelModeRegistry ──► ModeDecisionEngine ──► CanNetwork ──► CanFdBridge
//!   (app, diag,     per-channel            system mode →          state machine,
//!    wake-up)       max-wins               bus target fan-out     motor frame codec
//! ```
//!
//! # Module Structure
//!
//! - [`fsm`] - Transition-table state machine behind each network
//! - [`comm`] - Channel Mode Registry and Mode Decision Engine
//! - [`network`] - CAN-FD network state machine
//! - [`stack`] - Assembly from configuration
//!
//! # Concurrency
//!
//! Registry and engine are shared through `&self`; their mutations are
//! serialized by internal locks and readers see only fully applied updates.
//! Each network has one owner at a time, enforced by the `Mutex` it is
//! shared in.

pub mod comm;
pub mod fsm;
pub mod network;
pub mod stack;

pub use comm::decision::ModeDecisionEngine;
pub use comm::registry::ChannelModeRegistry;
pub use network::CanNetwork;
pub use stack::ComStack;
