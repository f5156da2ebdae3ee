//! ECU Common Library
//!
//! Shared types for the communication-mode stack of the ECU basic software.
//!
//! # Module Structure
//!
//! - [`comm`] - Communication modes, system modes, decisions and the channel table
//! - [`can`] - CAN-FD frames and the motor telemetry codec
//! - [`hal`] - Hardware bridge trait and bridge errors
//! - [`det`] - Development error tracer (error sink) and version info
//! - [`error`] - Stack-wide error type
//! - [`config`] - TOML configuration loading
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use ecu_common::prelude::*;
//!
//! let frame = MotorCommand { speed: 1000, torque: 50, mode: 0 }.to_frame();
//! assert_eq!(frame.id, MOTOR_COMMAND_ID);
//! ```

pub mod can;
pub mod comm;
pub mod config;
pub mod consts;
pub mod det;
pub mod error;
pub mod hal;
pub mod prelude;
