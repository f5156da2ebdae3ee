//! Prelude module for common re-exports.
//!
//! ```rust
//! use ecu_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::comm::config::{ChannelConfig, ComStackConfig, NetworkConfig};
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Modes ──────────────────────────────────────────────────────────
pub use crate::comm::mode::{
    ChannelId, ComMode, ModeDecision, RequestSource, RequesterId, SystemMode,
};
pub use crate::comm::state::NetworkState;

// ─── Frames ─────────────────────────────────────────────────────────
pub use crate::can::frame::{
    FdFrame, MOTOR_COMMAND_ID, MOTOR_STATUS_ID, MotorCommand, MotorStatus,
};

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::det::{DetBuffer, ErrorReport, ErrorSink, TracingErrorSink, VersionInfo};
pub use crate::error::ComError;
pub use crate::hal::driver::{CanFdBridge, HalError};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CANFD_MAX_PAYLOAD, DEFAULT_BAUD_RATE, MAX_CHANNELS, MAX_NETWORKS};
