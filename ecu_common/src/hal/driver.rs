//! CAN-FD bridge trait and error types.
//!
//! This module defines:
//! - `CanFdBridge` trait - interface for pluggable bus hardware backends
//! - `HalError` enum - error types for bridge operations
//! - `BridgeFactory` type alias - factory function type
//! - `BridgeDiagnostics` struct - optional bridge counters

use crate::can::frame::FdFrame;
use thiserror::Error;

/// Error types for bridge operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Bridge initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Requested bit rate not supported by the transceiver
    #[error("Unsupported baud rate: {0} bit/s")]
    UnsupportedBaudRate(u32),

    /// Hardware communication error
    #[error("Hardware communication error: {0}")]
    CommunicationError(String),

    /// Receive buffer holds no frame
    #[error("Receive buffer empty")]
    RxEmpty,

    /// Controller entered bus-off
    #[error("Bus-off")]
    BusOff,

    /// Driver not found in registry
    #[error("Driver not found: {0}")]
    DriverNotFound(String),
}

/// Factory function type for creating bridge instances.
pub type BridgeFactory = fn() -> Box<dyn CanFdBridge>;

/// Optional bridge counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeDiagnostics {
    pub frames_sent: u64,
    pub frames_received: u64,
    pub errors: u64,
}

/// Interface to one CAN-FD controller/transceiver.
///
/// The owning network state machine is the only caller; no other
/// component may issue I/O for the same bus.
///
/// # Timing Contracts
///
/// | Operation | Blocking |
/// |-----------|----------|
/// | `init()` / `set_baud_rate()` | May block (pre-communication) |
/// | `send()` / `recv()` | Non-blocking poll or bridge-enforced bounded timeout |
///
/// Retries, if any, belong to the bridge. Callers propagate errors unchanged.
pub trait CanFdBridge: Send {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Bring up the controller.
    fn init(&mut self) -> Result<(), HalError>;

    /// Program the data-phase bit rate.
    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), HalError>;

    /// Queue one frame for transmission.
    fn send(&mut self, frame: FdFrame) -> Result<(), HalError>;

    /// Poll for one received frame. `HalError::RxEmpty` when nothing is pending.
    fn recv(&mut self) -> Result<FdFrame, HalError>;

    /// Get bridge counters.
    /// Default: None
    fn diagnostics(&self) -> Option<BridgeDiagnostics> {
        None
    }
}
