//! Stack-wide error type.
//!
//! Validation errors (`InvalidChannel`, `InvalidMode`, `InvalidSource`,
//! `InvalidLength`, `RequesterCapacity`) are reported to the error sink at
//! the API boundary and never leave shared state mutated. `NotReady` is an
//! expected polling outcome and is not reported. `HardwareFailure` carries
//! the bridge error unchanged.

use crate::comm::state::NetworkState;
use crate::det::error_id;
use crate::hal::driver::HalError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComError {
    /// Channel id outside the configured set.
    #[error("invalid channel {channel}")]
    InvalidChannel { channel: u8 },

    /// Mode code out of range or above the channel's maximum.
    #[error("invalid mode {mode:#04x}")]
    InvalidMode { mode: u8 },

    /// Request source code out of range.
    #[error("invalid request source {code:#04x}")]
    InvalidSource { code: u8 },

    /// Frame length above the CAN-FD payload limit.
    #[error("frame length {len} exceeds the CAN-FD payload limit")]
    InvalidLength { len: u8 },

    /// Requester table of the channel is full.
    #[error("requester table of channel {channel} is full")]
    RequesterCapacity { channel: u8 },

    /// Network not in a state that allows the operation.
    #[error("network not ready (state {state})")]
    NotReady { state: NetworkState },

    /// One network of a fan-out failed.
    #[error("network {network} failed: {source}")]
    NetworkFailed {
        network: String,
        #[source]
        source: Box<ComError>,
    },

    /// Error from the hardware bridge, unchanged.
    #[error("hardware failure: {0}")]
    HardwareFailure(#[from] HalError),
}

impl ComError {
    /// Error id used when reporting to the error sink.
    pub fn det_error_id(&self) -> u8 {
        match self {
            Self::InvalidChannel { .. } => error_id::PARAM_CHANNEL,
            Self::InvalidMode { .. } => error_id::PARAM_MODE,
            Self::InvalidSource { .. } => error_id::PARAM_SOURCE,
            Self::InvalidLength { .. } => error_id::PARAM_LENGTH,
            Self::RequesterCapacity { .. } => error_id::CAPACITY,
            Self::NotReady { .. } => error_id::UNINIT,
            Self::NetworkFailed { source, .. } => source.det_error_id(),
            Self::HardwareFailure(_) => error_id::HW_FAILURE,
        }
    }
}
