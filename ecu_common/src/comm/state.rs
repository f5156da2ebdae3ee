//! Network state enum shared by the network state machine and its callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one physical network.
///
/// `Uninitialized -> Initialized -> Ready -> {Silent, FullCommunication}`,
/// plus `Faulted`, which only `Shutdown` leaves, and the terminal `Shutdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum NetworkState {
    #[default]
    Uninitialized = 0,
    /// Hardware programmed, readiness not yet granted upstream.
    Initialized = 1,
    /// Ready to communicate; bus mode not yet applied.
    Ready = 2,
    Silent = 3,
    FullCommunication = 4,
    /// Unrecoverable hardware error; only a shutdown leaves it.
    Faulted = 5,
    /// Orderly shutdown; terminal.
    Shutdown = 6,
}

impl NetworkState {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Uninitialized),
            1 => Some(Self::Initialized),
            2 => Some(Self::Ready),
            3 => Some(Self::Silent),
            4 => Some(Self::FullCommunication),
            5 => Some(Self::Faulted),
            6 => Some(Self::Shutdown),
            _ => None,
        }
    }

    /// Transmit/receive permitted (`Ready` or a communicating state).
    #[inline]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready | Self::Silent | Self::FullCommunication)
    }
}

impl fmt::Display for NetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "UNINIT",
            Self::Initialized => "INIT",
            Self::Ready => "READY",
            Self::Silent => "SILENT",
            Self::FullCommunication => "FULL_COM",
            Self::Faulted => "FAULTED",
            Self::Shutdown => "SHUTDOWN",
        };
        f.write_str(name)
    }
}
