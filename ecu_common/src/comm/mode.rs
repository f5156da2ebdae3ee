//! Communication mode enums and identifiers.
//!
//! All enums use `#[repr(u8)]` so the raw codes exchanged with requesters
//! and diagnostic tooling map one-to-one onto variants. Raw decoding goes
//! through `from_u8`, which returns `None` for out-of-range codes.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Channel Modes ──────────────────────────────────────────────────

/// Bus activity level of a logical channel.
///
/// Totally ordered: `NoCommunication < SilentCommunication < FullCommunication`.
/// Arbitration is max-wins over this ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[repr(u8)]
pub enum ComMode {
    /// No traffic on the bus.
    #[default]
    #[serde(rename = "none")]
    NoCommunication = 0,
    /// Listen-only.
    #[serde(rename = "silent")]
    SilentCommunication = 1,
    /// Full duplex traffic.
    #[serde(rename = "full")]
    FullCommunication = 2,
}

impl ComMode {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::NoCommunication),
            1 => Some(Self::SilentCommunication),
            2 => Some(Self::FullCommunication),
            _ => None,
        }
    }

    /// True for `SilentCommunication` and `FullCommunication`.
    #[inline]
    pub const fn is_communicating(self) -> bool {
        !matches!(self, Self::NoCommunication)
    }
}

// ─── System Modes ───────────────────────────────────────────────────

/// System-wide mode owned by the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum SystemMode {
    #[default]
    Normal = 0,
    Silent = 1,
    /// Diagnostic session; still needs full communication on the bus.
    Diagnostic = 2,
}

impl SystemMode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Normal),
            1 => Some(Self::Silent),
            2 => Some(Self::Diagnostic),
            _ => None,
        }
    }
}

/// Originator of a system mode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RequestSource {
    /// Communication manager / application logic.
    Communication = 1,
    /// Vehicle diagnostics.
    Diagnostic = 2,
}

impl RequestSource {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Communication),
            2 => Some(Self::Diagnostic),
            _ => None,
        }
    }
}

// ─── Identifiers ────────────────────────────────────────────────────

/// Logical channel identifier, stable and assigned at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u8);

impl ChannelId {
    pub const CAN: Self = Self(0);
    pub const LIN: Self = Self(1);
    pub const FLEXRAY: Self = Self(2);
    pub const ETHERNET: Self = Self(3);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a party requesting a channel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequesterId(pub u16);

impl RequesterId {
    /// Vehicle diagnostics.
    pub const DIAGNOSTIC: Self = Self(0x0001);
    /// Application software components.
    pub const APPLICATION: Self = Self(0x0002);
    /// Wake-up sources (bus or local).
    pub const WAKEUP: Self = Self(0x0003);
    /// Network state machines asking for readiness after hardware init.
    pub const NETWORK: Self = Self(0x0010);
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

// ─── Decisions ──────────────────────────────────────────────────────

/// Output of one decision-engine pass.
///
/// Superseded by the next pass; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDecision {
    /// System mode that produced this decision.
    pub system_mode: SystemMode,
    /// Bus mode issued to the networks.
    pub target: ComMode,
    /// Who asked for it (audit only).
    pub source: RequestSource,
    /// Monotonic pass counter.
    pub sequence: u64,
}
