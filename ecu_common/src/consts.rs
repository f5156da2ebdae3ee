//! System-wide constants for the ECU com stack.
//!
//! Single source of truth for table sizes and wire-format limits.

use static_assertions::const_assert;

/// Maximum number of logical communication channels (CAN, LIN, FlexRay, Ethernet).
pub const MAX_CHANNELS: usize = 4;

/// Maximum number of concurrent requesters tracked per channel.
pub const MAX_REQUESTERS_PER_CHANNEL: usize = 16;

/// Maximum number of physical networks driven by the decision engine.
pub const MAX_NETWORKS: usize = 4;

/// Maximum CAN-FD payload length in bytes.
pub const CANFD_MAX_PAYLOAD: usize = 64;

/// Default CAN-FD data-phase bit rate (2 Mbit/s).
pub const DEFAULT_BAUD_RATE: u32 = 2_000_000;

/// Number of ADC channels with a notification slot.
pub const MAX_ADC_CHANNELS: usize = 4;

/// Capacity of the development error ring buffer.
pub const DET_MAX_ERROR_ENTRIES: usize = 32;

/// Vendor id stamped into every module's version info.
pub const VENDOR_ID: u16 = 0x1234;

const_assert!(MAX_CHANNELS <= u8::MAX as usize);
const_assert!(MAX_ADC_CHANNELS <= u8::MAX as usize);
const_assert!(CANFD_MAX_PAYLOAD <= u8::MAX as usize);
