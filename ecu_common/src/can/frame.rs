//! CAN-FD frames and the motor telemetry codec.
//!
//! Wire layout of both motor frames (all multi-byte fields little-endian,
//! bit-rate switch set):
//!
//! | Frame         | Id      | Len | 0..2        | 2..4         | 4          |
//! |---------------|---------|-----|-------------|--------------|------------|
//! | Motor command | `0x100` | 8   | speed (u16) | torque (i16) | mode (u8)  |
//! | Motor status  | `0x101` | 8   | speed (u16) | torque (i16) | fault (u8) |
//!
//! Bytes 5..8 are reserved and transmitted as zero.

use crate::consts::CANFD_MAX_PAYLOAD;
use thiserror::Error;

/// Identifier of the motor command frame.
pub const MOTOR_COMMAND_ID: u32 = 0x100;

/// Identifier of the motor status frame.
pub const MOTOR_STATUS_ID: u32 = 0x101;

/// Data length of both motor frames.
pub const MOTOR_FRAME_LEN: u8 = 8;

/// Frame construction error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("payload of {0} bytes exceeds the {max} byte CAN-FD limit", max = CANFD_MAX_PAYLOAD)]
    PayloadTooLong(usize),
}

/// Immutable CAN-FD frame, passed by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdFrame {
    /// Numeric identifier.
    pub id: u32,
    /// Payload length, `0..=64`.
    pub len: u8,
    /// Payload storage; bytes past `len` are zero.
    pub data: [u8; CANFD_MAX_PAYLOAD],
    /// Bit-rate switch: data phase runs at the fast rate.
    pub brs: bool,
}

impl FdFrame {
    /// Build a frame from a payload slice.
    ///
    /// # Errors
    /// `FrameError::PayloadTooLong` if `payload` exceeds 64 bytes.
    pub fn new(id: u32, payload: &[u8], brs: bool) -> Result<Self, FrameError> {
        if payload.len() > CANFD_MAX_PAYLOAD {
            return Err(FrameError::PayloadTooLong(payload.len()));
        }
        let mut data = [0u8; CANFD_MAX_PAYLOAD];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            id,
            len: payload.len() as u8,
            data,
            brs,
        })
    }

    /// Valid payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..usize::from(self.len).min(CANFD_MAX_PAYLOAD)]
    }

    /// Copy of this frame with a different identifier.
    #[inline]
    pub const fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }
}

impl Default for FdFrame {
    fn default() -> Self {
        Self {
            id: 0,
            len: 0,
            data: [0; CANFD_MAX_PAYLOAD],
            brs: false,
        }
    }
}

// ─── Motor Telemetry ────────────────────────────────────────────────

/// Command sent to the motor controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorCommand {
    pub speed: u16,
    pub torque: i16,
    pub mode: u8,
}

/// Status reported by the motor controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorStatus {
    pub speed: u16,
    pub torque: i16,
    pub fault: u8,
}

#[inline]
fn pack_motor(id: u32, speed: u16, torque: i16, last: u8) -> FdFrame {
    let mut data = [0u8; CANFD_MAX_PAYLOAD];
    data[0..2].copy_from_slice(&speed.to_le_bytes());
    data[2..4].copy_from_slice(&torque.to_le_bytes());
    data[4] = last;
    FdFrame {
        id,
        len: MOTOR_FRAME_LEN,
        data,
        brs: true,
    }
}

#[inline]
fn unpack_motor(frame: &FdFrame, id: u32) -> Option<(u16, i16, u8)> {
    if frame.id != id || frame.len < 5 {
        return None;
    }
    let d = &frame.data;
    Some((
        u16::from_le_bytes([d[0], d[1]]),
        i16::from_le_bytes([d[2], d[3]]),
        d[4],
    ))
}

impl MotorCommand {
    /// Pack into a `0x100` frame.
    pub fn to_frame(&self) -> FdFrame {
        pack_motor(MOTOR_COMMAND_ID, self.speed, self.torque, self.mode)
    }

    /// Unpack a `0x100` frame; `None` for any other identifier.
    pub fn from_frame(frame: &FdFrame) -> Option<Self> {
        unpack_motor(frame, MOTOR_COMMAND_ID).map(|(speed, torque, mode)| Self {
            speed,
            torque,
            mode,
        })
    }
}

impl MotorStatus {
    /// Pack into a `0x101` frame.
    pub fn to_frame(&self) -> FdFrame {
        pack_motor(MOTOR_STATUS_ID, self.speed, self.torque, self.fault)
    }

    /// Unpack a `0x101` frame; `None` for any other identifier.
    pub fn from_frame(frame: &FdFrame) -> Option<Self> {
        unpack_motor(frame, MOTOR_STATUS_ID).map(|(speed, torque, fault)| Self {
            speed,
            torque,
            fault,
        })
    }
}
