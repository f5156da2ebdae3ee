//! Motor controller model behind the simulated bus.

use ecu_common::can::frame::{MotorCommand, MotorStatus};

/// No fault.
pub const FAULT_NONE: u8 = 0x00;
/// Commanded torque exceeded the limit and was clamped.
pub const FAULT_OVERTORQUE: u8 = 0x01;

/// First-order motor model: speed ramps toward the command, torque is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorModel {
    speed: u16,
    /// Largest speed change per command.
    max_step: u16,
    torque_limit: i16,
    /// Fault forced by a test, reported until cleared.
    forced_fault: Option<u8>,
}

impl MotorModel {
    /// Model at standstill with the given ramp step and torque limit.
    pub fn new(max_step: u16, torque_limit: i16) -> Self {
        Self {
            speed: 0,
            max_step,
            torque_limit: torque_limit.saturating_abs(),
            forced_fault: None,
        }
    }

    /// Current simulated shaft speed.
    pub fn speed(&self) -> u16 {
        self.speed
    }

    /// Report `fault` on every status until cleared with `None`.
    pub fn force_fault(&mut self, fault: Option<u8>) {
        self.forced_fault = fault;
    }

    /// Advance one step toward `cmd` and report the resulting status.
    pub fn respond(&mut self, cmd: &MotorCommand) -> MotorStatus {
        self.speed = if cmd.speed >= self.speed {
            self.speed.saturating_add(self.max_step).min(cmd.speed)
        } else {
            self.speed.saturating_sub(self.max_step).max(cmd.speed)
        };

        let torque = cmd.torque.clamp(-self.torque_limit, self.torque_limit);
        let fault = match self.forced_fault {
            Some(fault) => fault,
            None if torque != cmd.torque => FAULT_OVERTORQUE,
            None => FAULT_NONE,
        };

        MotorStatus {
            speed: self.speed,
            torque,
            fault,
        }
    }
}

impl Default for MotorModel {
    fn default() -> Self {
        Self::new(u16::MAX, 1000)
    }
}
