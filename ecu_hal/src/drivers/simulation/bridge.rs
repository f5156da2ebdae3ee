//! Simulated CAN-FD bridge.
//!
//! The bus state sits behind an `Arc<Mutex<_>>` so a [`SimulationHandle`]
//! can inspect and steer it after the bridge itself has been moved into
//! its owning network.

use super::motor::MotorModel;
use ecu_common::can::frame::{FdFrame, MotorCommand};
use ecu_common::hal::driver::{BridgeDiagnostics, CanFdBridge, HalError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Data-phase bit rates the simulated transceiver accepts.
pub const SUPPORTED_BAUD_RATES: [u32; 5] = [500_000, 1_000_000, 2_000_000, 5_000_000, 8_000_000];

/// Number of transmitted frames retained for inspection.
pub const TX_LOG_CAPACITY: usize = 256;

/// Depth of the receive FIFO. On overrun the oldest frame is lost and
/// counted as an error.
pub const RX_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct SimBus {
    initialized: bool,
    baud_rate: Option<u32>,
    tx_log: VecDeque<FdFrame>,
    rx_queue: VecDeque<FdFrame>,
    init_failure: Option<HalError>,
    send_failures: VecDeque<HalError>,
    recv_failures: VecDeque<HalError>,
    motor: Option<MotorModel>,
    diag: BridgeDiagnostics,
}

impl SimBus {
    fn require_initialized(&self) -> Result<(), HalError> {
        if self.initialized {
            Ok(())
        } else {
            Err(HalError::CommunicationError(
                "controller not initialized".to_string(),
            ))
        }
    }

    fn push_rx(&mut self, frame: FdFrame) {
        if self.rx_queue.len() == RX_QUEUE_CAPACITY {
            self.rx_queue.pop_front();
            self.diag.errors += 1;
            warn!("sim rx overrun, oldest frame dropped");
        }
        self.rx_queue.push_back(frame);
    }
}

/// Software CAN-FD bridge.
pub struct SimulatedCanFd {
    bus: Arc<Mutex<SimBus>>,
}

impl SimulatedCanFd {
    /// Bridge with the default motor model attached.
    pub fn new() -> Self {
        Self::with_motor(Some(MotorModel::default()))
    }

    /// Bridge with no device on the bus; only injected frames are received.
    pub fn without_motor() -> Self {
        Self::with_motor(None)
    }

    /// Bridge with an optional motor model.
    pub fn with_motor(motor: Option<MotorModel>) -> Self {
        Self {
            bus: Arc::new(Mutex::new(SimBus {
                motor,
                ..SimBus::default()
            })),
        }
    }

    /// Shared handle for inspection and fault injection.
    pub fn handle(&self) -> SimulationHandle {
        SimulationHandle {
            bus: Arc::clone(&self.bus),
        }
    }
}

impl Default for SimulatedCanFd {
    fn default() -> Self {
        Self::new()
    }
}

impl CanFdBridge for SimulatedCanFd {
    fn name(&self) -> &'static str {
        super::DRIVER_NAME
    }

    fn init(&mut self) -> Result<(), HalError> {
        let mut bus = self.bus.lock();
        if let Some(err) = bus.init_failure.take() {
            bus.diag.errors += 1;
            return Err(err);
        }
        bus.initialized = true;
        info!("Simulated CAN-FD controller initialized");
        Ok(())
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), HalError> {
        let mut bus = self.bus.lock();
        bus.require_initialized()?;
        if !SUPPORTED_BAUD_RATES.contains(&baud_rate) {
            bus.diag.errors += 1;
            return Err(HalError::UnsupportedBaudRate(baud_rate));
        }
        bus.baud_rate = Some(baud_rate);
        info!(baud_rate, "Simulated CAN-FD data rate set");
        Ok(())
    }

    fn send(&mut self, frame: FdFrame) -> Result<(), HalError> {
        let mut bus = self.bus.lock();
        bus.require_initialized()?;
        if let Some(err) = bus.send_failures.pop_front() {
            bus.diag.errors += 1;
            return Err(err);
        }

        if bus.tx_log.len() == TX_LOG_CAPACITY {
            bus.tx_log.pop_front();
        }
        bus.tx_log.push_back(frame);
        bus.diag.frames_sent += 1;
        debug!(id = frame.id, len = frame.len, "sim tx");

        if let Some(cmd) = MotorCommand::from_frame(&frame)
            && let Some(motor) = bus.motor.as_mut()
        {
            let status = motor.respond(&cmd);
            bus.push_rx(status.to_frame());
        }
        Ok(())
    }

    fn recv(&mut self) -> Result<FdFrame, HalError> {
        let mut bus = self.bus.lock();
        bus.require_initialized()?;
        if let Some(err) = bus.recv_failures.pop_front() {
            bus.diag.errors += 1;
            return Err(err);
        }
        let frame = bus.rx_queue.pop_front().ok_or(HalError::RxEmpty)?;
        bus.diag.frames_received += 1;
        Ok(frame)
    }

    fn diagnostics(&self) -> Option<BridgeDiagnostics> {
        Some(self.bus.lock().diag)
    }
}

/// Inspection and fault-injection handle onto a simulated bus.
#[derive(Clone)]
pub struct SimulationHandle {
    bus: Arc<Mutex<SimBus>>,
}

impl SimulationHandle {
    /// Frames transmitted so far (most recent `TX_LOG_CAPACITY`).
    pub fn transmitted(&self) -> Vec<FdFrame> {
        self.bus.lock().tx_log.iter().copied().collect()
    }

    /// Most recently transmitted frame.
    pub fn last_transmitted(&self) -> Option<FdFrame> {
        self.bus.lock().tx_log.back().copied()
    }

    /// Place a frame in the receive queue, dropping the oldest when full.
    pub fn inject_rx(&self, frame: FdFrame) {
        self.bus.lock().push_rx(frame);
    }

    /// Frames waiting in the receive queue.
    pub fn pending_rx(&self) -> usize {
        self.bus.lock().rx_queue.len()
    }

    /// Make the next `init()` fail with `err`.
    pub fn fail_init(&self, err: HalError) {
        self.bus.lock().init_failure = Some(err);
    }

    /// Make the next `send()` fail with `err`. Failures queue up.
    pub fn fail_next_send(&self, err: HalError) {
        self.bus.lock().send_failures.push_back(err);
    }

    /// Make the next `recv()` fail with `err`. Failures queue up.
    pub fn fail_next_recv(&self, err: HalError) {
        self.bus.lock().recv_failures.push_back(err);
    }

    /// Force the motor model to report `fault` (or clear with `None`).
    pub fn force_motor_fault(&self, fault: Option<u8>) {
        if let Some(motor) = self.bus.lock().motor.as_mut() {
            motor.force_fault(fault);
        }
    }

    /// Whether `init()` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.bus.lock().initialized
    }

    /// Programmed data-phase bit rate.
    pub fn baud_rate(&self) -> Option<u32> {
        self.bus.lock().baud_rate
    }

    /// Bridge counters.
    pub fn diagnostics(&self) -> BridgeDiagnostics {
        self.bus.lock().diag
    }
}
