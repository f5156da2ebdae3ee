//! CAN-FD network state machine.
//!
//! A `CanNetwork` exclusively owns its bridge. State-mutating calls take
//! `&mut self`; a network shared with the decision engine lives behind one
//! `parking_lot::Mutex`, which serializes a transition with the bridge I/O
//! it triggers.

use crate::comm::decision::ModeTarget;
use crate::comm::registry::ChannelModeRegistry;
use crate::fsm::{StateMachine, TransitionResult};
use crate::network::state::{NetworkEffect, NetworkEvent, NetworkTable, mode_for_state};
use ecu_common::can::frame::{FdFrame, MotorCommand, MotorStatus};
use ecu_common::consts::CANFD_MAX_PAYLOAD;
use ecu_common::comm::config::NetworkConfig;
use ecu_common::comm::mode::{ChannelId, ComMode, RequesterId};
use ecu_common::comm::state::NetworkState;
use ecu_common::det::{ErrorReport, ErrorSink, VersionInfo, error_id, module_id};
use ecu_common::error::ComError;
use ecu_common::hal::driver::{BridgeDiagnostics, CanFdBridge, HalError};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Service ids reported with network errors.
pub mod api_id {
    /// [`CanNetwork::initialize`](super::CanNetwork::initialize)
    pub const INIT: u8 = 0x00;
    /// [`CanNetwork::apply_mode_raw`](super::CanNetwork::apply_mode_raw)
    pub const APPLY_MODE: u8 = 0x01;
    /// [`CanNetwork::transmit`](super::CanNetwork::transmit)
    pub const TRANSMIT: u8 = 0x02;
    /// [`CanNetwork::receive`](super::CanNetwork::receive)
    pub const RECEIVE: u8 = 0x03;
}

// ─── Upstream ───────────────────────────────────────────────────────

/// Path for the full-communication request a network issues after
/// hardware initialization.
pub trait UpstreamLink: Send {
    /// Ask for full communication. Returns the arbitrated mode.
    fn request_full_communication(&self) -> Result<ComMode, ComError>;

    /// Withdraw the request.
    fn release_communication(&self) -> Result<ComMode, ComError>;
}

/// Upstream link to a channel of the mode registry.
pub struct RegistryLink {
    registry: Arc<ChannelModeRegistry>,
    channel: ChannelId,
    requester: RequesterId,
}

impl RegistryLink {
    pub fn new(registry: Arc<ChannelModeRegistry>, channel: ChannelId, requester: RequesterId) -> Self {
        Self {
            registry,
            channel,
            requester,
        }
    }
}

impl UpstreamLink for RegistryLink {
    fn request_full_communication(&self) -> Result<ComMode, ComError> {
        self.registry
            .request(self.channel, self.requester, ComMode::FullCommunication)
    }

    fn release_communication(&self) -> Result<ComMode, ComError> {
        self.registry.release(self.channel, self.requester)
    }
}

// ─── Network ────────────────────────────────────────────────────────

/// One physical CAN-FD bus.
pub struct CanNetwork {
    name: String,
    instance: u8,
    channel: ChannelId,
    baud_rate: u32,
    bridge: Box<dyn CanFdBridge>,
    fsm: StateMachine<NetworkTable>,
    upstream: Option<Box<dyn UpstreamLink>>,
    sink: Arc<dyn ErrorSink>,
}

impl CanNetwork {
    /// Network in `Uninitialized` owning `bridge`.
    ///
    /// `instance` is the instance id used in error reports.
    pub fn new(
        config: &NetworkConfig,
        instance: u8,
        bridge: Box<dyn CanFdBridge>,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            name: config.name.clone(),
            instance,
            channel: config.channel,
            baud_rate: config.baud_rate,
            bridge,
            fsm: StateMachine::new(NetworkState::Uninitialized),
            upstream: None,
            sink,
        }
    }

    /// Attach the upstream link used by [`initialize`](Self::initialize).
    pub fn with_upstream(mut self, link: Box<dyn UpstreamLink>) -> Self {
        self.upstream = Some(link);
        self
    }

    #[inline]
    pub fn state(&self) -> NetworkState {
        self.fsm.state()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    #[inline]
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Counters of the owned bridge, if it keeps any.
    pub fn bridge_diagnostics(&self) -> Option<BridgeDiagnostics> {
        self.bridge.diagnostics()
    }

    /// Module version, reported under the CAN state manager module id.
    pub const fn version_info(&self) -> VersionInfo {
        VersionInfo::for_module(module_id::CANSM)
    }

    fn report(&self, api: u8, error: u8) {
        self.sink.report(ErrorReport::new(
            module_id::CANSM,
            self.instance,
            api,
            error,
        ));
    }

    fn step(&mut self, event: NetworkEvent) -> TransitionResult<NetworkState, NetworkEffect> {
        let from = self.fsm.state();
        let result = self.fsm.handle_event(event);
        if let TransitionResult::Ok { next, .. } = &result
            && *next != from
        {
            info!(network = %self.name, %from, to = %next, ?event, "network state changed");
        }
        result
    }

    /// Bring up the bridge and request full communication upstream.
    ///
    /// On success the network is `Ready`. If the upstream request is
    /// rejected the network stays `Initialized` and the rejection is
    /// returned; calling this again from `Initialized` re-issues the
    /// upstream request without touching the bridge. Calling it from any
    /// later state is reported and otherwise ignored.
    ///
    /// # Errors
    /// - `HardwareFailure` if the bridge fails; state stays `Uninitialized`
    /// - the upstream rejection
    pub fn initialize(&mut self) -> Result<(), ComError> {
        if !self.fsm.evaluate(NetworkEvent::HardwareReady).is_ok() {
            if self.fsm.state() == NetworkState::Initialized {
                debug!(network = %self.name, "retrying upstream full-communication request");
                return self.request_upstream();
            }
            self.report(api_id::INIT, error_id::ALREADY_INITIALIZED);
            return Ok(());
        }

        if let Err(err) = self.program_bridge() {
            error!(network = %self.name, %err, "bridge initialization failed");
            self.report(api_id::INIT, error_id::INIT_FAILED);
            return Err(err.into());
        }

        if let TransitionResult::Ok {
            effect: NetworkEffect::RequestUpstream,
            ..
        } = self.step(NetworkEvent::HardwareReady)
        {
            self.request_upstream()?;
        }
        Ok(())
    }

    fn program_bridge(&mut self) -> Result<(), HalError> {
        self.bridge.init()?;
        self.bridge.set_baud_rate(self.baud_rate)?;
        debug!(
            network = %self.name,
            driver = self.bridge.name(),
            baud_rate = self.baud_rate,
            "bridge programmed"
        );
        Ok(())
    }

    fn request_upstream(&mut self) -> Result<(), ComError> {
        let granted = match &self.upstream {
            Some(link) => link.request_full_communication().map(Some),
            None => Ok(None),
        };

        match granted {
            Ok(mode) => {
                trace!(network = %self.name, ?mode, "upstream request granted");
                self.step(NetworkEvent::UpstreamGranted);
                Ok(())
            }
            Err(err) => {
                warn!(network = %self.name, %err, "upstream full-communication request rejected");
                Err(err)
            }
        }
    }

    /// Switch between `Ready`, `Silent` and `FullCommunication`.
    ///
    /// # Errors
    /// `NotReady` unless the network is `Ready` or communicating.
    pub fn apply_mode(&mut self, target: ComMode) -> Result<(), ComError> {
        match self.step(NetworkEvent::ApplyMode(target)) {
            TransitionResult::Ok { .. } => Ok(()),
            TransitionResult::Rejected(_) => Err(ComError::NotReady {
                state: self.fsm.state(),
            }),
        }
    }

    /// Raw-code variant of [`apply_mode`](Self::apply_mode).
    ///
    /// # Errors
    /// `InvalidMode` for codes above `2` (reported, state unchanged).
    pub fn apply_mode_raw(&mut self, raw: u8) -> Result<(), ComError> {
        let Some(target) = ComMode::from_u8(raw) else {
            self.report(api_id::APPLY_MODE, error_id::PARAM_MODE);
            return Err(ComError::InvalidMode { mode: raw });
        };
        self.apply_mode(target)
    }

    fn ensure_ready(&self) -> Result<(), ComError> {
        let state = self.fsm.state();
        if state.is_ready() {
            Ok(())
        } else {
            Err(ComError::NotReady { state })
        }
    }

    /// Hand one frame to the bridge. No retry.
    ///
    /// # Errors
    /// - `NotReady` outside `Ready`/`Silent`/`FullCommunication`
    /// - `InvalidLength` if `frame.len` exceeds the CAN-FD payload (reported)
    /// - `HardwareFailure` with the bridge error unchanged
    pub fn transmit(&mut self, frame: FdFrame) -> Result<(), ComError> {
        self.ensure_ready()?;
        if usize::from(frame.len) > CANFD_MAX_PAYLOAD {
            self.report(api_id::TRANSMIT, error_id::PARAM_LENGTH);
            return Err(ComError::InvalidLength { len: frame.len });
        }
        self.bridge.send(frame)?;
        trace!(network = %self.name, id = frame.id, len = frame.len, "frame transmitted");
        Ok(())
    }

    /// Poll the bridge for one frame.
    ///
    /// # Errors
    /// - `NotReady` outside `Ready`/`Silent`/`FullCommunication`
    /// - `HardwareFailure` with the bridge error unchanged, including `RxEmpty`
    pub fn receive(&mut self) -> Result<FdFrame, ComError> {
        self.ensure_ready()?;
        Ok(self.bridge.recv()?)
    }

    /// Pack and transmit a motor command frame.
    ///
    /// # Errors
    /// Same as [`transmit`](Self::transmit).
    pub fn send_motor_command(&mut self, speed: u16, torque: i16, mode: u8) -> Result<(), ComError> {
        self.transmit(MotorCommand { speed, torque, mode }.to_frame())
    }

    /// Poll for one motor status frame.
    ///
    /// `None` when nothing was received, the receive failed, or the frame
    /// was not a status frame. A non-status frame is consumed.
    pub fn read_motor_status(&mut self) -> Option<MotorStatus> {
        let frame = self.receive().ok()?;
        let status = MotorStatus::from_frame(&frame);
        if status.is_none() {
            trace!(network = %self.name, id = frame.id, "ignoring non-status frame");
        }
        status
    }

    /// Move to `Faulted` and withdraw the upstream request; transmit and
    /// receive are refused from then on. Only `shutdown` leaves `Faulted`.
    pub fn mark_faulted(&mut self) {
        let from = self.fsm.state();
        if from == NetworkState::Faulted || !self.step(NetworkEvent::Fault).is_ok() {
            return;
        }
        warn!(network = %self.name, %from, "network marked faulted");
        self.release_upstream();
    }

    /// Move to the terminal `Shutdown` state and withdraw the upstream request.
    pub fn shutdown(&mut self) {
        if !self.step(NetworkEvent::Shutdown).is_ok() {
            return;
        }
        self.release_upstream();
    }

    fn release_upstream(&self) {
        if let Some(link) = &self.upstream
            && let Err(err) = link.release_communication()
        {
            warn!(network = %self.name, %err, "upstream release failed");
        }
    }
}

impl ModeTarget for CanNetwork {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel(&self) -> ChannelId {
        self.channel
    }

    fn current_mode(&self) -> ComMode {
        mode_for_state(self.fsm.state())
    }

    fn apply_mode(&mut self, target: ComMode) -> Result<(), ComError> {
        CanNetwork::apply_mode(self, target)
    }
}
