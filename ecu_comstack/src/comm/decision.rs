//! Mode Decision Engine.
//!
//! Owns the system mode, maps it onto one bus target mode and drives
//! every attached network to that target before returning.
//!
//! | System mode  | Bus target            |
//! |--------------|-----------------------|
//! | `Normal`     | `FullCommunication`   |
//! | `Silent`     | `SilentCommunication` |
//! | `Diagnostic` | `FullCommunication`   |
//!
//! Fan-out is all-or-nothing as observed by the requester: if one network
//! rejects the target, networks already switched in the same pass are
//! re-driven to the mode they had before, and the system mode is kept.

use crate::comm::registry::ChannelModeRegistry;
use ecu_common::comm::mode::{ChannelId, ComMode, ModeDecision, RequestSource, SystemMode};
use ecu_common::det::{ErrorReport, ErrorSink, VersionInfo, module_id};
use ecu_common::error::ComError;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{error, info};

/// Service ids reported with engine errors.
pub mod api_id {
    /// [`ModeDecisionEngine::request_mode_raw`](super::ModeDecisionEngine::request_mode_raw)
    pub const REQUEST_MODE: u8 = 0x01;
    /// [`ModeDecisionEngine::sync_channels`](super::ModeDecisionEngine::sync_channels)
    pub const SYNC_CHANNELS: u8 = 0x02;
}

/// Bus mode issued to the networks for `mode`.
///
/// Total over `SystemMode`: any mode may be requested from any mode.
#[inline]
pub const fn target_mode(mode: SystemMode) -> ComMode {
    match mode {
        SystemMode::Normal | SystemMode::Diagnostic => ComMode::FullCommunication,
        SystemMode::Silent => ComMode::SilentCommunication,
    }
}

// ─── Network Seam ───────────────────────────────────────────────────

/// A network the engine can drive.
pub trait ModeTarget: Send {
    /// Name used in logs and in `ComError::NetworkFailed`.
    fn name(&self) -> &str;

    /// Logical channel the network realizes.
    fn channel(&self) -> ChannelId;

    /// Bus mode currently in effect.
    fn current_mode(&self) -> ComMode;

    /// Switch to `target`. Synchronous.
    fn apply_mode(&mut self, target: ComMode) -> Result<(), ComError>;
}

/// Network handle shared between the engine and the network's owning task.
pub type SharedTarget = Arc<Mutex<dyn ModeTarget>>;

// ─── Engine ─────────────────────────────────────────────────────────

struct EngineState {
    mode: SystemMode,
    last: Option<ModeDecision>,
    sequence: u64,
}

/// System mode arbitration and fan-out.
pub struct ModeDecisionEngine {
    state: RwLock<EngineState>,
    networks: RwLock<Vec<SharedTarget>>,
    registry: Option<Arc<ChannelModeRegistry>>,
    sink: Arc<dyn ErrorSink>,
}

impl ModeDecisionEngine {
    /// Engine in `Normal` with no networks attached.
    pub fn new(sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            state: RwLock::new(EngineState {
                mode: SystemMode::Normal,
                last: None,
                sequence: 0,
            }),
            networks: RwLock::new(Vec::new()),
            registry: None,
            sink,
        }
    }

    /// Use `registry` for [`sync_channels`](Self::sync_channels).
    pub fn with_registry(mut self, registry: Arc<ChannelModeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Add a network to the fan-out set.
    pub fn attach_network(&self, network: SharedTarget) {
        let name = network.lock().name().to_string();
        let mut networks = self.networks.write();
        networks.push(network);
        info!(network = %name, attached = networks.len(), "network attached to decision engine");
    }

    /// Number of attached networks.
    pub fn network_count(&self) -> usize {
        self.networks.read().len()
    }

    fn reject(&self, api: u8, err: ComError) -> ComError {
        self.sink.report(ErrorReport::new(
            module_id::BSWM,
            0,
            api,
            err.det_error_id(),
        ));
        err
    }

    /// Switch the system mode and drive every network to its bus target.
    ///
    /// # Errors
    /// `NetworkFailed` if a network rejects the target. The system mode
    /// is then unchanged.
    pub fn request_mode(
        &self,
        source: RequestSource,
        mode: SystemMode,
    ) -> Result<ModeDecision, ComError> {
        let mut state = self.state.write();
        let previous = state.mode;
        let target = target_mode(mode);

        let networks = self.networks.read();
        let targets = vec![target; networks.len()];
        if let Err(err) = Self::fan_out(&networks, &targets) {
            error!(?source, from = ?previous, to = ?mode, %err, "system mode change failed");
            return Err(err);
        }

        state.mode = mode;
        state.sequence += 1;
        let decision = ModeDecision {
            system_mode: mode,
            target,
            source,
            sequence: state.sequence,
        };
        state.last = Some(decision);

        info!(
            ?source,
            from = ?previous,
            to = ?mode,
            ?target,
            networks = networks.len(),
            "system mode changed"
        );
        Ok(decision)
    }

    /// Raw-code variant of [`request_mode`](Self::request_mode).
    ///
    /// Sources: `0x01` communication, `0x02` diagnostic.
    /// Modes: `0x00` normal, `0x01` silent, `0x02` diagnostic.
    ///
    /// # Errors
    /// `InvalidSource` or `InvalidMode` for out-of-range codes (reported,
    /// state unchanged), plus everything `request_mode` returns.
    pub fn request_mode_raw(&self, source: u8, mode: u8) -> Result<ModeDecision, ComError> {
        let Some(src) = RequestSource::from_u8(source) else {
            return Err(self.reject(api_id::REQUEST_MODE, ComError::InvalidSource { code: source }));
        };
        let Some(sys) = SystemMode::from_u8(mode) else {
            return Err(self.reject(api_id::REQUEST_MODE, ComError::InvalidMode { mode }));
        };
        self.request_mode(src, sys)
    }

    /// Drive each network to `min(system target, arbitrated channel mode)`.
    ///
    /// Before any decision has been made the system target is
    /// `NoCommunication`.
    ///
    /// # Errors
    /// - `InvalidChannel` if no registry is attached or a network's channel is unknown
    /// - `NetworkFailed` if a network rejects its target
    pub fn sync_channels(&self) -> Result<(), ComError> {
        let state = self.state.read();
        let system_target = state
            .last
            .map_or(ComMode::NoCommunication, |d| d.target);

        let networks = self.networks.read();
        let mut targets = Vec::with_capacity(networks.len());
        for net in networks.iter() {
            let channel = net.lock().channel();
            let channel_mode = match &self.registry {
                Some(registry) => registry.current_mode(channel)?,
                None => {
                    return Err(self.reject(
                        api_id::SYNC_CHANNELS,
                        ComError::InvalidChannel { channel: channel.0 },
                    ));
                }
            };
            targets.push(system_target.min(channel_mode));
        }

        Self::fan_out(&networks, &targets)
    }

    fn fan_out(networks: &[SharedTarget], targets: &[ComMode]) -> Result<(), ComError> {
        let mut switched: Vec<(usize, ComMode)> = Vec::with_capacity(networks.len());

        for (idx, (net, &target)) in networks.iter().zip(targets).enumerate() {
            let mut guard = net.lock();
            let before = guard.current_mode();
            match guard.apply_mode(target) {
                Ok(()) => switched.push((idx, before)),
                Err(err) => {
                    let network = guard.name().to_string();
                    drop(guard);
                    Self::roll_back(networks, &switched);
                    return Err(ComError::NetworkFailed {
                        network,
                        source: Box::new(err),
                    });
                }
            }
        }
        Ok(())
    }

    fn roll_back(networks: &[SharedTarget], switched: &[(usize, ComMode)]) {
        for &(idx, before) in switched.iter().rev() {
            let mut net = networks[idx].lock();
            if let Err(err) = net.apply_mode(before) {
                error!(network = %net.name(), ?before, %err, "rollback failed");
            }
        }
    }

    /// Current system mode.
    pub fn current_system_mode(&self) -> SystemMode {
        self.state.read().mode
    }

    /// Most recent successful decision.
    pub fn last_decision(&self) -> Option<ModeDecision> {
        self.state.read().last
    }

    /// Module version, reported under the mode manager module id.
    pub const fn version_info(&self) -> VersionInfo {
        VersionInfo::for_module(module_id::BSWM)
    }
}
