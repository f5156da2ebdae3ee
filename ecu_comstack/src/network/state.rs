//! Network state transitions.
//!
//! ```text
//! Uninitialized ──HardwareReady──► Initialized ──UpstreamGranted──► Ready
//!                                                                    │ ▲
//!                                          ApplyMode(Silent | Full)  ▼ │ ApplyMode(NoCommunication)
//!                                                          Silent / FullCommunication
//!
//! any (except Shutdown) ──Fault──► Faulted
//! any ──Shutdown──► Shutdown (terminal)
//! ```

use crate::fsm::{TransitionResult, TransitionTable};
use ecu_common::comm::mode::ComMode;
use ecu_common::comm::state::NetworkState;

/// Network input alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    /// Bridge initialized and baud rate programmed.
    HardwareReady,
    /// Upstream full-communication request accepted.
    UpstreamGranted,
    /// Mode handed down by the decision engine.
    ApplyMode(ComMode),
    /// Unrecoverable hardware error, raised explicitly by the owner.
    Fault,
    /// Orderly stop.
    Shutdown,
}

/// Side effect the network owner carries out after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEffect {
    None,
    /// Ask the channel registry for full communication.
    RequestUpstream,
}

/// Network transition table.
pub struct NetworkTable;

/// State a communicating network takes for `mode`.
#[inline]
pub const fn state_for_mode(mode: ComMode) -> NetworkState {
    match mode {
        ComMode::NoCommunication => NetworkState::Ready,
        ComMode::SilentCommunication => NetworkState::Silent,
        ComMode::FullCommunication => NetworkState::FullCommunication,
    }
}

/// Bus mode in effect in `state`.
#[inline]
pub const fn mode_for_state(state: NetworkState) -> ComMode {
    match state {
        NetworkState::Silent => ComMode::SilentCommunication,
        NetworkState::FullCommunication => ComMode::FullCommunication,
        _ => ComMode::NoCommunication,
    }
}

impl TransitionTable for NetworkTable {
    type State = NetworkState;
    type Event = NetworkEvent;
    type Effect = NetworkEffect;

    fn transition(
        state: NetworkState,
        event: NetworkEvent,
    ) -> TransitionResult<NetworkState, NetworkEffect> {
        use NetworkEvent as E;
        use NetworkState as S;

        let (next, effect) = match (state, event) {
            (S::Uninitialized, E::HardwareReady) => (S::Initialized, NetworkEffect::RequestUpstream),
            (S::Initialized, E::UpstreamGranted) => (S::Ready, NetworkEffect::None),

            (S::Ready | S::Silent | S::FullCommunication, E::ApplyMode(mode)) => {
                (state_for_mode(mode), NetworkEffect::None)
            }

            (S::Shutdown, _) => return TransitionResult::Rejected("network is shut down"),
            (_, E::Fault) => (S::Faulted, NetworkEffect::None),
            (_, E::Shutdown) => (S::Shutdown, NetworkEffect::None),

            _ => return TransitionResult::Rejected(invalid_transition_reason(state, event)),
        };

        TransitionResult::Ok { next, effect }
    }
}

fn invalid_transition_reason(state: NetworkState, event: NetworkEvent) -> &'static str {
    use NetworkEvent::*;
    match (state, event) {
        (_, HardwareReady) => "network already initialized",
        (NetworkState::Uninitialized, UpstreamGranted) => "hardware not initialized",
        (_, UpstreamGranted) => "upstream grant only valid in Initialized",
        (NetworkState::Faulted, ApplyMode(_)) => "network is faulted",
        (_, ApplyMode(_)) => "network not ready",
        _ => "invalid network transition",
    }
}
