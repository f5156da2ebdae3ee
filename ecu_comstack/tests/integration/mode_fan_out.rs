//! Integration test: system mode fan-out.
//!
//! Validates: stack assembly → network startup → engine mode changes reach
//! every network → a failing network rolls the pass back.

use ecu_common::comm::config::{ComStackConfig, NetworkConfig};
use ecu_common::comm::mode::{ChannelId, ComMode, RequestSource, RequesterId, SystemMode};
use ecu_common::comm::state::NetworkState;
use ecu_common::det::{DetBuffer, error_id};
use ecu_common::error::ComError;
use ecu_comstack::ComStack;
use ecu_hal::DriverRegistry;
use std::sync::Arc;

fn two_network_stack() -> (ComStack, Arc<DetBuffer>) {
    let mut config = ComStackConfig::default_table();
    config.networks.push(NetworkConfig {
        name: "eth0".to_string(),
        driver: "simulation".to_string(),
        baud_rate: 5_000_000,
        channel: ChannelId::ETHERNET,
    });
    let det = Arc::new(DetBuffer::new());
    let stack = ComStack::build(config, &DriverRegistry::with_builtin(), det.clone()).unwrap();
    stack.initialize_networks().unwrap();
    (stack, det)
}

fn states(stack: &ComStack) -> Vec<NetworkState> {
    stack.networks().iter().map(|n| n.lock().state()).collect()
}

#[test]
fn every_network_follows_the_system_mode() {
    let (stack, _) = two_network_stack();
    let engine = stack.engine();
    assert_eq!(states(&stack), vec![NetworkState::Ready; 2]);

    engine
        .request_mode(RequestSource::Communication, SystemMode::Normal)
        .unwrap();
    assert_eq!(states(&stack), vec![NetworkState::FullCommunication; 2]);

    engine
        .request_mode(RequestSource::Communication, SystemMode::Silent)
        .unwrap();
    assert_eq!(states(&stack), vec![NetworkState::Silent; 2]);

    let decision = engine
        .request_mode(RequestSource::Diagnostic, SystemMode::Diagnostic)
        .unwrap();
    assert_eq!(states(&stack), vec![NetworkState::FullCommunication; 2]);
    assert_eq!(decision.sequence, 3);
    assert_eq!(engine.current_system_mode(), SystemMode::Diagnostic);
}

#[test]
fn out_of_range_mode_changes_nothing() {
    let (stack, det) = two_network_stack();
    let engine = stack.engine();
    engine.request_mode_raw(0x01, 0x01).unwrap();

    assert_eq!(
        engine.request_mode_raw(0x01, 0x07),
        Err(ComError::InvalidMode { mode: 7 })
    );
    assert_eq!(engine.current_system_mode(), SystemMode::Silent);
    assert_eq!(states(&stack), vec![NetworkState::Silent; 2]);
    assert_eq!(det.last().unwrap().error_id, error_id::PARAM_MODE);
}

#[test]
fn faulted_network_fails_the_pass_and_rolls_back() {
    let (stack, _) = two_network_stack();
    let engine = stack.engine();
    engine
        .request_mode(RequestSource::Communication, SystemMode::Silent)
        .unwrap();

    stack.network("eth0").unwrap().lock().mark_faulted();

    let err = engine
        .request_mode(RequestSource::Communication, SystemMode::Normal)
        .unwrap_err();
    match err {
        ComError::NetworkFailed { network, source } => {
            assert_eq!(network, "eth0");
            assert_eq!(
                *source,
                ComError::NotReady {
                    state: NetworkState::Faulted
                }
            );
        }
        other => panic!("unexpected error {other:?}"),
    }

    assert_eq!(engine.current_system_mode(), SystemMode::Silent);
    assert_eq!(
        states(&stack),
        vec![NetworkState::Silent, NetworkState::Faulted]
    );
}

#[test]
fn sync_channels_respects_channel_arbitration() {
    let (stack, _) = two_network_stack();
    let engine = stack.engine();
    let registry = stack.registry();
    engine
        .request_mode(RequestSource::Communication, SystemMode::Normal)
        .unwrap();

    // Both networks hold a full-communication request from startup.
    assert_eq!(registry.current_mode(ChannelId::CAN), Ok(ComMode::FullCommunication));

    // Drop the ethernet network's own request: only a silent requester remains.
    registry
        .release(ChannelId::ETHERNET, RequesterId(RequesterId::NETWORK.0 + 1))
        .unwrap();
    registry
        .request(ChannelId::ETHERNET, RequesterId::APPLICATION, ComMode::SilentCommunication)
        .unwrap();

    engine.sync_channels().unwrap();
    assert_eq!(
        states(&stack),
        vec![NetworkState::FullCommunication, NetworkState::Silent]
    );
}
