//! Integration test: network lifecycle and motor telemetry.
//!
//! Validates: I/O refused below Ready → initialize with upstream grant →
//! apply mode → motor command framing → status polling → fault → shutdown.

use ecu_common::can::frame::{FdFrame, MOTOR_COMMAND_ID, MotorCommand, MotorStatus};
use ecu_common::comm::config::ComStackConfig;
use ecu_common::comm::mode::{ChannelId, ComMode, RequesterId};
use ecu_common::comm::state::NetworkState;
use ecu_common::det::{DetBuffer, error_id};
use ecu_common::error::ComError;
use ecu_common::hal::driver::HalError;
use ecu_comstack::network::{CanNetwork, RegistryLink};
use ecu_comstack::ChannelModeRegistry;
use ecu_hal::drivers::simulation::{FAULT_OVERTORQUE, MotorModel, SimulatedCanFd, SimulationHandle};
use std::sync::Arc;

struct Rig {
    net: CanNetwork,
    sim: SimulationHandle,
    registry: Arc<ChannelModeRegistry>,
    det: Arc<DetBuffer>,
}

fn rig_with(bridge: SimulatedCanFd) -> Rig {
    let det = Arc::new(DetBuffer::new());
    let table = ComStackConfig::default_table();
    let registry = Arc::new(ChannelModeRegistry::new(&table.channels, det.clone()).unwrap());
    let sim = bridge.handle();
    let link = RegistryLink::new(registry.clone(), ChannelId::CAN, RequesterId::NETWORK);
    let net = CanNetwork::new(&table.networks[0], 0, Box::new(bridge), det.clone())
        .with_upstream(Box::new(link));
    Rig {
        net,
        sim,
        registry,
        det,
    }
}

fn rig() -> Rig {
    rig_with(SimulatedCanFd::new())
}

// ── Readiness ───────────────────────────────────────────────────────

#[test]
fn io_refused_in_every_state_below_ready() {
    let mut rig = rig();
    assert_eq!(rig.net.state(), NetworkState::Uninitialized);
    assert_eq!(
        rig.net.transmit(FdFrame::default()),
        Err(ComError::NotReady {
            state: NetworkState::Uninitialized
        })
    );
    assert_eq!(
        rig.net.receive(),
        Err(ComError::NotReady {
            state: NetworkState::Uninitialized
        })
    );

    // Stuck in Initialized: upstream request rejected by the registry.
    let mut table = ComStackConfig::default_table();
    table.channels[0].max_mode = ComMode::SilentCommunication;
    table.channels[0].default_mode = ComMode::NoCommunication;
    let det = Arc::new(DetBuffer::new());
    let registry = Arc::new(ChannelModeRegistry::new(&table.channels, det.clone()).unwrap());
    let bridge = SimulatedCanFd::new();
    let sim = bridge.handle();
    let mut net = CanNetwork::new(&table.networks[0], 0, Box::new(bridge), det.clone())
        .with_upstream(Box::new(RegistryLink::new(
            registry,
            ChannelId::CAN,
            RequesterId::NETWORK,
        )));

    assert_eq!(net.initialize(), Err(ComError::InvalidMode { mode: 2 }));
    assert_eq!(net.state(), NetworkState::Initialized);
    assert_eq!(
        net.send_motor_command(1, 1, 1),
        Err(ComError::NotReady {
            state: NetworkState::Initialized
        })
    );
    assert_eq!(net.read_motor_status(), None);
    assert!(sim.transmitted().is_empty());
    assert_eq!(det.last().unwrap().error_id, error_id::PARAM_MODE);
}

#[test]
fn initialize_requests_full_communication_upstream() {
    let mut rig = rig();
    rig.net.initialize().unwrap();
    assert_eq!(rig.net.state(), NetworkState::Ready);
    assert_eq!(
        rig.registry.requesters(ChannelId::CAN).unwrap(),
        vec![(RequesterId::NETWORK, ComMode::FullCommunication)]
    );
    assert_eq!(
        rig.registry.current_mode(ChannelId::CAN),
        Ok(ComMode::FullCommunication)
    );
}

// ── Telemetry ───────────────────────────────────────────────────────

#[test]
fn full_communication_motor_command_scenario() {
    let mut rig = rig();
    rig.net.initialize().unwrap();
    rig.net.apply_mode(ComMode::FullCommunication).unwrap();
    rig.net.send_motor_command(1000, 50, 0).unwrap();

    let frame = rig.sim.last_transmitted().unwrap();
    assert_eq!(frame.id, MOTOR_COMMAND_ID);
    assert_eq!(frame.len, 8);
    assert!(frame.brs);
    assert_eq!(&frame.data[..5], &[0xE8, 0x03, 0x32, 0x00, 0x00]);
    assert_eq!(rig.det.count(), 0);
}

#[test]
fn command_bytes_decode_as_status() {
    let frame = MotorCommand {
        speed: 1500,
        torque: -200,
        mode: 2,
    }
    .to_frame()
    .with_id(0x101);
    assert_eq!(
        MotorStatus::from_frame(&frame),
        Some(MotorStatus {
            speed: 1500,
            torque: -200,
            fault: 2
        })
    );
}

#[test]
fn motor_model_ramps_and_reports_overtorque() {
    let mut rig = rig_with(SimulatedCanFd::with_motor(Some(MotorModel::new(400, 100))));
    rig.net.initialize().unwrap();
    rig.net.apply_mode(ComMode::FullCommunication).unwrap();

    let mut speeds = Vec::new();
    for _ in 0..4 {
        rig.net.send_motor_command(1000, 250, 1).unwrap();
        let status = rig.net.read_motor_status().unwrap();
        assert_eq!(status.torque, 100);
        assert_eq!(status.fault, FAULT_OVERTORQUE);
        speeds.push(status.speed);
    }
    assert_eq!(speeds, vec![400, 800, 1000, 1000]);
}

#[test]
fn receive_failure_reads_as_no_status() {
    let mut rig = rig();
    rig.net.initialize().unwrap();
    rig.net.send_motor_command(10, 0, 0).unwrap();
    rig.sim
        .fail_next_recv(HalError::CommunicationError("crc".to_string()));

    assert_eq!(rig.net.read_motor_status(), None);
    assert!(rig.net.read_motor_status().is_some());
    assert_eq!(
        rig.net.receive(),
        Err(ComError::HardwareFailure(HalError::RxEmpty))
    );
}

// ── Fault and shutdown ──────────────────────────────────────────────

#[test]
fn fault_then_shutdown_releases_upstream() {
    let mut rig = rig();
    rig.net.initialize().unwrap();
    rig.net.apply_mode(ComMode::FullCommunication).unwrap();

    for _ in 0..3 {
        rig.sim.fail_next_send(HalError::BusOff);
    }
    let failures = (0..3)
        .filter(|_| rig.net.send_motor_command(1, 1, 1).is_err())
        .count();
    assert_eq!(failures, 3);
    assert_eq!(rig.net.state(), NetworkState::FullCommunication);

    rig.net.mark_faulted();
    assert_eq!(
        rig.net.send_motor_command(1, 1, 1),
        Err(ComError::NotReady {
            state: NetworkState::Faulted
        })
    );
    assert_eq!(rig.registry.is_active(ChannelId::CAN), Ok(false));

    rig.net.shutdown();
    assert_eq!(rig.net.state(), NetworkState::Shutdown);
    assert_eq!(rig.registry.is_active(ChannelId::CAN), Ok(false));

    rig.net.initialize().unwrap();
    assert_eq!(rig.net.state(), NetworkState::Shutdown);
    assert_eq!(rig.det.last().unwrap().error_id, error_id::ALREADY_INITIALIZED);
    assert_eq!(rig.net.bridge_diagnostics().unwrap().errors, 3);
}
