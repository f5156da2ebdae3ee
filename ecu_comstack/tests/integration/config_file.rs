//! Integration test: configuration file to running stack.
//!
//! Validates: TOML on disk → `ConfigLoader` → validation → assembly →
//! startup → motor traffic on every network.

use ecu_common::comm::config::ComStackConfig;
use ecu_common::comm::mode::{ChannelId, ComMode, RequestSource, SystemMode};
use ecu_common::comm::state::NetworkState;
use ecu_common::config::{ConfigError, ConfigLoader};
use ecu_common::det::DetBuffer;
use ecu_comstack::ComStack;
use ecu_comstack::stack::BuildError;
use ecu_hal::DriverRegistry;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const STACK_TOML: &str = r#"
[shared]
service_name = "bench-ecu"

[[channels]]
id = 1
name = "body"
default_mode = "silent"

[[channels]]
id = 0
name = "powertrain"
default_mode = "full"
timeout_ms = 1000
wakeup_support = true

[[networks]]
name = "pt-can"
channel = 0

[[networks]]
name = "body-can"
baud_rate = 1000000
channel = 1
"#;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn stack_from_file() {
    let file = write_config(STACK_TOML);
    let config = ComStackConfig::load(file.path()).unwrap();
    assert_eq!(config.shared.service_name, "bench-ecu");

    let det = Arc::new(DetBuffer::new());
    let stack = ComStack::build(config, &DriverRegistry::with_builtin(), det.clone()).unwrap();
    assert_eq!(stack.registry().channel_count(), 2);
    assert_eq!(
        stack.registry().channel_config(ChannelId(0)).unwrap().name,
        "powertrain"
    );

    stack.initialize_networks().unwrap();
    let pt = stack.network("pt-can").unwrap();
    let body = stack.network("body-can").unwrap();
    assert_eq!(pt.lock().state(), NetworkState::Ready);
    assert_eq!(body.lock().state(), NetworkState::Ready);
    assert_eq!(body.lock().baud_rate(), 1_000_000);
    assert_eq!(
        stack.registry().current_mode(ChannelId(1)),
        Ok(ComMode::FullCommunication)
    );

    stack
        .engine()
        .request_mode(RequestSource::Communication, SystemMode::Silent)
        .unwrap();
    assert_eq!(pt.lock().state(), NetworkState::Silent);
    assert_eq!(body.lock().state(), NetworkState::Silent);
    assert_eq!(det.count(), 0);
}

#[test]
fn network_on_capped_channel_is_rejected() {
    let file = write_config(&STACK_TOML.replace(
        "default_mode = \"silent\"",
        "default_mode = \"silent\"\nmax_mode = \"silent\"",
    ));
    let config = ComStackConfig::load(file.path()).unwrap();
    let result = ComStack::build(config, &DriverRegistry::with_builtin(), Arc::new(DetBuffer::new()));
    assert!(matches!(
        result,
        Err(BuildError::Config(ConfigError::ValidationError(msg))) if msg.contains("body-can")
    ));
}

#[test]
fn motor_traffic_on_default_table() {
    let stack = ComStack::build(
        ComStackConfig::default_table(),
        &DriverRegistry::with_builtin(),
        Arc::new(DetBuffer::new()),
    )
    .unwrap();
    stack.initialize_networks().unwrap();
    stack
        .engine()
        .request_mode(RequestSource::Communication, SystemMode::Normal)
        .unwrap();

    let mut net = stack.networks()[0].lock();
    for speed in [100u16, 200, 300] {
        net.send_motor_command(speed, -5, 1).unwrap();
        let status = net.read_motor_status().unwrap();
        assert_eq!(status.speed, speed);
        assert_eq!(status.torque, -5);
    }
    let diag = net.bridge_diagnostics().unwrap();
    assert_eq!((diag.frames_sent, diag.frames_received), (3, 3));
}

#[test]
fn invalid_file_is_rejected_before_assembly() {
    let file = write_config(
        r#"
[[channels]]
id = 0
name = "can"

[[networks]]
name = "can0"
channel = 3
"#,
    );
    let config = ComStackConfig::load(file.path()).unwrap();
    let result = ComStack::build(config, &DriverRegistry::with_builtin(), Arc::new(DetBuffer::new()));
    assert!(matches!(
        result,
        Err(BuildError::Config(ConfigError::ValidationError(_)))
    ));
}
