//! # ECU Com Stack Simulation Binary
//!
//! Builds the com stack from configuration on simulated CAN-FD bridges,
//! brings the networks up, switches the system to `Normal` and exchanges
//! motor command/status frames for a number of cycles.
//!
//! # Usage
//!
//! ```bash
//! # Built-in channel table, 10 cycles
//! ecu_comstack
//!
//! # Custom table, 100 cycles, verbose JSON logs
//! ecu_comstack --config config/comstack.toml --cycles 100 -v --json
//! ```
//!
//! Log filtering: `RUST_LOG` if set, otherwise `[shared] log_level` from
//! the table, raised to `debug` by `--verbose`.

#![deny(warnings)]

use clap::Parser;
use ecu_common::comm::config::ComStackConfig;
use ecu_common::comm::mode::{RequestSource, SystemMode};
use ecu_common::config::{ConfigLoader, LogLevel};
use ecu_common::det::{ErrorSink, TracingErrorSink};
use ecu_comstack::ComStack;
use ecu_hal::DriverRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// ECU com stack simulation
#[derive(Parser, Debug)]
#[command(name = "ecu_comstack")]
#[command(version)]
#[command(about = "Communication mode arbitration and CAN-FD network simulation")]
#[command(long_about = None)]
struct Args {
    /// Channel/network table (TOML). Built-in table if omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of command/status cycles
    #[arg(short = 'n', long, default_value_t = 10)]
    cycles: u32,

    /// Commanded motor speed
    #[arg(long, default_value_t = 1000)]
    speed: u16,

    /// Commanded motor torque
    #[arg(long, default_value_t = 50, allow_negative_numbers = true)]
    torque: i16,

    /// Motor operating mode byte
    #[arg(long, default_value_t = 0)]
    motor_mode: u8,

    /// Delay between cycles in milliseconds
    #[arg(long, default_value_t = 10)]
    period_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("com stack failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let loaded = args.config.as_deref().map(ComStackConfig::load).transpose();
    let log_level = match &loaded {
        Ok(Some(config)) => config.shared.log_level,
        _ => LogLevel::default(),
    };
    setup_tracing(&args, log_level);

    info!("ECU com stack v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match (loaded?, &args.config) {
        (Some(config), Some(path)) => {
            info!("Loaded configuration from {:?}", path);
            config
        }
        _ => {
            info!("Using built-in channel table");
            ComStackConfig::default_table()
        }
    };

    let sink: Arc<dyn ErrorSink> = Arc::new(TracingErrorSink);
    let drivers = DriverRegistry::with_builtin();
    debug!("Available drivers: {:?}", drivers.list_drivers());

    let stack = ComStack::build(config, &drivers, sink)?;
    stack.initialize_networks()?;

    let decision = stack
        .engine()
        .request_mode(RequestSource::Communication, SystemMode::Normal)?;
    info!(
        "System mode {:?} -> bus target {:?}",
        decision.system_mode, decision.target
    );

    let period = Duration::from_millis(args.period_ms);
    for cycle in 0..args.cycles {
        for net in stack.networks() {
            let mut net = net.lock();
            if let Err(e) = net.send_motor_command(args.speed, args.torque, args.motor_mode) {
                warn!(network = %net.name(), cycle, "motor command failed: {e}");
                continue;
            }
            match net.read_motor_status() {
                Some(status) => info!(
                    network = %net.name(),
                    cycle,
                    speed = status.speed,
                    torque = status.torque,
                    fault = status.fault,
                    "motor status"
                ),
                None => debug!(network = %net.name(), cycle, "no motor status"),
            }
        }
        if !period.is_zero() {
            std::thread::sleep(period);
        }
    }

    for net in stack.networks() {
        let net = net.lock();
        if let Some(diag) = net.bridge_diagnostics() {
            info!(
                network = %net.name(),
                sent = diag.frames_sent,
                received = diag.frames_received,
                errors = diag.errors,
                "bridge counters"
            );
        }
    }

    stack.shutdown();
    info!("ECU com stack shutdown complete");
    Ok(())
}

/// Filter directive used when `RUST_LOG` is not set.
///
/// `--verbose` raises the configured level to at least `debug`.
fn default_directive(verbose: bool, level: LogLevel) -> &'static str {
    match (verbose, level) {
        (true, LogLevel::Trace) => LogLevel::Trace.as_directive(),
        (true, _) => LogLevel::Debug.as_directive(),
        (false, level) => level.as_directive(),
    }
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(args.verbose, level)));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
