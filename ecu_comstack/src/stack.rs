//! Stack assembly.
//!
//! Builds the registry, the decision engine and one network per configured
//! bus from a validated [`ComStackConfig`]. Bridges come from the HAL
//! [`DriverRegistry`]; each network gets an upstream link to its channel in
//! the registry and is attached to the engine.

use crate::comm::decision::ModeDecisionEngine;
use crate::comm::registry::ChannelModeRegistry;
use crate::network::{CanNetwork, RegistryLink};
use ecu_common::comm::config::ComStackConfig;
use ecu_common::comm::mode::RequesterId;
use ecu_common::config::ConfigError;
use ecu_common::det::ErrorSink;
use ecu_common::error::ComError;
use ecu_common::hal::driver::HalError;
use ecu_hal::DriverRegistry;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Network handle shared between the engine and the network's owning task.
pub type SharedNetwork = Arc<Mutex<CanNetwork>>;

/// Stack construction error.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("network {network}: {source}")]
    Bridge {
        network: String,
        #[source]
        source: HalError,
    },
}

/// Assembled com stack.
pub struct ComStack {
    config: ComStackConfig,
    registry: Arc<ChannelModeRegistry>,
    engine: ModeDecisionEngine,
    networks: Vec<SharedNetwork>,
}

impl ComStack {
    /// Validate `config` and build every component.
    ///
    /// # Errors
    /// - `BuildError::Config` if validation fails
    /// - `BuildError::Bridge` if a network names an unknown driver
    pub fn build(
        config: ComStackConfig,
        drivers: &DriverRegistry,
        sink: Arc<dyn ErrorSink>,
    ) -> Result<Self, BuildError> {
        config.validate()?;

        let registry = Arc::new(ChannelModeRegistry::new(&config.channels, Arc::clone(&sink))?);
        let engine = ModeDecisionEngine::new(Arc::clone(&sink)).with_registry(Arc::clone(&registry));

        let mut networks = Vec::with_capacity(config.networks.len());
        for (idx, net_cfg) in config.networks.iter().enumerate() {
            let bridge = drivers
                .create_bridge(&net_cfg.driver)
                .map_err(|source| BuildError::Bridge {
                    network: net_cfg.name.clone(),
                    source,
                })?;

            let link = RegistryLink::new(
                Arc::clone(&registry),
                net_cfg.channel,
                RequesterId(RequesterId::NETWORK.0 + idx as u16),
            );
            let network = CanNetwork::new(net_cfg, idx as u8, bridge, Arc::clone(&sink))
                .with_upstream(Box::new(link));
            let network = Arc::new(Mutex::new(network));

            engine.attach_network(network.clone());
            networks.push(network);
        }

        info!(
            service = %config.shared.service_name,
            channels = registry.channel_count(),
            networks = networks.len(),
            "com stack assembled"
        );

        Ok(Self {
            config,
            registry,
            engine,
            networks,
        })
    }

    /// Initialize every network.
    ///
    /// All networks are attempted; the first error is returned. Calling it
    /// again retries the upstream request of networks left `Initialized`.
    pub fn initialize_networks(&self) -> Result<(), ComError> {
        let mut first_err = None;
        for net in &self.networks {
            let mut net = net.lock();
            if let Err(err) = net.initialize() {
                warn!(network = %net.name(), %err, "network initialization failed");
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Shut every network down.
    pub fn shutdown(&self) {
        for net in &self.networks {
            net.lock().shutdown();
        }
        info!("com stack shut down");
    }

    pub fn config(&self) -> &ComStackConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ChannelModeRegistry> {
        &self.registry
    }

    pub fn engine(&self) -> &ModeDecisionEngine {
        &self.engine
    }

    pub fn networks(&self) -> &[SharedNetwork] {
        &self.networks
    }

    /// Network by configured name.
    pub fn network(&self, name: &str) -> Option<&SharedNetwork> {
        self.networks.iter().find(|n| n.lock().name() == name)
    }
}
