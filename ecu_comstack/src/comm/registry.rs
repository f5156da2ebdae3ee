//! Channel Mode Registry.
//!
//! Owns per-channel requester tables and the arbitrated mode of each
//! channel. Arbitration is max-wins over [`ComMode`]; an empty table
//! yields `NoCommunication`.
//!
//! All channels sit behind one `RwLock`. Mutations recompute the
//! arbitrated mode under the write lock, so readers never observe a
//! requester table and a current mode that disagree.

use ecu_common::comm::config::ChannelConfig;
use ecu_common::comm::mode::{ChannelId, ComMode, RequesterId};
use ecu_common::config::ConfigError;
use ecu_common::consts::{MAX_CHANNELS, MAX_REQUESTERS_PER_CHANNEL};
use ecu_common::det::{ErrorReport, ErrorSink, VersionInfo, module_id};
use ecu_common::error::ComError;
use heapless::{LinearMap, Vec as FixedVec};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Service ids reported with registry errors.
pub mod api_id {
    /// `request` / `request_raw`
    pub const REQUEST: u8 = 0x01;
    /// `release`
    pub const RELEASE: u8 = 0x02;
    /// Per-channel queries (`current_mode`, `is_active`, `requesters`, `channel_config`)
    pub const CURRENT_MODE: u8 = 0x04;
}

type RequesterTable = LinearMap<RequesterId, ComMode, MAX_REQUESTERS_PER_CHANNEL>;

#[derive(Debug)]
struct Channel {
    config: ChannelConfig,
    requesters: RequesterTable,
    current: ComMode,
}

impl Channel {
    fn new(config: ChannelConfig) -> Self {
        Self {
            config,
            requesters: RequesterTable::new(),
            current: ComMode::NoCommunication,
        }
    }

    fn arbitrate(&self) -> ComMode {
        self.requesters
            .values()
            .copied()
            .max()
            .unwrap_or(ComMode::NoCommunication)
    }
}

/// Per-channel mode arbitration.
pub struct ChannelModeRegistry {
    channels: RwLock<FixedVec<Channel, MAX_CHANNELS>>,
    sink: Arc<dyn ErrorSink>,
}

impl ChannelModeRegistry {
    /// Build the registry from the channel table.
    ///
    /// Channels may be listed in any order but their ids must be dense `0..n`.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` for an empty, oversized or non-dense table.
    pub fn new(configs: &[ChannelConfig], sink: Arc<dyn ErrorSink>) -> Result<Self, ConfigError> {
        if configs.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one channel is required".to_string(),
            ));
        }

        let mut sorted: Vec<&ChannelConfig> = configs.iter().collect();
        sorted.sort_by_key(|c| c.id);

        let mut channels: FixedVec<Channel, MAX_CHANNELS> = FixedVec::new();
        for (idx, config) in sorted.into_iter().enumerate() {
            if config.id.index() != idx {
                return Err(ConfigError::ValidationError(format!(
                    "channel ids must be dense from 0, found {} at position {idx}",
                    config.id
                )));
            }
            channels
                .push(Channel::new(config.clone()))
                .map_err(|_| {
                    ConfigError::ValidationError(format!(
                        "more than {MAX_CHANNELS} channels configured"
                    ))
                })?;
        }

        info!(channels = channels.len(), "Channel mode registry initialized");
        Ok(Self {
            channels: RwLock::new(channels),
            sink,
        })
    }

    fn reject(&self, api: u8, err: ComError) -> ComError {
        self.sink.report(ErrorReport::new(
            module_id::COMM,
            0,
            api,
            err.det_error_id(),
        ));
        err
    }

    fn invalid_channel(&self, api: u8, channel: ChannelId) -> ComError {
        self.reject(api, ComError::InvalidChannel { channel: channel.0 })
    }

    /// Record `requester`'s wish for `mode` on `channel` and re-arbitrate.
    ///
    /// Returns the channel's arbitrated mode after the update.
    ///
    /// # Errors
    /// - `InvalidChannel` if `channel` is not configured
    /// - `InvalidMode` if `mode` exceeds the channel's `max_mode`
    /// - `RequesterCapacity` if the requester table is full
    pub fn request(
        &self,
        channel: ChannelId,
        requester: RequesterId,
        mode: ComMode,
    ) -> Result<ComMode, ComError> {
        let mut channels = self.channels.write();
        let Some(ch) = channels.get_mut(channel.index()) else {
            return Err(self.invalid_channel(api_id::REQUEST, channel));
        };

        if mode > ch.config.max_mode {
            return Err(self.reject(api_id::REQUEST, ComError::InvalidMode { mode: mode as u8 }));
        }

        if ch.requesters.insert(requester, mode).is_err() {
            return Err(self.reject(
                api_id::REQUEST,
                ComError::RequesterCapacity { channel: channel.0 },
            ));
        }
        debug!(channel = %channel, requester = %requester, ?mode, "mode requested");

        Ok(Self::update_current(ch))
    }

    /// Raw-code variant of [`request`](Self::request).
    ///
    /// # Errors
    /// `InvalidMode` for codes above `2`, plus everything `request` returns.
    pub fn request_raw(
        &self,
        channel: u8,
        requester: RequesterId,
        raw_mode: u8,
    ) -> Result<ComMode, ComError> {
        let Some(mode) = ComMode::from_u8(raw_mode) else {
            return Err(self.reject(api_id::REQUEST, ComError::InvalidMode { mode: raw_mode }));
        };
        self.request(ChannelId(channel), requester, mode)
    }

    /// Drop `requester`'s entry on `channel` and re-arbitrate.
    ///
    /// Releasing a requester that holds no entry is not an error.
    ///
    /// # Errors
    /// `InvalidChannel` if `channel` is not configured.
    pub fn release(&self, channel: ChannelId, requester: RequesterId) -> Result<ComMode, ComError> {
        let mut channels = self.channels.write();
        let Some(ch) = channels.get_mut(channel.index()) else {
            return Err(self.invalid_channel(api_id::RELEASE, channel));
        };

        if ch.requesters.remove(&requester).is_some() {
            debug!(channel = %channel, requester = %requester, "mode released");
        }

        Ok(Self::update_current(ch))
    }

    fn update_current(ch: &mut Channel) -> ComMode {
        let next = ch.arbitrate();
        if next != ch.current {
            info!(
                channel = %ch.config.id,
                name = %ch.config.name,
                from = ?ch.current,
                to = ?next,
                "channel mode changed"
            );
            ch.current = next;
        }
        next
    }

    /// Arbitrated mode of `channel`.
    ///
    /// # Errors
    /// `InvalidChannel` if `channel` is not configured.
    pub fn current_mode(&self, channel: ChannelId) -> Result<ComMode, ComError> {
        self.channels
            .read()
            .get(channel.index())
            .map(|ch| ch.current)
            .ok_or_else(|| self.invalid_channel(api_id::CURRENT_MODE, channel))
    }

    /// True while at least one requester holds an entry on `channel`.
    ///
    /// # Errors
    /// `InvalidChannel` if `channel` is not configured.
    pub fn is_active(&self, channel: ChannelId) -> Result<bool, ComError> {
        self.channels
            .read()
            .get(channel.index())
            .map(|ch| !ch.requesters.is_empty())
            .ok_or_else(|| self.invalid_channel(api_id::CURRENT_MODE, channel))
    }

    /// Snapshot of the requester table, sorted by requester id.
    ///
    /// # Errors
    /// `InvalidChannel` if `channel` is not configured.
    pub fn requesters(&self, channel: ChannelId) -> Result<Vec<(RequesterId, ComMode)>, ComError> {
        let channels = self.channels.read();
        let ch = channels
            .get(channel.index())
            .ok_or_else(|| self.invalid_channel(api_id::CURRENT_MODE, channel))?;
        let mut entries: Vec<_> = ch.requesters.iter().map(|(r, m)| (*r, *m)).collect();
        entries.sort_unstable_by_key(|(r, _)| *r);
        Ok(entries)
    }

    /// Static configuration of `channel`.
    ///
    /// # Errors
    /// `InvalidChannel` if `channel` is not configured.
    pub fn channel_config(&self, channel: ChannelId) -> Result<ChannelConfig, ComError> {
        self.channels
            .read()
            .get(channel.index())
            .map(|ch| ch.config.clone())
            .ok_or_else(|| self.invalid_channel(api_id::CURRENT_MODE, channel))
    }

    /// Number of configured channels.
    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }

    /// Module version, reported under the communication manager module id.
    pub const fn version_info(&self) -> VersionInfo {
        VersionInfo::for_module(module_id::COMM)
    }
}
