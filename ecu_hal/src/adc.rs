//! ADC conversion notification.
//!
//! One optional handler slot per ADC channel. `on_conversion_complete`
//! stands in for the end-of-conversion interrupt and invokes the
//! channel's handler synchronously on the caller's thread.

use ecu_common::consts::MAX_ADC_CHANNELS;
use ecu_common::det::{ErrorReport, ErrorSink, error_id, module_id};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Service ids reported with ADC development errors.
pub mod api_id {
    /// `start_conversion`
    pub const START_CONVERSION: u8 = 0x02;
    /// `register` / `unregister`
    pub const REGISTER: u8 = 0x03;
}

/// Raw conversion result.
pub type AdcValue = u16;

/// Conversion-complete handler.
pub type AdcHandler = Box<dyn FnMut(AdcValue) + Send>;

/// ADC notification error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdcError {
    /// Channel index outside `0..MAX_ADC_CHANNELS`.
    #[error("invalid ADC channel {0}")]
    InvalidChannel(u8),
}

/// Per-channel handler table.
pub struct AdcNotifier {
    slots: [Option<AdcHandler>; MAX_ADC_CHANNELS],
    pending: [bool; MAX_ADC_CHANNELS],
    sink: Arc<dyn ErrorSink>,
}

impl AdcNotifier {
    /// Empty table reporting invalid channels to `sink`.
    pub fn new(sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            pending: [false; MAX_ADC_CHANNELS],
            sink,
        }
    }

    fn slot_index(&self, channel: u8, api: u8) -> Result<usize, AdcError> {
        let idx = usize::from(channel);
        if idx < MAX_ADC_CHANNELS {
            Ok(idx)
        } else {
            self.sink.report(ErrorReport::new(
                module_id::ADCIF,
                0,
                api,
                error_id::PARAM_CHANNEL,
            ));
            Err(AdcError::InvalidChannel(channel))
        }
    }

    /// Install `handler` for `channel`, replacing any previous one.
    ///
    /// # Errors
    /// `AdcError::InvalidChannel` (also reported to the sink).
    pub fn register<F>(&mut self, channel: u8, handler: F) -> Result<(), AdcError>
    where
        F: FnMut(AdcValue) + Send + 'static,
    {
        let idx = self.slot_index(channel, api_id::REGISTER)?;
        self.slots[idx] = Some(Box::new(handler));
        debug!(channel, "ADC handler registered");
        Ok(())
    }

    /// Remove the handler for `channel`. Returns whether one was installed.
    ///
    /// # Errors
    /// `AdcError::InvalidChannel` (also reported to the sink).
    pub fn unregister(&mut self, channel: u8) -> Result<bool, AdcError> {
        let idx = self.slot_index(channel, api_id::REGISTER)?;
        Ok(self.slots[idx].take().is_some())
    }

    /// Whether `channel` has a handler installed.
    pub fn is_registered(&self, channel: u8) -> bool {
        self.slots
            .get(usize::from(channel))
            .is_some_and(Option::is_some)
    }

    /// Trigger a conversion on `channel`.
    ///
    /// # Errors
    /// `AdcError::InvalidChannel` (also reported to the sink).
    pub fn start_conversion(&mut self, channel: u8) -> Result<(), AdcError> {
        let idx = self.slot_index(channel, api_id::START_CONVERSION)?;
        self.pending[idx] = true;
        trace!(channel, "ADC conversion started");
        Ok(())
    }

    /// Whether a conversion was started on `channel` and has not completed.
    pub fn is_pending(&self, channel: u8) -> bool {
        self.pending
            .get(usize::from(channel))
            .copied()
            .unwrap_or(false)
    }

    /// End-of-conversion entry point.
    ///
    /// Invokes the channel's handler with `value`. Returns `false` when the
    /// channel is out of range or has no handler; neither case is reported.
    pub fn on_conversion_complete(&mut self, channel: u8, value: AdcValue) -> bool {
        let idx = usize::from(channel);
        if idx >= MAX_ADC_CHANNELS {
            return false;
        }
        self.pending[idx] = false;
        match self.slots[idx].as_mut() {
            Some(handler) => {
                handler(value);
                true
            }
            None => false,
        }
    }
}
