//! Development error tracer.
//!
//! Modules report `(module, instance, api, error)` tuples through the
//! [`ErrorSink`] trait. Reporting is fire-and-forget: it never fails and
//! never blocks beyond a short critical section.
//!
//! Two sinks are provided:
//! - [`TracingErrorSink`] logs each report.
//! - [`DetBuffer`] logs and keeps the most recent reports in a fixed ring.

use crate::consts::{DET_MAX_ERROR_ENTRIES, VENDOR_ID};
use heapless::Deque;
use parking_lot::Mutex;
use tracing::warn;

/// Reporting module identifiers.
pub mod module_id {
    pub const DET: u16 = 0x000A;
    /// Channel mode registry.
    pub const COMM: u16 = 0x000B;
    /// Mode decision engine.
    pub const BSWM: u16 = 0x002A;
    /// Network state machine.
    pub const CANSM: u16 = 0x008C;
    pub const ADCIF: u16 = 120;
}

/// Error identifiers.
pub mod error_id {
    pub const PARAM_POINTER: u8 = 0x01;
    pub const INIT_FAILED: u8 = 0x02;
    pub const ALREADY_INITIALIZED: u8 = 0x03;
    pub const UNINIT: u8 = 0x04;
    pub const PARAM_CHANNEL: u8 = 0x0A;
    pub const PARAM_MODE: u8 = 0x0B;
    pub const PARAM_SOURCE: u8 = 0x0C;
    pub const CAPACITY: u8 = 0x0D;
    pub const HW_FAILURE: u8 = 0x0E;
    pub const PARAM_LENGTH: u8 = 0x0F;
}

/// One development error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorReport {
    pub module_id: u16,
    pub instance_id: u8,
    pub api_id: u8,
    pub error_id: u8,
}

impl ErrorReport {
    pub const fn new(module_id: u16, instance_id: u8, api_id: u8, error_id: u8) -> Self {
        Self {
            module_id,
            instance_id,
            api_id,
            error_id,
        }
    }
}

/// Receiver of development error reports.
pub trait ErrorSink: Send + Sync {
    fn report(&self, report: ErrorReport);
}

fn log_report(report: &ErrorReport) {
    warn!(
        module = report.module_id,
        instance = report.instance_id,
        api = report.api_id,
        error = report.error_id,
        "development error reported"
    );
}

/// Sink that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, report: ErrorReport) {
        log_report(&report);
    }
}

#[derive(Debug, Default)]
struct DetRing {
    recent: Deque<ErrorReport, DET_MAX_ERROR_ENTRIES>,
    total: u64,
}

/// Sink that logs and retains the most recent reports.
///
/// When the ring is full the oldest report is dropped; `count()` keeps
/// counting every report ever received.
#[derive(Debug, Default)]
pub struct DetBuffer {
    ring: Mutex<DetRing>,
}

impl DetBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of retained reports, oldest first.
    pub fn recent(&self) -> Vec<ErrorReport> {
        self.ring.lock().recent.iter().copied().collect()
    }

    /// Most recent report.
    pub fn last(&self) -> Option<ErrorReport> {
        self.ring.lock().recent.back().copied()
    }

    /// Total reports received since construction or the last `clear()`.
    pub fn count(&self) -> u64 {
        self.ring.lock().total
    }

    pub fn clear(&self) {
        let mut ring = self.ring.lock();
        ring.recent.clear();
        ring.total = 0;
    }
}

impl ErrorSink for DetBuffer {
    fn report(&self, report: ErrorReport) {
        log_report(&report);
        let mut ring = self.ring.lock();
        if ring.recent.is_full() {
            ring.recent.pop_front();
        }
        // Cannot fail: one slot was freed above.
        let _ = ring.recent.push_back(report);
        ring.total += 1;
    }
}

// ─── Version Info ───────────────────────────────────────────────────

/// Module version information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub vendor_id: u16,
    pub module_id: u16,
    pub sw_major: u8,
    pub sw_minor: u8,
    pub sw_patch: u8,
}

impl VersionInfo {
    /// Version info for `module_id` at software version 1.0.0.
    pub const fn for_module(module_id: u16) -> Self {
        Self {
            vendor_id: VENDOR_ID,
            module_id,
            sw_major: 1,
            sw_minor: 0,
            sw_patch: 0,
        }
    }
}
