//! Interrupt-to-foreground hand-off for the sensor subsystem.
//!
//! The bridge's sensor callbacks run in interrupt context and post here;
//! the sensor work function drains on its next scheduler turn.  Posting
//! is a single atomic add, so an event is visible no later than the next
//! loop iteration.
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌──────────────┐
//! │ sample timer │────▶│               │     │              │
//! │              │     │ SensorMailbox │────▶│ sensor work  │
//! │ port edge    │────▶│  (lock-free)  │     │ (foreground) │
//! └──────────────┘     └───────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

/// Pending sensor events, counted rather than queued: the consumer only
/// needs to know how many ticks/edges it has to catch up on.
pub struct SensorMailbox {
    sample_ticks: AtomicU32,
    edges: AtomicU32,
}

impl SensorMailbox {
    pub const fn new() -> Self {
        Self {
            sample_ticks: AtomicU32::new(0),
            edges: AtomicU32::new(0),
        }
    }

    // ── Producer side (interrupt context) ─────────────────────

    pub fn post_sample_tick(&self) {
        self.sample_ticks.fetch_add(1, Ordering::Release);
    }

    pub fn post_edge(&self) {
        self.edges.fetch_add(1, Ordering::Release);
    }

    // ── Consumer side (foreground) ────────────────────────────

    /// Sampling ticks since the last call.
    pub fn take_sample_ticks(&self) -> u32 {
        self.sample_ticks.swap(0, Ordering::AcqRel)
    }

    /// Sensor edges since the last call.
    pub fn take_edges(&self) -> u32 {
        self.edges.swap(0, Ordering::AcqRel)
    }

    pub fn is_empty(&self) -> bool {
        self.sample_ticks.load(Ordering::Acquire) == 0 && self.edges.load(Ordering::Acquire) == 0
    }
}

impl Default for SensorMailbox {
    fn default() -> Self {
        Self::new()
    }
}
