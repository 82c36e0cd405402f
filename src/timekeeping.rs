//! Logical clock driven by the primary timer interrupt.
//!
//! The tick handler runs in interrupt context and only bumps an atomic;
//! foreground code reads it.  All comparisons use wrapping arithmetic so
//! the counter may roll over freely.

use core::sync::atomic::{AtomicU32, Ordering};

/// Monotonic tick counter.
pub struct TickClock {
    ticks: AtomicU32,
}

impl TickClock {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
        }
    }

    /// Called from the primary timer interrupt.
    pub fn on_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Release);
    }

    /// Ticks since boot (wraps at `u32::MAX`).
    pub fn now(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything that can report the current tick count.
pub trait TickSource {
    fn now(&self) -> u32;
}

impl TickSource for TickClock {
    fn now(&self) -> u32 {
        TickClock::now(self)
    }
}

impl<T: TickSource + ?Sized> TickSource for &T {
    fn now(&self) -> u32 {
        (**self).now()
    }
}

/// Non-blocking delay: poll [`expired`](Self::expired) from a work function
/// instead of spinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    start: u32,
    ticks: u32,
}

impl Deadline {
    pub fn after(clock: &impl TickSource, ticks: u32) -> Self {
        Self {
            start: clock.now(),
            ticks,
        }
    }

    pub fn expired(&self, clock: &impl TickSource) -> bool {
        self.elapsed(clock) >= self.ticks
    }

    /// Ticks since the deadline was set.
    pub fn elapsed(&self, clock: &impl TickSource) -> u32 {
        clock.now().wrapping_sub(self.start)
    }
}
