//! Reset-cause classification.
//!
//! Runs exactly once per boot, before any interrupt source is armed.
//! The latches are checked in a fixed priority order and the first match
//! wins:
//!
//! | # | Condition                       | Cause             | Power failure |
//! |---|---------------------------------|-------------------|---------------|
//! | 1 | power-on latch clear            | `PowerOn`         | yes           |
//! | 2 | brown-out latch clear           | `BrownOut`        | yes           |
//! | 3 | timeout latch clear             | `WatchdogTimeout` | no            |
//! | 4 | power-down latch clear          | `SleepWake`       | no            |
//! | 5 | otherwise                       | `PinReset`        | no            |
//! | 6 | no timeout/power-down latches   | `Unknown`         | no            |
//!
//! Afterwards the power-on and brown-out latches are re-armed.

use core::fmt;

use bitflags::bitflags;

use crate::app::ports::{Latch, ResetLatches};

/// Why the device most recently started executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetCause {
    PowerOn,
    BrownOut,
    WatchdogTimeout,
    SleepWake,
    PinReset,
    Unknown,
}

impl ResetCause {
    /// Console text for this cause.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::PowerOn => "Power-on reset",
            Self::BrownOut => "Brown-out reset",
            Self::WatchdogTimeout => "Watchdog reset",
            Self::SleepWake => "Pin reset (sleep)",
            Self::PinReset => "Pin reset",
            Self::Unknown => "Unknown reset",
        }
    }

    /// Supply was lost or sagged.
    pub const fn is_power_failure(self) -> bool {
        matches!(self, Self::PowerOn | Self::BrownOut)
    }
}

impl fmt::Display for ResetCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

bitflags! {
    /// Facts about this boot, fixed before the run loop starts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BootFlags: u8 {
        const START_BUTTON_HELD = 0b0000_0001;
        const SETUP_BUTTON_HELD = 0b0000_0010;
        const POWER_FAILURE     = 0b0000_0100;
    }
}

impl BootFlags {
    /// Only the bits the early button read is allowed to report.
    pub const BUTTONS: Self = Self::START_BUTTON_HELD.union(Self::SETUP_BUTTON_HELD);
}

/// Result of [`classify_reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetReport {
    pub cause: ResetCause,
    pub power_failure: bool,
}

impl ResetReport {
    /// Merge with the buttons sampled during early init.
    pub fn boot_flags(&self, buttons: BootFlags) -> BootFlags {
        let mut flags = buttons & BootFlags::BUTTONS;
        flags.set(BootFlags::POWER_FAILURE, self.power_failure);
        flags
    }
}

/// Decode the latches into a single cause and re-arm them.
pub fn classify_reset(latches: &mut impl ResetLatches) -> ResetReport {
    let cause = decode(latches);

    latches.rearm(Latch::PowerOn);
    latches.rearm(Latch::BrownOut);

    ResetReport {
        cause,
        power_failure: cause.is_power_failure(),
    }
}

fn decode(latches: &impl ResetLatches) -> ResetCause {
    if latches.is_clear(Latch::PowerOn) == Some(true) {
        return ResetCause::PowerOn;
    }
    if latches.is_clear(Latch::BrownOut) == Some(true) {
        return ResetCause::BrownOut;
    }

    match (latches.is_clear(Latch::Timeout), latches.is_clear(Latch::PowerDown)) {
        (None, None) => ResetCause::Unknown,
        (Some(true), _) => ResetCause::WatchdogTimeout,
        (_, Some(true)) => ResetCause::SleepWake,
        _ => ResetCause::PinReset,
    }
}
