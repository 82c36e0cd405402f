//! System configuration parameters
//!
//! Build-time options (Cargo features) seed the defaults; the values are
//! plain data so host tests can flip any of them.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which byte stream carries the command console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsoleRoute {
    /// Plain serial console on the debug UART.
    Serial { bitrate: u32 },
    /// Console tunnelled through the wireless module hanging off the UART.
    Wireless { bitrate: u32 },
}

impl ConsoleRoute {
    pub fn bitrate(&self) -> u32 {
        match self {
            Self::Serial { bitrate } | Self::Wireless { bitrate } => *bitrate,
        }
    }

    pub fn is_wireless(&self) -> bool {
        matches!(self, Self::Wireless { .. })
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// First line written to the console after reset.
    pub banner: heapless::String<32>,
    /// Console transport selection.
    pub console: ConsoleRoute,
    /// Build the command registry and poll the console every loop turn.
    pub command_line: bool,
    /// Debugger attached: never refresh the watchdog from the loop.
    pub interactive_debug: bool,

    // --- Timing ---
    /// Hardware liveness timer period (milliseconds).
    pub watchdog_timeout_ms: u32,
    /// Primary (timekeeping) timer rate.
    pub timer_tick_hz: u32,
    /// Secondary (sensor sampling) timer rate.
    pub sample_tick_hz: u32,
    /// A loop iteration longer than this is reported once.
    pub loop_budget_ms: u32,

    // --- Inputs ---
    /// Bits of the monitored input port that belong to the cat sensor.
    pub sensor_edge_mask: u8,
}

/// Serial console bitrate.
pub const SERIAL_BITRATE: u32 = 19_200;
/// Bitrate the wireless module expects on its UART side.
pub const WIRELESS_BITRATE: u32 = 115_200;

impl Default for SystemConfig {
    fn default() -> Self {
        let mut banner = heapless::String::new();
        let _ = banner.push_str("*** GenieDiag ***");

        let console = if cfg!(feature = "bluetooth") {
            ConsoleRoute::Wireless { bitrate: WIRELESS_BITRATE }
        } else {
            ConsoleRoute::Serial { bitrate: SERIAL_BITRATE }
        };

        Self {
            banner,
            console,
            command_line: cfg!(feature = "cmdline"),
            interactive_debug: cfg!(feature = "interactive-debug"),

            watchdog_timeout_ms: 2_000,
            timer_tick_hz: 1_000,  // 1 ms logical clock
            sample_tick_hz: 4_000, // cat sensor sampling
            loop_budget_ms: 100,

            sensor_edge_mask: 0b0000_0001, // RB0: IR receiver
        }
    }
}

impl SystemConfig {
    /// Reject settings the run loop cannot honour.
    pub fn validate(&self) -> Result<(), Error> {
        if self.timer_tick_hz == 0 || self.sample_tick_hz == 0 {
            return Err(Error::Config("tick rates must be non-zero"));
        }
        if self.watchdog_timeout_ms == 0 {
            return Err(Error::Config("watchdog period must be non-zero"));
        }
        if self.loop_budget_ms >= self.watchdog_timeout_ms {
            return Err(Error::Config("loop budget must be shorter than the watchdog period"));
        }
        if self.console.bitrate() == 0 {
            return Err(Error::Config("console bitrate must be non-zero"));
        }
        Ok(())
    }

    /// Loop budget expressed in primary timer ticks.
    pub fn loop_budget_ticks(&self) -> u32 {
        ((self.loop_budget_ms as u64 * self.timer_tick_hz as u64) / 1000).max(1) as u32
    }
}
