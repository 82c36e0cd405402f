//! Port traits: the capability boundary between the run core and the board.
//!
//! ```text
//!   Board / collaborator ──▶ Port trait ──▶ boot · bridge · scheduler · cmdline
//! ```
//!
//! The core never touches registers directly.  Every hardware resource it
//! needs (reset latches, interrupt flags, the monitored input port, the
//! liveness timer, the UART) and every collaborator it drives (sensor,
//! water, appliance sequencing, user interface) is reached through one of
//! these traits, so the whole core runs on the host against mocks.

use crate::bridge::IrqFlags;
use crate::error::TransportError;

// ───────────────────────────────────────────────────────────────
// Reset latches (read + explicit re-arm)
// ───────────────────────────────────────────────────────────────

/// Hardware latch bits that survive a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Latch {
    PowerOn,
    BrownOut,
    /// Watchdog/timeout latch.
    Timeout,
    /// Sleep/power-down latch.
    PowerDown,
}

/// Read-side and re-arm access to the reset-cause latches.
///
/// Reading never resets a latch.  A latch that reads *clear* records that
/// its event happened; software must put it back to idle with
/// [`rearm`](Self::rearm) or the next boot sees a stale cause.
pub trait ResetLatches {
    /// `Some(true)` if the latch is clear, `Some(false)` if idle,
    /// `None` if this platform does not expose the latch.
    fn is_clear(&self, latch: Latch) -> Option<bool>;

    /// Return the latch to its idle value.
    fn rearm(&mut self, latch: Latch);
}

// ───────────────────────────────────────────────────────────────
// Interrupt sources
// ───────────────────────────────────────────────────────────────

/// The interrupt flag register, one bit per source.
///
/// Flags are independent: any combination may be pending at once and each
/// one is cleared on its own.
pub trait FlagRegister {
    /// Snapshot of every pending flag.
    fn read(&self) -> IrqFlags;

    fn is_set(&self, flag: IrqFlags) -> bool {
        self.read().contains(flag)
    }

    /// Clear exactly the given flag(s).
    fn clear(&mut self, flag: IrqFlags);
}

/// The monitored digital input port.
pub trait PortRegister {
    fn read_port(&self) -> u8;
}

/// Callbacks the interrupt bridge forwards to.  Every one of these runs in
/// interrupt context: no blocking, no allocation, bounded time.
pub trait InterruptHandlers {
    /// Timekeeping tick (primary timer).
    fn timer_tick(&mut self);
    /// Sensor sampling tick (secondary timer).
    fn sample_tick(&mut self);
    /// A sensor-relevant bit of the monitored port changed.
    fn sensor_edge(&mut self);
    /// UART has a received byte waiting; the handler consumes it.
    fn byte_received(&mut self);
    /// UART can accept a byte; the handler feeds or disables it.
    fn byte_transmitted(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Liveness timer
// ───────────────────────────────────────────────────────────────

/// Refresh primitive for the hardware liveness timer.
pub trait Liveness {
    fn refresh(&mut self);
}

impl<F: FnMut()> Liveness for F {
    fn refresh(&mut self) {
        self()
    }
}

// ───────────────────────────────────────────────────────────────
// Foreground subsystems
// ───────────────────────────────────────────────────────────────

/// A collaborator with a non-blocking "do pending work" entry point.
pub trait Subsystem {
    /// Must return promptly.  A work function that hangs past the
    /// watchdog period gets the whole device restarted.
    fn work(&mut self);
}

/// Appliance-level sequences the diagnostic commands can trigger.
pub trait ApplianceControl {
    /// Same as a short press of the start button.
    fn start_short(&mut self);
    /// Same as a short press of the setup button.
    fn setup_short(&mut self);
    /// Same as holding both buttons: toggles the child lock.
    fn both_long(&mut self);
}

// ───────────────────────────────────────────────────────────────
// UART / wireless link
// ───────────────────────────────────────────────────────────────

/// Register-level UART access used by the serial transport.
pub trait Uart {
    /// Configure and enable the UART.
    fn configure(&mut self, bitrate: u32) -> Result<(), TransportError>;
    /// Disable the UART and release the pins.
    fn release(&mut self);
    /// Pop the receive data register; consumes the receive-ready condition.
    fn read_data(&mut self) -> Option<u8>;
    /// Load the transmit data register.
    fn write_data(&mut self, byte: u8);
    /// Enable or disable the transmit-ready interrupt.
    fn set_tx_interrupt(&mut self, enabled: bool);
}

/// Bring-up of the wireless module that tunnels the console.
pub trait WirelessLink {
    fn init(&mut self, uart: &mut dyn Uart) -> Result<(), TransportError>;
}
