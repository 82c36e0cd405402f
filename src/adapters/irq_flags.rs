//! Software model of the interrupt flag register.
//!
//! ESP-IDF has no single flag register covering our sources, so one is
//! kept here.  Edge-style sources (the two timers and the sensor GPIO)
//! latch into an [`AtomicFlagRegister`] from their callbacks.  The UART
//! conditions are level-style: they are sampled right before each bridge
//! invocation and go away once the handler has consumed them, exactly
//! like a receive-ready bit that clears on a data-register read.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::app::ports::{FlagRegister, PortRegister};
use crate::bridge::IrqFlags;

/// Latched flags, raised from callback context.
pub struct AtomicFlagRegister {
    pending: AtomicU8,
}

impl AtomicFlagRegister {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(0),
        }
    }

    /// Latch `flags`.  Callable from any context.
    pub fn raise(&self, flags: IrqFlags) {
        self.pending.fetch_or(flags.bits(), Ordering::AcqRel);
    }

    pub fn pending(&self) -> IrqFlags {
        IrqFlags::from_bits_truncate(self.pending.load(Ordering::Acquire))
    }

    fn clear(&self, flags: IrqFlags) {
        self.pending.fetch_and(!flags.bits(), Ordering::AcqRel);
    }
}

impl Default for AtomicFlagRegister {
    fn default() -> Self {
        Self::new()
    }
}

/// The register view handed to the bridge for one invocation.
pub struct BoardRegisters<'a, P> {
    latched: &'a AtomicFlagRegister,
    levels: IrqFlags,
    port: P,
}

impl<'a, P: PortRegister> BoardRegisters<'a, P> {
    /// `levels` are the level-style conditions sampled just now.
    pub fn new(latched: &'a AtomicFlagRegister, levels: IrqFlags, port: P) -> Self {
        Self { latched, levels, port }
    }
}

impl<P> FlagRegister for BoardRegisters<'_, P> {
    fn read(&self) -> IrqFlags {
        self.latched.pending() | self.levels
    }

    fn clear(&mut self, flag: IrqFlags) {
        self.latched.clear(flag);
        self.levels.remove(flag);
    }
}

impl<P: PortRegister> PortRegister for BoardRegisters<'_, P> {
    fn read_port(&self) -> u8 {
        self.port.read_port()
    }
}

// ── Monitored input port ──────────────────────────────────────

/// Packs GPIO levels into the monitored port byte: bit `n` is `pins[n]`.
pub struct GpioPort {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    pins: &'static [i32],
}

impl GpioPort {
    pub const fn new(pins: &'static [i32]) -> Self {
        Self { pins }
    }
}

impl PortRegister for GpioPort {
    #[cfg(target_os = "espidf")]
    fn read_port(&self) -> u8 {
        let mut value = 0u8;
        for (bit, &pin) in self.pins.iter().take(8).enumerate() {
            // SAFETY: reading the input level of a configured GPIO has no
            // side effects.
            if unsafe { esp_idf_svc::sys::gpio_get_level(pin) } != 0 {
                value |= 1 << bit;
            }
        }
        value
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_port(&self) -> u8 {
        0
    }
}
