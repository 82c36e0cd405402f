//! Early read of the front-panel buttons.
//!
//! Sampled once during boot, before the user-interface subsystem takes the
//! pins over.  Both switches are active-low with pull-ups; a pin that
//! cannot be read counts as released.

use embedded_hal::digital::InputPin;

use crate::reset::BootFlags;

pub struct BootButtons<S, P> {
    start: S,
    setup: P,
}

impl<S: InputPin, P: InputPin> BootButtons<S, P> {
    pub fn new(start: S, setup: P) -> Self {
        Self { start, setup }
    }

    /// Which buttons are held right now.
    pub fn sample(&mut self) -> BootFlags {
        let mut flags = BootFlags::empty();
        flags.set(BootFlags::START_BUTTON_HELD, self.start.is_low().unwrap_or(false));
        flags.set(BootFlags::SETUP_BUTTON_HELD, self.setup.is_low().unwrap_or(false));
        flags
    }
}
