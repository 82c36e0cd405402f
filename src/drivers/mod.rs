//! Peripheral drivers: console UART, interrupt sources, liveness timer.

pub mod boot_buttons;
pub mod hw_timer;
pub mod serial;
pub mod uart;
pub mod watchdog;
