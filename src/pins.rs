//! GPIO / peripheral pin assignments for the controller board.
//!
//! Every driver references this module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// UART carrying the command console (or the wireless module).
pub const CONSOLE_UART: i32 = 0;

// ---------------------------------------------------------------------------
// Front panel (active-low, external pull-ups)
// ---------------------------------------------------------------------------

pub const START_BUTTON_GPIO: i32 = 14;
pub const SETUP_BUTTON_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Monitored input port
// ---------------------------------------------------------------------------

/// Bit `n` of the monitored port is the level of `SENSOR_PORT[n]`.
/// Bit 0 is the cat-sensor IR receiver.
pub const SENSOR_PORT: &[i32] = &[4];
