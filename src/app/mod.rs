//! Application core: boot-time and run-time wiring, zero I/O.
//!
//! All interaction with hardware and with the appliance collaborators
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod commands;
pub mod ports;
pub mod service;
