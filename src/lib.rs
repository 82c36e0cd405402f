//! GenieDiag firmware library.
//!
//! Exposes the boot and run core for integration testing and for the
//! ESP-IDF binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod boot;
pub mod bridge;
pub mod cmdline;
pub mod config;
pub mod error;
pub mod events;
pub mod isr;
pub mod pins;
pub mod reset;
pub mod scheduler;
pub mod timekeeping;

pub mod adapters;
pub mod drivers;
