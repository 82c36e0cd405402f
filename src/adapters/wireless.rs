//! Serial Bluetooth module bring-up.
//!
//! The module sits on the console UART and speaks the common `AT`
//! command dialect while it is not paired.  Bring-up sends a probe and
//! waits a bounded number of polls for the `OK` answer.

use crate::app::ports::{Uart, WirelessLink};
use crate::error::TransportError;

/// Polls of the receive register before the module counts as absent.
pub const PROBE_POLLS: u32 = 10_000;

pub struct AtModule {
    polls: u32,
}

impl AtModule {
    pub fn new() -> Self {
        Self { polls: PROBE_POLLS }
    }

    pub fn with_polls(polls: u32) -> Self {
        Self { polls }
    }
}

impl Default for AtModule {
    fn default() -> Self {
        Self::new()
    }
}

impl WirelessLink for AtModule {
    fn init(&mut self, uart: &mut dyn Uart) -> Result<(), TransportError> {
        for &b in b"AT\r\n" {
            uart.write_data(b);
        }

        // Match "OK" anywhere in the reply; echo and line noise are skipped.
        let mut prev = 0u8;
        for _ in 0..self.polls {
            if let Some(b) = uart.read_data() {
                if prev == b'O' && b == b'K' {
                    log::info!("wireless: module answered");
                    return Ok(());
                }
                prev = b;
            }
        }
        Err(TransportError::WirelessNoResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Wire {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
    }

    impl Uart for Wire {
        fn configure(&mut self, _bitrate: u32) -> Result<(), TransportError> {
            Ok(())
        }
        fn release(&mut self) {}
        fn read_data(&mut self) -> Option<u8> {
            self.rx.pop_front()
        }
        fn write_data(&mut self, byte: u8) {
            self.tx.push(byte);
        }
        fn set_tx_interrupt(&mut self, _enabled: bool) {}
    }

    #[test]
    fn ok_reply_brings_link_up() {
        let mut wire = Wire { rx: b"AT\r\nOK\r\n".iter().copied().collect(), ..Default::default() };
        assert_eq!(AtModule::with_polls(32).init(&mut wire), Ok(()));
        assert_eq!(wire.tx, b"AT\r\n");
    }

    #[test]
    fn silence_is_no_response() {
        let mut wire = Wire::default();
        assert_eq!(
            AtModule::with_polls(32).init(&mut wire),
            Err(TransportError::WirelessNoResponse)
        );
    }
}
