//! Interrupt-driven serial transport.
//!
//! The receive and transmit interrupts move bytes between the UART data
//! registers and two fixed-capacity rings; the foreground only touches the
//! rings.  Received bytes that do not fit are dropped and counted, never
//! waited for.
//!
//! ```text
//!  UART RX ──rx_isr──▶ [rx ring] ──read_byte──▶ console
//!  UART TX ◀─tx_isr─── [tx ring] ◀─write_str─── console
//! ```

use core::fmt;

use heapless::spsc::Queue;

use crate::app::ports::Uart;
use crate::cmdline::console::ConsoleIo;
use crate::error::TransportError;
use crate::isr::IsrCell;

/// Receive ring size (one slot is kept free by the queue).
pub const RX_CAPACITY: usize = 64;
/// Transmit ring size.
pub const TX_CAPACITY: usize = 256;

pub struct SerialTransport<U: Uart> {
    uart: U,
    rx: Queue<u8, RX_CAPACITY>,
    tx: Queue<u8, TX_CAPACITY>,
    rx_dropped: u32,
    tx_dropped: u32,
}

impl<U: Uart> SerialTransport<U> {
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            rx: Queue::new(),
            tx: Queue::new(),
            rx_dropped: 0,
            tx_dropped: 0,
        }
    }

    /// Configure the UART for `bitrate` and start receiving.
    pub fn open(&mut self, bitrate: u32) -> Result<(), TransportError> {
        self.uart.configure(bitrate)
    }

    /// Shut the UART down.  Pending transmit bytes are discarded.
    pub fn close(&mut self) {
        self.uart.set_tx_interrupt(false);
        self.uart.release();
        while self.tx.dequeue().is_some() {}
    }

    /// Raw UART access for link bring-up before the rings are in use.
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    // ── Interrupt half ────────────────────────────────────────

    /// Receive-ready handler: drain the data register into the ring.
    pub fn rx_isr(&mut self) {
        while let Some(byte) = self.uart.read_data() {
            if self.rx.enqueue(byte).is_err() {
                self.rx_dropped = self.rx_dropped.wrapping_add(1);
            }
        }
    }

    /// Transmit-ready handler: feed one byte, or mask the interrupt once
    /// the ring is empty so it stops firing.
    pub fn tx_isr(&mut self) {
        match self.tx.dequeue() {
            Some(byte) => self.uart.write_data(byte),
            None => self.uart.set_tx_interrupt(false),
        }
    }

    // ── Foreground half ───────────────────────────────────────

    pub fn read_byte(&mut self) -> Option<u8> {
        self.rx.dequeue()
    }

    /// Queue one byte for transmission.  `false` if the ring was full.
    pub fn write_byte(&mut self, byte: u8) -> bool {
        let queued = self.tx.enqueue(byte).is_ok();
        if queued {
            self.uart.set_tx_interrupt(true);
        } else {
            self.tx_dropped = self.tx_dropped.wrapping_add(1);
        }
        queued
    }

    /// Bytes lost to a full receive ring since boot.
    pub fn rx_dropped(&self) -> u32 {
        self.rx_dropped
    }

    /// Bytes lost to a full transmit ring since boot.
    pub fn tx_dropped(&self) -> u32 {
        self.tx_dropped
    }

    pub fn tx_pending(&self) -> usize {
        self.tx.len()
    }
}

impl<U: Uart> fmt::Write for SerialTransport<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &b in s.as_bytes() {
            if b == b'\n' && !self.write_byte(b'\r') {
                return Err(fmt::Error);
            }
            if !self.write_byte(b) {
                return Err(fmt::Error);
            }
        }
        Ok(())
    }
}

impl<U: Uart> ConsoleIo for SerialTransport<U> {
    fn read_byte(&mut self) -> Option<u8> {
        SerialTransport::read_byte(self)
    }
}

/// Foreground handle on a transport whose interrupt half lives in an
/// [`IsrCell`].  Each access takes the critical section for one call.
pub struct SharedSerial<'a, U: Uart> {
    cell: &'a IsrCell<SerialTransport<U>>,
}

impl<'a, U: Uart> SharedSerial<'a, U> {
    pub fn new(cell: &'a IsrCell<SerialTransport<U>>) -> Self {
        Self { cell }
    }
}

impl<U: Uart> fmt::Write for SharedSerial<'_, U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.cell.with(|t| fmt::Write::write_str(t, s)).unwrap_or(Err(fmt::Error))
    }
}

impl<U: Uart> ConsoleIo for SharedSerial<'_, U> {
    fn read_byte(&mut self) -> Option<u8> {
        self.cell.with(|t| t.read_byte()).flatten()
    }
}
