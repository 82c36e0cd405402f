//! Mock hardware for integration tests.
//!
//! Every mock records what the core did to it so tests can assert on the
//! full history without real registers.

use std::collections::VecDeque;

use geniediag::app::ports::{
    ApplianceControl, FlagRegister, Latch, PortRegister, ResetLatches, Subsystem, Uart, WirelessLink,
};
use geniediag::bridge::IrqFlags;
use geniediag::error::TransportError;

// ── UART ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockUart {
    pub bitrate: Option<u32>,
    pub configured: Vec<u32>,
    pub released: bool,
    pub rx: VecDeque<u8>,
    pub sent: Vec<u8>,
    pub tx_irq: bool,
}

#[allow(dead_code)]
impl MockUart {
    pub fn sent_text(&self) -> String {
        String::from_utf8_lossy(&self.sent).into_owned()
    }
}

impl Uart for MockUart {
    fn configure(&mut self, bitrate: u32) -> Result<(), TransportError> {
        self.bitrate = Some(bitrate);
        self.configured.push(bitrate);
        self.released = false;
        Ok(())
    }

    fn release(&mut self) {
        self.bitrate = None;
        self.released = true;
        self.tx_irq = false;
    }

    fn read_data(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write_data(&mut self, byte: u8) {
        self.sent.push(byte);
    }

    fn set_tx_interrupt(&mut self, enabled: bool) {
        self.tx_irq = enabled;
    }
}

/// Wireless module that answers (or not) and records the bring-up.
pub struct MockModule {
    pub answers: bool,
    pub inits: u32,
}

impl WirelessLink for MockModule {
    fn init(&mut self, uart: &mut dyn Uart) -> Result<(), TransportError> {
        self.inits += 1;
        uart.write_data(b'+');
        if self.answers {
            Ok(())
        } else {
            Err(TransportError::WirelessNoResponse)
        }
    }
}

// ── Registers ─────────────────────────────────────────────────

/// Flag register plus monitored port.  `on_clear_port_change` models an
/// edge landing between the bridge's clear and its port read.
#[derive(Default)]
pub struct MockRegs {
    pub flags: IrqFlags,
    pub port: u8,
    pub clears: Vec<IrqFlags>,
    pub on_clear_port_change: Option<u8>,
}

impl FlagRegister for MockRegs {
    fn read(&self) -> IrqFlags {
        self.flags
    }

    fn clear(&mut self, flag: IrqFlags) {
        self.flags.remove(flag);
        self.clears.push(flag);
        if flag == IrqFlags::PORT_CHANGE {
            if let Some(port) = self.on_clear_port_change.take() {
                self.port = port;
                self.flags.insert(IrqFlags::PORT_CHANGE);
            }
        }
    }
}

impl PortRegister for MockRegs {
    fn read_port(&self) -> u8 {
        self.port
    }
}

// ── Reset latches ─────────────────────────────────────────────

/// `true` = latch reads clear (event recorded); `None` = not exposed.
#[derive(Default)]
pub struct MockLatches {
    pub por: bool,
    pub bor: bool,
    pub timeout: Option<bool>,
    pub powerdown: Option<bool>,
    pub rearmed: Vec<Latch>,
}

#[allow(dead_code)]
impl MockLatches {
    /// Every latch exposed and idle.
    pub fn idle() -> Self {
        Self {
            timeout: Some(false),
            powerdown: Some(false),
            ..Self::default()
        }
    }

    pub fn power_on() -> Self {
        Self { por: true, ..Self::idle() }
    }
}

impl ResetLatches for MockLatches {
    fn is_clear(&self, latch: Latch) -> Option<bool> {
        match latch {
            Latch::PowerOn => Some(self.por),
            Latch::BrownOut => Some(self.bor),
            Latch::Timeout => self.timeout,
            Latch::PowerDown => self.powerdown,
        }
    }

    fn rearm(&mut self, latch: Latch) {
        match latch {
            Latch::PowerOn => self.por = false,
            Latch::BrownOut => self.bor = false,
            Latch::Timeout => self.timeout = self.timeout.map(|_| false),
            Latch::PowerDown => self.powerdown = self.powerdown.map(|_| false),
        }
        self.rearmed.push(latch);
    }
}

// ── Collaborators ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplianceCall {
    StartShort,
    SetupShort,
    BothLong,
    Work,
}

#[derive(Default)]
pub struct MockAppliance {
    pub calls: Vec<ApplianceCall>,
}

#[allow(dead_code)]
impl MockAppliance {
    pub fn count(&self, call: ApplianceCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl ApplianceControl for MockAppliance {
    fn start_short(&mut self) {
        self.calls.push(ApplianceCall::StartShort);
    }

    fn setup_short(&mut self) {
        self.calls.push(ApplianceCall::SetupShort);
    }

    fn both_long(&mut self) {
        self.calls.push(ApplianceCall::BothLong);
    }
}

impl Subsystem for MockAppliance {
    fn work(&mut self) {
        self.calls.push(ApplianceCall::Work);
    }
}

/// Subsystem that only counts its turns.
#[derive(Default)]
pub struct Counting {
    pub turns: u32,
}

impl Subsystem for Counting {
    fn work(&mut self) {
        self.turns += 1;
    }
}
