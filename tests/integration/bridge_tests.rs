//! Interrupt bridge wired to the real routing: clock, sensor mailbox and
//! serial transport.

use crate::mock_hw::{MockRegs, MockUart};

use geniediag::app::service::InterruptRouting;
use geniediag::bridge::{InterruptBridge, InterruptEvent, IrqFlags};
use geniediag::drivers::serial::SerialTransport;
use geniediag::events::SensorMailbox;
use geniediag::timekeeping::TickClock;

const SENSOR_MASK: u8 = 0b0000_0001;

struct Board {
    regs: MockRegs,
    bridge: InterruptBridge,
    clock: TickClock,
    mailbox: SensorMailbox,
    serial: SerialTransport<MockUart>,
}

impl Board {
    fn new(port: u8) -> Self {
        let regs = MockRegs { port, ..MockRegs::default() };
        let bridge = InterruptBridge::new(&regs, SENSOR_MASK);
        Self {
            regs,
            bridge,
            clock: TickClock::new(),
            mailbox: SensorMailbox::new(),
            serial: SerialTransport::new(MockUart::default()),
        }
    }

    fn interrupt(&mut self) -> Vec<InterruptEvent> {
        let mut routing = InterruptRouting {
            clock: &self.clock,
            sensor: &self.mailbox,
            serial: &mut self.serial,
        };
        self.bridge.service(&mut self.regs, &mut routing).into_iter().collect()
    }
}

#[test]
fn timer_ticks_advance_the_clock() {
    let mut board = Board::new(0);
    for _ in 0..3 {
        board.regs.flags.insert(IrqFlags::TIMER);
        assert_eq!(board.interrupt(), [InterruptEvent::TimerTick]);
    }
    assert_eq!(board.clock.now(), 3);
    assert!(board.regs.flags.is_empty());
}

#[test]
fn sample_tick_and_edge_reach_the_sensor_mailbox() {
    let mut board = Board::new(0);
    board.regs.flags = IrqFlags::SAMPLE_TIMER | IrqFlags::PORT_CHANGE;
    board.regs.port = 0b1;

    assert_eq!(
        board.interrupt(),
        [InterruptEvent::SampleTimerTick, InterruptEvent::PortChange(0b1)]
    );
    assert_eq!(board.mailbox.take_sample_ticks(), 1);
    assert_eq!(board.mailbox.take_edges(), 1);
}

#[test]
fn unmasked_port_change_is_silent() {
    let mut board = Board::new(0);
    board.regs.flags = IrqFlags::PORT_CHANGE;
    board.regs.port = 0b1000_0110;

    assert!(board.interrupt().is_empty());
    assert!(board.mailbox.is_empty());
    assert!(!board.regs.flags.contains(IrqFlags::PORT_CHANGE));
}

#[test]
fn edge_reverting_between_clear_and_read_is_not_reported() {
    let mut board = Board::new(0);
    board.regs.flags = IrqFlags::PORT_CHANGE;
    board.regs.port = 0b1;
    // Sensor bit drops back while the bridge is between clear and read.
    board.regs.on_clear_port_change = Some(0b0);

    // Snapshot and port both read 0: no event, flag left raised.
    assert!(board.interrupt().is_empty());
    assert!(board.regs.flags.contains(IrqFlags::PORT_CHANGE));

    // The re-raised flag finds nothing new.
    assert!(board.interrupt().is_empty());
    assert_eq!(board.mailbox.take_edges(), 0);
}

#[test]
fn received_bytes_land_in_the_rx_ring() {
    let mut board = Board::new(0);
    board.serial.uart_mut().rx.extend(b"start\r");
    board.regs.flags = IrqFlags::RX_READY;

    assert_eq!(board.interrupt(), [InterruptEvent::ByteReceived]);
    // Handler-cleared flag: the bridge never clears it.
    assert!(board.regs.clears.is_empty());

    let mut got = Vec::new();
    while let Some(b) = board.serial.read_byte() {
        got.push(b);
    }
    assert_eq!(got, b"start\r");
}

#[test]
fn transmit_interrupt_drains_then_masks_itself() {
    use core::fmt::Write;

    let mut board = Board::new(0);
    write!(board.serial, "OK").unwrap();
    assert!(board.serial.uart_mut().tx_irq);

    for _ in 0..3 {
        board.regs.flags = IrqFlags::TX_READY;
        board.interrupt();
    }
    assert_eq!(board.serial.uart_mut().sent, b"OK");
    assert!(!board.serial.uart_mut().tx_irq);
}

#[test]
fn all_sources_in_one_invocation_keep_scan_order() {
    let mut board = Board::new(0);
    board.serial.uart_mut().rx.push_back(b'x');
    board.regs.port = 0b1;
    board.regs.flags = IrqFlags::all();

    assert_eq!(
        board.interrupt(),
        [
            InterruptEvent::TimerTick,
            InterruptEvent::SampleTimerTick,
            InterruptEvent::PortChange(0b1),
            InterruptEvent::ByteReceived,
            InterruptEvent::ByteTransmitted,
        ]
    );
    assert_eq!(
        board.regs.clears,
        [IrqFlags::TIMER, IrqFlags::SAMPLE_TIMER, IrqFlags::PORT_CHANGE]
    );
}
