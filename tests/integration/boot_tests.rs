//! Boot path: console bring-up, reset classification and the announcement
//! as it leaves the UART.

use crate::mock_hw::{MockLatches, MockModule, MockUart};

use geniediag::app::ports::Latch;
use geniediag::boot::{boot, init_console_transport};
use geniediag::config::{ConsoleRoute, SERIAL_BITRATE, SystemConfig, WIRELESS_BITRATE};
use geniediag::drivers::serial::SerialTransport;
use geniediag::error::{Error, TransportError};
use geniediag::reset::{BootFlags, ResetCause};

fn serial_config() -> SystemConfig {
    let mut c = SystemConfig::default();
    c.console = ConsoleRoute::Serial { bitrate: SERIAL_BITRATE };
    c
}

fn wireless_config() -> SystemConfig {
    let mut c = SystemConfig::default();
    c.console = ConsoleRoute::Wireless { bitrate: WIRELESS_BITRATE };
    c
}

/// Run the transmit interrupt until the ring is empty.
fn drain(serial: &mut SerialTransport<MockUart>) -> String {
    while serial.tx_pending() > 0 {
        serial.tx_isr();
    }
    serial.uart_mut().sent_text()
}

#[test]
fn power_on_with_setup_button_held() {
    let config = serial_config();
    let mut serial = SerialTransport::new(MockUart::default());
    init_console_transport(&config, &mut serial, None).unwrap();

    let mut latches = MockLatches::power_on();
    let state = boot(&config, &mut latches, BootFlags::SETUP_BUTTON_HELD, &mut serial);

    assert_eq!(state.cause, ResetCause::PowerOn);
    assert_eq!(state.flags, BootFlags::POWER_FAILURE | BootFlags::SETUP_BUTTON_HELD);
    assert_eq!(
        drain(&mut serial),
        "\r\n*** GenieDiag ***\r\nPower-on reset\r\nSetup button held\r\n"
    );
    assert_eq!(latches.rearmed, [Latch::PowerOn, Latch::BrownOut]);
    assert!(!latches.por);
}

#[test]
fn each_latch_maps_to_its_cause() {
    let cases: [(MockLatches, ResetCause); 5] = [
        (MockLatches::power_on(), ResetCause::PowerOn),
        (MockLatches { bor: true, ..MockLatches::idle() }, ResetCause::BrownOut),
        (MockLatches { timeout: Some(true), ..MockLatches::idle() }, ResetCause::WatchdogTimeout),
        (MockLatches { powerdown: Some(true), ..MockLatches::idle() }, ResetCause::SleepWake),
        (MockLatches::idle(), ResetCause::PinReset),
    ];

    for (mut latches, expected) in cases {
        let mut out = String::new();
        let state = boot(&serial_config(), &mut latches, BootFlags::empty(), &mut out);
        assert_eq!(state.cause, expected);
        assert!(out.contains(expected.describe()), "{out:?}");
        assert_eq!(
            state.flags.contains(BootFlags::POWER_FAILURE),
            expected.is_power_failure()
        );
    }
}

#[test]
fn power_on_wins_over_every_other_latch() {
    let mut latches = MockLatches {
        por: true,
        bor: true,
        timeout: Some(true),
        powerdown: Some(true),
        rearmed: Vec::new(),
    };
    let state = boot(&serial_config(), &mut latches, BootFlags::empty(), &mut String::new());
    assert_eq!(state.cause, ResetCause::PowerOn);
}

#[test]
fn missing_timeout_latches_report_unknown() {
    let mut latches = MockLatches::default();
    let mut out = String::new();
    let state = boot(&serial_config(), &mut latches, BootFlags::START_BUTTON_HELD, &mut out);

    assert_eq!(state.cause, ResetCause::Unknown);
    assert_eq!(state.flags, BootFlags::START_BUTTON_HELD);
    assert!(out.ends_with("Unknown reset\nStart button held\n"));
}

#[test]
fn second_boot_does_not_see_stale_power_failure() {
    let config = serial_config();
    let mut latches = MockLatches::power_on();
    let first = boot(&config, &mut latches, BootFlags::empty(), &mut String::new());
    let second = boot(&config, &mut latches, BootFlags::empty(), &mut String::new());

    assert_eq!(first.cause, ResetCause::PowerOn);
    assert_eq!(second.cause, ResetCause::PinReset);
    assert!(!second.flags.contains(BootFlags::POWER_FAILURE));
}

#[test]
fn wireless_route_carries_the_announcement_over_the_link() {
    let config = wireless_config();
    let mut serial = SerialTransport::new(MockUart::default());
    let mut module = MockModule { answers: true, inits: 0 };

    init_console_transport(&config, &mut serial, Some(&mut module)).unwrap();
    assert_eq!(module.inits, 1);
    assert_eq!(serial.uart_mut().configured, [WIRELESS_BITRATE]);
    assert!(!serial.uart_mut().released);

    let mut latches = MockLatches::power_on();
    boot(&config, &mut latches, BootFlags::empty(), &mut serial);

    assert!(serial.uart_mut().tx_irq);
    assert_eq!(drain(&mut serial), "+\r\n*** GenieDiag ***\r\nPower-on reset\r\n");
    assert_eq!(serial.tx_dropped(), 0);
}

#[test]
fn wireless_console_keeps_draining_past_the_ring_size() {
    use core::fmt::Write;

    let config = wireless_config();
    let mut serial = SerialTransport::new(MockUart::default());
    let mut module = MockModule { answers: true, inits: 0 };
    init_console_transport(&config, &mut serial, Some(&mut module)).unwrap();

    // Replies interleaved with transmit interrupts never back up.
    for _ in 0..100 {
        writeln!(serial, "OK").unwrap();
        drain(&mut serial);
    }
    assert_eq!(serial.tx_dropped(), 0);
    assert_eq!(serial.uart_mut().sent.len(), 1 + 100 * 4);
}

#[test]
fn silent_module_fails_boot_with_transport_error() {
    let config = wireless_config();
    let mut serial = SerialTransport::new(MockUart::default());
    let mut module = MockModule { answers: false, inits: 0 };

    assert_eq!(
        init_console_transport(&config, &mut serial, Some(&mut module)),
        Err(Error::Transport(TransportError::WirelessNoResponse))
    );
    assert!(serial.uart_mut().released);
}
