//! Scheduler → DiagService → console → registry → appliance, end to end
//! over the serial transport.

use core::cell::Cell;

use crate::mock_hw::{ApplianceCall, Counting, MockAppliance, MockUart};

use geniediag::app::commands::diag_registry;
use geniediag::app::service::DiagService;
use geniediag::drivers::serial::SerialTransport;
use geniediag::scheduler::{Scheduler, SchedulerConfig};
use geniediag::timekeeping::TickClock;

type Service = DiagService<Counting, Counting, MockAppliance, Counting, SerialTransport<MockUart>>;

fn service(command_line: bool) -> Service {
    let registry = command_line.then(|| diag_registry::<MockAppliance>().unwrap().build());
    let mut serial = SerialTransport::new(MockUart::default());
    serial.open(19_200).unwrap();
    DiagService::new(
        Counting::default(),
        Counting::default(),
        MockAppliance::default(),
        Counting::default(),
        registry,
        serial,
    )
}

fn config(console: bool) -> SchedulerConfig {
    SchedulerConfig { console, refresh_liveness: true, budget_ticks: 100 }
}

/// Feed bytes through the receive interrupt.
fn type_in(svc: &mut Service, text: &str) {
    let serial = svc.io_mut();
    serial.uart_mut().rx.extend(text.bytes());
    serial.rx_isr();
}

/// Drain the transmit ring and return everything sent so far.
fn output(svc: &mut Service) -> String {
    let serial = svc.io_mut();
    while serial.tx_pending() > 0 {
        serial.tx_isr();
    }
    serial.uart_mut().sent_text()
}

#[test]
fn start_with_argument_is_rejected_then_plain_start_runs_once() {
    let clock = TickClock::new();
    let mut sched = Scheduler::new(|| {}, &clock, config(true));
    let mut svc = service(true);

    type_in(&mut svc, "start now\rstart\r");
    sched.run_for(3, &mut svc);

    assert_eq!(output(&mut svc), "Syntax error\r\nOK\r\n");
    assert_eq!(svc.appliance().count(ApplianceCall::StartShort), 1);
    assert_eq!(svc.appliance().count(ApplianceCall::Work), 3);
    assert_eq!(svc.console().executed(), 2);
}

#[test]
fn unknown_and_blank_lines() {
    let clock = TickClock::new();
    let mut sched = Scheduler::new(|| {}, &clock, config(true));
    let mut svc = service(true);

    type_in(&mut svc, "dosage 3\r\r   \recho hi  there\r");
    sched.run_for(4, &mut svc);

    // The bare CR is swallowed by the line buffer, the spaces-only line is
    // a no-op that still gets an indicator.
    assert_eq!(output(&mut svc), "Unknown command\r\nOK\r\nhi there\r\nOK\r\n");
    assert!(svc.appliance().calls.iter().all(|c| *c == ApplianceCall::Work));
}

#[test]
fn lock_and_setup_reach_the_appliance() {
    let clock = TickClock::new();
    let mut sched = Scheduler::new(|| {}, &clock, config(true));
    let mut svc = service(true);

    type_in(&mut svc, "setup\nlock\n");
    sched.run_for(2, &mut svc);

    assert_eq!(svc.appliance().count(ApplianceCall::SetupShort), 1);
    assert_eq!(svc.appliance().count(ApplianceCall::BothLong), 1);
}

#[test]
fn without_command_line_input_is_never_read() {
    let clock = TickClock::new();
    let mut sched = Scheduler::new(|| {}, &clock, config(false));
    let mut svc = service(false);

    type_in(&mut svc, "start\r");
    sched.run_for(5, &mut svc);

    assert_eq!(svc.appliance().count(ApplianceCall::StartShort), 0);
    assert_eq!(svc.console().executed(), 0);
    assert_eq!(output(&mut svc), "");
}

#[test]
fn liveness_refreshed_once_per_iteration() {
    let clock = TickClock::new();
    let refreshes = Cell::new(0u32);
    let mut sched = Scheduler::new(|| refreshes.set(refreshes.get() + 1), &clock, config(true));
    let mut svc = service(true);

    sched.run_for(10, &mut svc);

    assert_eq!(refreshes.get(), 10);
    assert_eq!(sched.stats().iterations, 10);
    assert_eq!(svc.appliance().count(ApplianceCall::Work), 10);
}

#[test]
fn a_stalled_iteration_is_counted_against_the_budget() {
    let clock = TickClock::new();
    let mut sched = Scheduler::new(
        || {
            // Model a slow pass: time moves on while the loop runs.
            for _ in 0..150 {
                clock.on_tick();
            }
        },
        &clock,
        config(false),
    );
    let mut svc = service(false);

    sched.run_for(2, &mut svc);
    assert_eq!(sched.stats().over_budget, 2);
    assert_eq!(sched.stats().longest_ticks, 150);
}
