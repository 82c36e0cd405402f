//! GenieDiag Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ConsoleUart   ReasonLatches   BoardRegisters   Watchdog       │
//! │  (Uart)        (ResetLatches)  (Flag+Port reg)  (Liveness)     │
//! │  MailboxSensor · IdleSubsystem · LoggedAppliance               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  boot ─▶ InterruptBridge (esp_timer task) ─▶ InterruptRouting  │
//! │  Scheduler ─▶ DiagService ─▶ subsystems · Console/Registry     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use esp_idf_hal::gpio::{AnyInputPin, PinDriver, Pull};
use log::{info, warn};

use geniediag::adapters::collaborators::{IdleSubsystem, LoggedAppliance, MailboxSensor};
use geniediag::adapters::irq_flags::{AtomicFlagRegister, BoardRegisters, GpioPort};
use geniediag::adapters::reset_latches::{ReasonLatches, ResetReason};
use geniediag::app::ports::WirelessLink;
use geniediag::app::service::{DiagService, InterruptRouting};
use geniediag::boot;
use geniediag::bridge::InterruptBridge;
use geniediag::config::SystemConfig;
use geniediag::drivers::boot_buttons::BootButtons;
use geniediag::drivers::hw_timer;
use geniediag::drivers::serial::{SerialTransport, SharedSerial};
use geniediag::drivers::uart::ConsoleUart;
use geniediag::drivers::watchdog::Watchdog;
use geniediag::events::SensorMailbox;
use geniediag::isr::IsrCell;
use geniediag::pins;
use geniediag::reset::BootFlags;
use geniediag::scheduler::{Scheduler, SchedulerConfig};
use geniediag::timekeeping::TickClock;

// ── Interrupt-shared state ────────────────────────────────────

static FLAGS: AtomicFlagRegister = AtomicFlagRegister::new();
static CLOCK: TickClock = TickClock::new();
static MAILBOX: SensorMailbox = SensorMailbox::new();
static BRIDGE: IsrCell<InterruptBridge> = IsrCell::new();
static SERIAL: IsrCell<SerialTransport<ConsoleUart>> = IsrCell::new();

/// Service hook run by both timer callbacks.
fn service_interrupts() {
    SERIAL.with(|serial| {
        let levels = serial.uart_mut().levels();
        BRIDGE.with(|bridge| {
            let mut regs = BoardRegisters::new(&FLAGS, levels, GpioPort::new(pins::SENSOR_PORT));
            let mut routing = InterruptRouting {
                clock: &CLOCK,
                sensor: &MAILBOX,
                serial,
            };
            bridge.service(&mut regs, &mut routing);
        });
    });
}

fn sample_buttons() -> Result<BootFlags> {
    // SAFETY: the button GPIOs are not claimed anywhere else during boot.
    let (start, setup) = unsafe {
        (
            AnyInputPin::new(pins::START_BUTTON_GPIO),
            AnyInputPin::new(pins::SETUP_BUTTON_GPIO),
        )
    };
    let mut start = PinDriver::input(start)?;
    let mut setup = PinDriver::input(setup)?;
    start.set_pull(Pull::Up)?;
    setup.set_pull(Pull::Up)?;
    Ok(BootButtons::new(start, setup).sample())
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  GenieDiag v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    config.validate()?;

    // ── 2. Buttons, console transport, reset classification ───
    let mut serial = SerialTransport::new(ConsoleUart::new(pins::CONSOLE_UART));
    let mut module = geniediag::adapters::wireless::AtModule::new();
    let wireless: Option<&mut dyn WirelessLink> = if config.console.is_wireless() {
        Some(&mut module)
    } else {
        None
    };
    let mut latches = ReasonLatches::new(ResetReason::read());
    let state = boot::start(
        &config,
        || {
            sample_buttons().unwrap_or_else(|e| {
                warn!("Boot buttons unreadable, treated as released: {e}");
                BootFlags::empty()
            })
        },
        &mut serial,
        wireless,
        &mut latches,
    )?;
    info!("Boot: {:?} flags={:?}", state.cause, state.flags);

    // ── 3. Interrupt bridge ───────────────────────────────────
    // Snapshot is taken before any source is armed.
    BRIDGE.install(InterruptBridge::new(&GpioPort::new(pins::SENSOR_PORT), config.sensor_edge_mask));
    SERIAL.install(serial);
    hw_timer::arm_port_change(pins::SENSOR_PORT, &FLAGS)?;
    hw_timer::start_timers(&config, &FLAGS, service_interrupts)?;

    // ── 4. Foreground service ─────────────────────────────────
    let registry = if config.command_line {
        Some(geniediag::app::commands::diag_registry::<LoggedAppliance>()?.build())
    } else {
        None
    };
    let mut service = DiagService::new(
        MailboxSensor::new(&MAILBOX),
        IdleSubsystem::new("water"),
        LoggedAppliance::new(),
        IdleSubsystem::new("ui"),
        registry,
        SharedSerial::new(&SERIAL),
    );

    // ── 5. Run loop ───────────────────────────────────────────
    let sched_config = SchedulerConfig::from(&config);
    info!("System ready. Entering run loop.");

    if config.interactive_debug {
        info!("Interactive debug: watchdog not armed");
        Scheduler::new(|| {}, &CLOCK, sched_config).run(&mut service)
    } else {
        Scheduler::new(Watchdog::new(config.watchdog_timeout_ms), &CLOCK, sched_config).run(&mut service)
    }
}
