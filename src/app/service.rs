//! Firmware wiring: who runs where.
//!
//! [`DiagService`] owns the foreground collaborators and the command
//! console and presents them to the scheduler as one [`WorkLoop`].
//! [`InterruptRouting`] is its interrupt-context counterpart: the set of
//! callbacks the bridge forwards to, each of which only posts state.
//!
//! ```text
//!  InterruptBridge ──▶ InterruptRouting ──▶ TickClock / SensorMailbox / SerialTransport
//!                                                   │
//!  Scheduler ──▶ DiagService ──▶ sensor · water · appliance · ui · console
//! ```

use crate::cmdline::CommandRegistry;
use crate::cmdline::console::{Console, ConsoleIo};
use crate::drivers::serial::SerialTransport;
use crate::events::SensorMailbox;
use crate::scheduler::WorkLoop;
use crate::timekeeping::TickClock;

use super::commands::DiagContext;
use super::ports::{ApplianceControl, InterruptHandlers, Subsystem, Uart};

// ───────────────────────────────────────────────────────────────
// Foreground
// ───────────────────────────────────────────────────────────────

/// The foreground half of the firmware.
pub struct DiagService<S, W, A, U, IO> {
    sensor: S,
    water: W,
    ui: U,
    ctx: DiagContext<A>,
    console: Console,
    /// `None` when built without the command line.
    registry: Option<CommandRegistry<DiagContext<A>>>,
    io: IO,
}

impl<S, W, A, U, IO> DiagService<S, W, A, U, IO>
where
    S: Subsystem,
    W: Subsystem,
    A: Subsystem + ApplianceControl,
    U: Subsystem,
    IO: ConsoleIo,
{
    pub fn new(
        sensor: S,
        water: W,
        appliance: A,
        ui: U,
        registry: Option<CommandRegistry<DiagContext<A>>>,
        io: IO,
    ) -> Self {
        Self {
            sensor,
            water,
            ui,
            ctx: DiagContext::new(appliance),
            console: Console::new(),
            registry,
            io,
        }
    }

    pub fn appliance(&self) -> &A {
        &self.ctx.appliance
    }

    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    pub fn console(&self) -> &Console {
        &self.console
    }
}

impl<S, W, A, U, IO> WorkLoop for DiagService<S, W, A, U, IO>
where
    S: Subsystem,
    W: Subsystem,
    A: Subsystem + ApplianceControl,
    U: Subsystem,
    IO: ConsoleIo,
{
    fn sensor_work(&mut self) {
        self.sensor.work();
    }

    fn water_work(&mut self) {
        self.water.work();
    }

    fn appliance_work(&mut self) {
        self.ctx.appliance.work();
    }

    fn user_interface_work(&mut self) {
        self.ui.work();
    }

    fn console_work(&mut self) {
        if let Some(registry) = &self.registry {
            self.console.poll(registry, &mut self.ctx, &mut self.io);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Interrupt context
// ───────────────────────────────────────────────────────────────

/// Bridge callbacks for this board.  Borrowed for one bridge invocation.
pub struct InterruptRouting<'a, T: Uart> {
    pub clock: &'a TickClock,
    pub sensor: &'a SensorMailbox,
    pub serial: &'a mut SerialTransport<T>,
}

impl<T: Uart> InterruptHandlers for InterruptRouting<'_, T> {
    fn timer_tick(&mut self) {
        self.clock.on_tick();
    }

    fn sample_tick(&mut self) {
        self.sensor.post_sample_tick();
    }

    fn sensor_edge(&mut self) {
        self.sensor.post_edge();
    }

    fn byte_received(&mut self) {
        self.serial.rx_isr();
    }

    fn byte_transmitted(&mut self) {
        self.serial.tx_isr();
    }
}
