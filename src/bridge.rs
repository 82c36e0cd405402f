//! Interrupt bridge: the only code that runs in interrupt context.
//!
//! One invocation scans the interrupt flags in a fixed order, turns each
//! pending source into an [`InterruptEvent`], and hands that event to the
//! single subsystem callback that owns it.  Callbacks only post state; the
//! foreground work functions pick it up on their next scheduler turn.
//!
//! ```text
//!  flag register ──▶ ┌───────────────────────┐ ──▶ timer_tick       (timekeeping)
//!                    │  InterruptBridge      │ ──▶ sample_tick      (sensor)
//!  input port    ──▶ │  scan · clear · diff  │ ──▶ sensor_edge      (sensor)
//!                    │  owns PortSnapshot    │ ──▶ byte_received    (transport)
//!                    └───────────────────────┘ ──▶ byte_transmitted (transport)
//! ```
//!
//! ## Clear policy per flag
//!
//! | Flag           | Cleared by | When                                        |
//! |----------------|------------|---------------------------------------------|
//! | `TIMER`        | bridge     | before the handler runs                     |
//! | `SAMPLE_TIMER` | bridge     | before the handler runs                     |
//! | `PORT_CHANGE`  | bridge     | before the port is read and diffed          |
//! | `RX_READY`     | handler    | reading the data register consumes it       |
//! | `TX_READY`     | handler    | loading a byte or masking the interrupt     |
//!
//! The port-change order is load-bearing.  Clearing first means a source
//! that re-raises synchronously cannot retrigger forever, at the price of
//! folding an edge that lands between the clear and the port read into the
//! current diff; the re-raised flag then finds nothing new next time.

use bitflags::bitflags;

use crate::app::ports::{FlagRegister, InterruptHandlers, PortRegister};

bitflags! {
    /// Interrupt sources the bridge services.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IrqFlags: u8 {
        /// Primary timer compare (timekeeping).
        const TIMER        = 0b0000_0001;
        /// Secondary timer compare (sensor sampling).
        const SAMPLE_TIMER = 0b0000_0010;
        /// Monitored input port changed.
        const PORT_CHANGE  = 0b0000_0100;
        /// UART receive data ready.
        const RX_READY     = 0b0000_1000;
        /// UART transmit register empty.
        const TX_READY     = 0b0001_0000;
    }
}

/// Who clears a flag, and when.  Each entry names the event it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearPolicy {
    /// Bridge clears the flag, then dispatches the event.
    BeforeDispatch(InterruptEvent),
    /// Bridge clears the flag, then reads the port and diffs it against the
    /// snapshot.  The event exists only if sensor bits changed.
    BeforeDiff,
    /// The handler consumes the underlying condition itself.
    ByHandler(InterruptEvent),
}

/// Number of interrupt sources the bridge knows about.
pub const SOURCE_COUNT: usize = 5;

/// Flags in service order, each with its clear policy.
pub const SCAN_ORDER: [(IrqFlags, ClearPolicy); SOURCE_COUNT] = [
    (IrqFlags::TIMER, ClearPolicy::BeforeDispatch(InterruptEvent::TimerTick)),
    (IrqFlags::SAMPLE_TIMER, ClearPolicy::BeforeDispatch(InterruptEvent::SampleTimerTick)),
    (IrqFlags::PORT_CHANGE, ClearPolicy::BeforeDiff),
    (IrqFlags::RX_READY, ClearPolicy::ByHandler(InterruptEvent::ByteReceived)),
    (IrqFlags::TX_READY, ClearPolicy::ByHandler(InterruptEvent::ByteTransmitted)),
];

/// A serviced interrupt.  Identifies the callback, never its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptEvent {
    TimerTick,
    SampleTimerTick,
    /// Sensor-relevant bits that changed (already masked, never zero).
    PortChange(u8),
    ByteReceived,
    ByteTransmitted,
}

impl InterruptEvent {
    /// Route the event to the one callback that owns it.
    pub fn dispatch(self, handlers: &mut impl InterruptHandlers) {
        match self {
            Self::TimerTick => handlers.timer_tick(),
            Self::SampleTimerTick => handlers.sample_tick(),
            Self::PortChange(_) => handlers.sensor_edge(),
            Self::ByteReceived => handlers.byte_received(),
            Self::ByteTransmitted => handlers.byte_transmitted(),
        }
    }
}

/// Events dispatched during one bridge invocation, in service order.
pub type Serviced = heapless::Vec<InterruptEvent, SOURCE_COUNT>;

/// Owns the port snapshot and services pending interrupt flags.
#[derive(Debug)]
pub struct InterruptBridge {
    /// Last observed value of the monitored port.  Written here only.
    snapshot: u8,
    sensor_mask: u8,
}

impl InterruptBridge {
    /// Capture the current port value as the first snapshot.  Call while
    /// interrupts are still disabled, right before arming them.
    pub fn new(port: &impl PortRegister, sensor_mask: u8) -> Self {
        Self {
            snapshot: port.read_port(),
            sensor_mask,
        }
    }

    /// Service every pending flag once, in [`SCAN_ORDER`].
    ///
    /// A flag raised again by a handler is left for the next invocation;
    /// this never loops back over the scan.
    pub fn service<R, H>(&mut self, regs: &mut R, handlers: &mut H) -> Serviced
    where
        R: FlagRegister + PortRegister,
        H: InterruptHandlers,
    {
        let mut serviced = Serviced::new();

        for (flag, policy) in SCAN_ORDER {
            if !regs.is_set(flag) {
                continue;
            }
            if let Some(event) = self.poll(flag, policy, regs) {
                event.dispatch(handlers);
                // Capacity equals the number of sources, so this never fails.
                let _ = serviced.push(event);
            }
        }

        serviced
    }

    fn poll<R>(&mut self, flag: IrqFlags, policy: ClearPolicy, regs: &mut R) -> Option<InterruptEvent>
    where
        R: FlagRegister + PortRegister,
    {
        match policy {
            ClearPolicy::BeforeDispatch(event) => {
                regs.clear(flag);
                Some(event)
            }
            ClearPolicy::BeforeDiff => {
                regs.clear(flag);
                self.port_changed(regs.read_port())
            }
            ClearPolicy::ByHandler(event) => Some(event),
        }
    }

    /// Diff against the snapshot, then store `current` whatever the outcome.
    fn port_changed(&mut self, current: u8) -> Option<InterruptEvent> {
        let changed = (current ^ self.snapshot) & self.sensor_mask;
        self.snapshot = current;
        (changed != 0).then_some(InterruptEvent::PortChange(changed))
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> u8 {
        self.snapshot
    }
}
