//! Log-backed stand-ins for the appliance collaborators.
//!
//! The sensor, water, appliance and user-interface subsystems live
//! outside this crate.  These adapters fill their ports so the binary runs
//! the full loop on its own, and report what they would have done to the
//! serial log.

use log::{debug, info};

use crate::app::ports::{ApplianceControl, Subsystem};
use crate::events::SensorMailbox;

// ── Sensor ────────────────────────────────────────────────────

/// Drains the sensor mailbox and keeps running totals.
pub struct MailboxSensor<'a> {
    mailbox: &'a SensorMailbox,
    samples: u64,
    edges: u64,
}

impl<'a> MailboxSensor<'a> {
    pub fn new(mailbox: &'a SensorMailbox) -> Self {
        Self {
            mailbox,
            samples: 0,
            edges: 0,
        }
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn edges(&self) -> u64 {
        self.edges
    }
}

impl Subsystem for MailboxSensor<'_> {
    fn work(&mut self) {
        self.samples += u64::from(self.mailbox.take_sample_ticks());
        let edges = self.mailbox.take_edges();
        if edges > 0 {
            self.edges += u64::from(edges);
            debug!("sensor: {} edge(s), {} total", edges, self.edges);
        }
    }
}

// ── Water / user interface ────────────────────────────────────

/// A subsystem with nothing to do yet.  Announces itself once.
pub struct IdleSubsystem {
    name: &'static str,
    turns: u64,
}

impl IdleSubsystem {
    pub fn new(name: &'static str) -> Self {
        Self { name, turns: 0 }
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }
}

impl Subsystem for IdleSubsystem {
    fn work(&mut self) {
        if self.turns == 0 {
            info!("{}: stand-in running", self.name);
        }
        self.turns += 1;
    }
}

// ── Appliance ─────────────────────────────────────────────────

/// Button sequence requested by a diagnostic command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    StartShort,
    SetupShort,
    BothLong,
}

/// Queues one requested sequence and "runs" it on the next work turn.
#[derive(Default)]
pub struct LoggedAppliance {
    pending: Option<Sequence>,
    completed: u32,
}

impl LoggedAppliance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<Sequence> {
        self.pending
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    fn request(&mut self, seq: Sequence) {
        if let Some(prev) = self.pending.replace(seq) {
            info!("appliance: {:?} superseded by {:?}", prev, seq);
        }
    }
}

impl ApplianceControl for LoggedAppliance {
    fn start_short(&mut self) {
        self.request(Sequence::StartShort);
    }

    fn setup_short(&mut self) {
        self.request(Sequence::SetupShort);
    }

    fn both_long(&mut self) {
        self.request(Sequence::BothLong);
    }
}

impl Subsystem for LoggedAppliance {
    fn work(&mut self) {
        if let Some(seq) = self.pending.take() {
            info!("appliance: running {:?}", seq);
            self.completed += 1;
        }
    }
}
