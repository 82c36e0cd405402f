//! Cooperative run loop.
//!
//! Every iteration calls each subsystem's work function exactly once, in a
//! fixed order, then refreshes the liveness timer.  Nothing preempts a work
//! function: one that stalls starves the rest, and if it stalls past the
//! watchdog period the hardware restarts the device.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ loop {                                                        │
//! │   sensor ─▶ water ─▶ appliance ─▶ user interface ─▶ console   │
//! │                                                     (cmdline) │
//! │   liveness.refresh()                     (not interactive-dbg)│
//! │ }                                                             │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use log::warn;

use crate::app::ports::Liveness;
use crate::config::SystemConfig;
use crate::timekeeping::{Deadline, TickSource};

// ═══════════════════════════════════════════════════════════════
//  Work functions
// ═══════════════════════════════════════════════════════════════

/// The foreground subsystems, one entry point each.
///
/// Implementations must return promptly; there is no time-slicing.
pub trait WorkLoop {
    fn sensor_work(&mut self);
    fn water_work(&mut self);
    fn appliance_work(&mut self);
    fn user_interface_work(&mut self);
    fn console_work(&mut self);
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// Loop behaviour fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Poll the command console.
    pub console: bool,
    /// Refresh the liveness timer after each iteration.
    pub refresh_liveness: bool,
    /// Iterations longer than this many ticks are reported.
    pub budget_ticks: u32,
}

impl From<&SystemConfig> for SchedulerConfig {
    fn from(config: &SystemConfig) -> Self {
        Self {
            console: config.command_line,
            refresh_liveness: !config.interactive_debug,
            budget_ticks: config.loop_budget_ticks(),
        }
    }
}

/// Loop timing bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub iterations: u64,
    /// Longest single iteration seen, in ticks.
    pub longest_ticks: u32,
    /// Iterations that exceeded the budget.
    pub over_budget: u32,
}

pub struct Scheduler<L, T> {
    liveness: L,
    clock: T,
    config: SchedulerConfig,
    stats: LoopStats,
}

impl<L: Liveness, T: TickSource> Scheduler<L, T> {
    pub fn new(liveness: L, clock: T, config: SchedulerConfig) -> Self {
        Self {
            liveness,
            clock,
            config,
            stats: LoopStats::default(),
        }
    }

    /// One pass over every subsystem, then the liveness refresh.
    pub fn run_once(&mut self, work: &mut impl WorkLoop) {
        // Expires one tick past the budget: only a longer pass is an overrun.
        let budget = Deadline::after(&self.clock, self.config.budget_ticks.saturating_add(1));

        work.sensor_work();
        work.water_work();
        work.appliance_work();
        work.user_interface_work();
        if self.config.console {
            work.console_work();
        }

        if self.config.refresh_liveness {
            self.liveness.refresh();
        }

        self.account(budget.elapsed(&self.clock), budget.expired(&self.clock));
    }

    /// Bounded run for host tests and simulation.
    pub fn run_for(&mut self, iterations: u64, work: &mut impl WorkLoop) {
        for _ in 0..iterations {
            self.run_once(work);
        }
    }

    /// The firmware's run loop.  Only a hardware restart ends it.
    pub fn run(&mut self, work: &mut impl WorkLoop) -> ! {
        loop {
            self.run_once(work);
        }
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    fn account(&mut self, ticks: u32, overrun: bool) {
        self.stats.iterations += 1;
        self.stats.longest_ticks = self.stats.longest_ticks.max(ticks);
        if overrun {
            self.stats.over_budget = self.stats.over_budget.saturating_add(1);
            if self.stats.over_budget == 1 {
                warn!(
                    "Scheduler: iteration {} took {} ticks (budget {})",
                    self.stats.iterations, ticks, self.config.budget_ticks
                );
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
