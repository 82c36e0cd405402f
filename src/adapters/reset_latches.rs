//! Reset latches backed by the chip's recorded reset reason.
//!
//! ESP32 parts report one reset reason per boot instead of a bank of
//! latch bits.  [`ReasonLatches`] presents that reason through the latch
//! model: the latch matching the reason reads clear, the others idle.
//! Re-arming a latch marks it consumed for the rest of this boot.
//!
//! | Reset reason            | Latch reading clear | Timeout/power-down exposed |
//! |-------------------------|---------------------|----------------------------|
//! | power-on                | `PowerOn`           | yes                        |
//! | brown-out               | `BrownOut`          | yes                        |
//! | task/interrupt watchdog | `Timeout`           | yes                        |
//! | deep-sleep wake         | `PowerDown`         | yes                        |
//! | external pin, software  | none                | yes                        |
//! | unknown                 | none                | no                         |

use crate::app::ports::{Latch, ResetLatches};

/// Platform reset reason, decoupled from the bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    PowerOn,
    BrownOut,
    Watchdog,
    DeepSleep,
    External,
    Software,
    Panic,
    Unknown,
}

impl ResetReason {
    /// Read the reason the ROM recorded for this boot.
    #[cfg(target_os = "espidf")]
    #[allow(non_upper_case_globals)]
    pub fn read() -> Self {
        use esp_idf_svc::sys::*;

        // SAFETY: pure read of a value latched by the ROM at startup.
        match unsafe { esp_reset_reason() } {
            esp_reset_reason_t_ESP_RST_POWERON => Self::PowerOn,
            esp_reset_reason_t_ESP_RST_BROWNOUT => Self::BrownOut,
            esp_reset_reason_t_ESP_RST_INT_WDT
            | esp_reset_reason_t_ESP_RST_TASK_WDT
            | esp_reset_reason_t_ESP_RST_WDT => Self::Watchdog,
            esp_reset_reason_t_ESP_RST_DEEPSLEEP => Self::DeepSleep,
            esp_reset_reason_t_ESP_RST_EXT => Self::External,
            esp_reset_reason_t_ESP_RST_SW => Self::Software,
            esp_reset_reason_t_ESP_RST_PANIC => Self::Panic,
            _ => Self::Unknown,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read() -> Self {
        log::info!("ResetReason(sim): reporting power-on");
        Self::PowerOn
    }

    fn latch(self) -> Option<Latch> {
        match self {
            Self::PowerOn => Some(Latch::PowerOn),
            Self::BrownOut => Some(Latch::BrownOut),
            Self::Watchdog => Some(Latch::Timeout),
            Self::DeepSleep => Some(Latch::PowerDown),
            Self::External | Self::Software | Self::Panic | Self::Unknown => None,
        }
    }
}

pub struct ReasonLatches {
    reason: ResetReason,
    consumed: bool,
}

impl ReasonLatches {
    pub fn new(reason: ResetReason) -> Self {
        Self {
            reason,
            consumed: false,
        }
    }
}

impl ResetLatches for ReasonLatches {
    fn is_clear(&self, latch: Latch) -> Option<bool> {
        let exposed = match latch {
            Latch::PowerOn | Latch::BrownOut => true,
            Latch::Timeout | Latch::PowerDown => self.reason != ResetReason::Unknown,
        };
        exposed.then(|| !self.consumed && self.reason.latch() == Some(latch))
    }

    fn rearm(&mut self, latch: Latch) {
        if self.reason.latch() == Some(latch) {
            self.consumed = true;
        }
    }
}
