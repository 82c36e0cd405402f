//! Task Watchdog Timer (TWDT) driver.
//!
//! Wraps the ESP-IDF TWDT API as the scheduler's liveness timer: the run
//! loop refreshes it once per iteration, and a loop that stalls longer
//! than the configured timeout restarts the device.
//!
//! With `interactive-debug` the scheduler never calls `refresh()`, so the
//! timer is not subscribed at all.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

use crate::app::ports::Liveness;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    #[cfg(not(target_os = "espidf"))]
    refreshes: u32,
}

impl Watchdog {
    /// Configure the TWDT for `timeout_ms` and subscribe the current task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed ({}ms timeout, panic on trigger)", timeout_ms);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self { subscribed }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): {}ms timeout, refreshes counted only", timeout_ms);
            Self { refreshes: 0 }
        }
    }

    /// Refreshes seen by the simulated timer.
    #[cfg(not(target_os = "espidf"))]
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }
}

impl Liveness for Watchdog {
    fn refresh(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.refreshes = self.refreshes.wrapping_add(1);
        }
    }
}
