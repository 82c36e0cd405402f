//! Periodic interrupt sources built on ESP-IDF's esp_timer API.
//!
//! Two periodic timers stand in for the primary (timekeeping) and
//! secondary (sensor sampling) timer compare interrupts.  Each callback
//! latches its flag in the shared [`AtomicFlagRegister`] and then runs the
//! service hook, which invokes the interrupt bridge.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! the hook may take the critical section and touch the UART driver.

use crate::adapters::irq_flags::AtomicFlagRegister;
use crate::bridge::IrqFlags;
use crate::config::SystemConfig;
use crate::error::Result;

#[cfg(target_os = "espidf")]
use crate::error::Error;
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// What one timer does when it fires.
pub struct TimerBinding {
    flags: &'static AtomicFlagRegister,
    raise: IrqFlags,
    service: fn(),
}

impl TimerBinding {
    pub const fn new(flags: &'static AtomicFlagRegister, raise: IrqFlags, service: fn()) -> Self {
        Self { flags, raise, service }
    }

    /// Latch the flag, then let the bridge run.
    pub fn fire(&self) {
        self.flags.raise(self.raise);
        (self.service)();
    }
}

/// Timer period for a rate, never below 50 µs (esp_timer's floor).
pub fn period_us(hz: u32) -> u64 {
    (1_000_000 / u64::from(hz.max(1))).max(50)
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the leaked `&'static TimerBinding` registered in
    // `start_timer`.
    let binding = unsafe { &*arg.cast::<TimerBinding>() };
    binding.fire();
}

#[cfg(target_os = "espidf")]
fn start_timer(name: &'static core::ffi::CStr, binding: TimerBinding, hz: u32) -> Result<()> {
    let binding: &'static TimerBinding = Box::leak(Box::new(binding));
    let args = esp_timer_create_args_t {
        callback: Some(tick_cb),
        arg: core::ptr::from_ref(binding).cast_mut().cast(),
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: name.as_ptr(),
        skip_unhandled_events: true,
    };
    let mut handle: esp_timer_handle_t = core::ptr::null_mut();

    // SAFETY: `args` and `handle` outlive the calls; the binding is 'static.
    unsafe {
        let ret = esp_timer_create(&args, &mut handle);
        if ret != ESP_OK {
            log::error!("hw_timer: {:?} create failed (rc={})", name, ret);
            return Err(Error::Init("esp_timer create"));
        }
        let ret = esp_timer_start_periodic(handle, period_us(hz));
        if ret != ESP_OK {
            log::error!("hw_timer: {:?} start failed (rc={})", name, ret);
            return Err(Error::Init("esp_timer start"));
        }
    }
    Ok(())
}

/// Start both periodic sources.  Call after the bridge is installed.
#[cfg(target_os = "espidf")]
pub fn start_timers(config: &SystemConfig, flags: &'static AtomicFlagRegister, service: fn()) -> Result<()> {
    start_timer(c"tick", TimerBinding::new(flags, IrqFlags::TIMER, service), config.timer_tick_hz)?;
    start_timer(c"sample", TimerBinding::new(flags, IrqFlags::SAMPLE_TIMER, service), config.sample_tick_hz)?;
    log::info!(
        "hw_timer: tick@{}Hz + sample@{}Hz started",
        config.timer_tick_hz, config.sample_tick_hz
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers(config: &SystemConfig, _flags: &'static AtomicFlagRegister, _service: fn()) -> Result<()> {
    log::info!(
        "hw_timer(sim): tick@{}Hz + sample@{}Hz not started (drive TimerBinding::fire)",
        config.timer_tick_hz, config.sample_tick_hz
    );
    Ok(())
}

// ── Sensor edge (GPIO any-edge interrupt) ─────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn edge_isr(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `&'static AtomicFlagRegister` registered below.
    // Runs in ISR context: latch only, the next timer tick services it.
    let flags = unsafe { &*arg.cast::<AtomicFlagRegister>() };
    flags.raise(IrqFlags::PORT_CHANGE);
}

/// Latch `PORT_CHANGE` on any edge of the monitored pins.
#[cfg(target_os = "espidf")]
pub fn arm_port_change(pins: &[i32], flags: &'static AtomicFlagRegister) -> Result<()> {
    // SAFETY: called once from main before the run loop; the handler arg
    // is 'static.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE as esp_err_t {
            log::error!("hw_timer: GPIO ISR service install failed (rc={})", ret);
            return Err(Error::Init("gpio isr service"));
        }
        for &pin in pins {
            let ret = gpio_set_intr_type(pin, gpio_int_type_t_GPIO_INTR_ANYEDGE);
            if ret != ESP_OK {
                return Err(Error::Init("gpio interrupt type"));
            }
            let ret = gpio_isr_handler_add(pin, Some(edge_isr), core::ptr::from_ref(flags).cast_mut().cast());
            if ret != ESP_OK {
                return Err(Error::Init("gpio isr handler"));
            }
        }
    }
    log::info!("hw_timer: port-change armed on {:?}", pins);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn arm_port_change(pins: &[i32], _flags: &'static AtomicFlagRegister) -> Result<()> {
    log::info!("hw_timer(sim): port-change on {:?} not armed", pins);
    Ok(())
}
