//! Boot sequence: console bring-up, reset classification, announcement.
//!
//! Runs once, in order, before any interrupt source is armed:
//!
//! ```text
//!  buttons ──▶ init_console_transport ──▶ classify_reset ──▶ announce ──▶ BootState
//!  (early read)  (serial or wireless)      (re-arms latches)   (console + log)
//! ```
//!
//! The resulting [`BootState`] is immutable for the rest of the run.

use core::fmt;

use log::info;

use crate::app::ports::{ResetLatches, Uart, WirelessLink};
use crate::config::{ConsoleRoute, SystemConfig};
use crate::drivers::serial::SerialTransport;
use crate::error::{Error, Result};
use crate::reset::{BootFlags, ResetCause, ResetReport, classify_reset};

/// What this boot found out about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootState {
    pub cause: ResetCause,
    pub flags: BootFlags,
}

/// Bring up whichever transport carries the console.
///
/// With the wireless route the UART is opened at the module's bitrate, the
/// module is brought up over it, and the UART then stays open as the
/// console carrier.  The serial-route bitrate is never applied.
pub fn init_console_transport<U: Uart>(
    config: &SystemConfig,
    serial: &mut SerialTransport<U>,
    wireless: Option<&mut dyn WirelessLink>,
) -> Result<()> {
    match config.console {
        ConsoleRoute::Serial { bitrate } => {
            serial.open(bitrate)?;
            info!("Console: serial @ {} bit/s", bitrate);
        }
        ConsoleRoute::Wireless { bitrate } => {
            let link = wireless.ok_or(Error::Init("wireless route without a link"))?;
            serial.open(bitrate)?;
            if let Err(e) = link.init(serial.uart_mut()) {
                serial.close();
                return Err(e.into());
            }
            info!("Console: wireless link @ {} bit/s", bitrate);
        }
    }
    Ok(())
}

/// Write the boot announcement.  Each line is mirrored to the log.
pub fn announce<W: fmt::Write>(out: &mut W, banner: &str, report: &ResetReport, flags: BootFlags) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", banner)?;
    info!("{}", banner);

    writeln!(out, "{}", report.cause)?;
    info!("Reset cause: {}", report.cause);

    if flags.contains(BootFlags::START_BUTTON_HELD) {
        writeln!(out, "Start button held")?;
        info!("Start button held");
    }
    if flags.contains(BootFlags::SETUP_BUTTON_HELD) {
        writeln!(out, "Setup button held")?;
        info!("Setup button held");
    }
    Ok(())
}

/// Classify the reset, merge in the buttons sampled during early init and
/// announce the result.
pub fn boot<W: fmt::Write>(
    config: &SystemConfig,
    latches: &mut impl ResetLatches,
    buttons: BootFlags,
    out: &mut W,
) -> BootState {
    let report = classify_reset(latches);
    let flags = report.boot_flags(buttons);

    // Announcement is best effort: a full transmit ring must not stop boot.
    if announce(out, &config.banner, &report, flags).is_err() {
        log::warn!("Boot: announcement truncated");
    }

    BootState {
        cause: report.cause,
        flags,
    }
}

/// The whole boot sequence.  The buttons are read first, before the
/// console UART is touched, so no peripheral reconfiguration can disturb
/// them.
pub fn start<U: Uart>(
    config: &SystemConfig,
    sample_buttons: impl FnOnce() -> BootFlags,
    serial: &mut SerialTransport<U>,
    wireless: Option<&mut dyn WirelessLink>,
    latches: &mut impl ResetLatches,
) -> Result<BootState> {
    let buttons = sample_buttons();
    init_console_transport(config, serial, wireless)?;
    Ok(boot(config, latches, buttons, serial))
}
