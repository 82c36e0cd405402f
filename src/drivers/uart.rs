//! Console UART on top of the ESP-IDF UART driver.
//!
//! The IDF driver owns the real UART interrupt and buffers bytes in its
//! own ring.  This adapter exposes that as the register-level [`Uart`]
//! port: "receive ready" means the driver holds buffered bytes, and
//! "transmit ready" is a software enable the transport toggles.  Both
//! are sampled by [`ConsoleUart::levels`] before each bridge invocation.
//!
//! On non-espidf targets the UART is simulated: nothing is received and
//! transmitted bytes are counted.

use crate::app::ports::Uart;
use crate::bridge::IrqFlags;
use crate::error::TransportError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Driver-side ring sizes.
#[cfg(target_os = "espidf")]
const DRIVER_BUF: i32 = 256;

pub struct ConsoleUart {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    port: i32,
    installed: bool,
    tx_enabled: bool,
    #[cfg(not(target_os = "espidf"))]
    sent: u32,
}

impl ConsoleUart {
    pub fn new(port: i32) -> Self {
        Self {
            port,
            installed: false,
            tx_enabled: false,
            #[cfg(not(target_os = "espidf"))]
            sent: 0,
        }
    }

    /// Level-style conditions for the interrupt bridge.
    pub fn levels(&self) -> IrqFlags {
        let mut flags = IrqFlags::empty();
        if !self.installed {
            return flags;
        }
        flags.set(IrqFlags::RX_READY, self.buffered() > 0);
        flags.set(IrqFlags::TX_READY, self.tx_enabled);
        flags
    }

    #[cfg(target_os = "espidf")]
    fn buffered(&self) -> usize {
        let mut len: usize = 0;
        // SAFETY: driver installed (checked by caller); `len` outlives the call.
        let ret = unsafe { uart_get_buffered_data_len(self.port, &mut len) };
        if ret == ESP_OK { len } else { 0 }
    }

    #[cfg(not(target_os = "espidf"))]
    fn buffered(&self) -> usize {
        0
    }

    /// Bytes the simulated UART has accepted.
    #[cfg(not(target_os = "espidf"))]
    pub fn sent(&self) -> u32 {
        self.sent
    }
}

impl Uart for ConsoleUart {
    #[cfg(target_os = "espidf")]
    fn configure(&mut self, bitrate: u32) -> Result<(), TransportError> {
        let cfg = uart_config_t {
            baud_rate: i32::try_from(bitrate).map_err(|_| TransportError::UnsupportedBitrate(bitrate))?,
            data_bits: uart_word_length_t_UART_DATA_8_BITS,
            parity: uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
            flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            ..Default::default()
        };
        // SAFETY: single caller during boot; `cfg` outlives the call.
        unsafe {
            let ret = uart_param_config(self.port, &cfg);
            if ret != ESP_OK {
                return Err(TransportError::Driver(ret));
            }
            if !self.installed {
                let ret = uart_driver_install(self.port, DRIVER_BUF, DRIVER_BUF, 0, core::ptr::null_mut(), 0);
                if ret != ESP_OK {
                    return Err(TransportError::Driver(ret));
                }
                self.installed = true;
            }
        }
        log::info!("uart{}: {} 8N1", self.port, bitrate);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn configure(&mut self, bitrate: u32) -> Result<(), TransportError> {
        if bitrate == 0 {
            return Err(TransportError::UnsupportedBitrate(bitrate));
        }
        log::info!("uart(sim): {} 8N1", bitrate);
        self.installed = true;
        Ok(())
    }

    fn release(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            if self.installed {
                // SAFETY: driver was installed by `configure`.
                let ret = unsafe { uart_driver_delete(self.port) };
                if ret != ESP_OK {
                    log::warn!("uart{}: driver delete failed (rc={})", self.port, ret);
                }
            }
        }
        self.installed = false;
        self.tx_enabled = false;
    }

    #[cfg(target_os = "espidf")]
    fn read_data(&mut self) -> Option<u8> {
        if !self.installed {
            return None;
        }
        let mut byte = 0u8;
        // SAFETY: one-byte buffer, zero timeout: never blocks.
        let n = unsafe { uart_read_bytes(self.port, (&raw mut byte).cast(), 1, 0) };
        (n == 1).then_some(byte)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_data(&mut self) -> Option<u8> {
        None
    }

    #[cfg(target_os = "espidf")]
    fn write_data(&mut self, byte: u8) {
        if self.installed {
            // SAFETY: one-byte buffer; the driver copies it into its TX ring.
            unsafe {
                uart_write_bytes(self.port, (&raw const byte).cast(), 1);
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_data(&mut self, _byte: u8) {
        if self.installed {
            self.sent = self.sent.wrapping_add(1);
        }
    }

    fn set_tx_interrupt(&mut self, enabled: bool) {
        self.tx_enabled = enabled;
    }
}
