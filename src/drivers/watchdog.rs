//! Task watchdog for the control loop.
//!
//! Subscribes the main task to the ESP-IDF TWDT.  The control loop feeds
//! it once per pass; a stalled pass (wedged ADC read, blocked strip
//! transmit) panics and reboots the board with the heater relay
//! de-energised by `hw_init`.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    #[cfg(not(target_os = "espidf"))]
    feeds: u32,
}

impl Watchdog {
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        // SAFETY: TWDT API called once from the main task before the loop.
        let subscribed = unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                warn!("Watchdog: reconfigure returned {} (may already be configured)", ret);
            }
            esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK
        };

        if subscribed {
            info!("Watchdog: main task subscribed ({} ms, panic on trigger)", timeout_ms);
        } else {
            warn!("Watchdog: failed to subscribe main task");
        }
        Self {
            timeout_ms,
            subscribed,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        if timeout_ms == 0 {
            warn!("Watchdog(sim): zero timeout");
        }
        info!("Watchdog(sim): {} ms, feeds counted only", timeout_ms);
        Self {
            timeout_ms,
            feeds: 0,
        }
    }

    /// Call once per control-loop pass.
    pub fn feed(&mut self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the TWDT entry of the calling (subscribed) task.
            unsafe {
                esp_task_wdt_reset();
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.feeds = self.feeds.wrapping_add(1);
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn feeds(&self) -> u32 {
        self.feeds
    }
}
