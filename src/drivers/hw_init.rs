//! One-shot hardware peripheral initialization.
//!
//! Brings up the three things the spa board needs before the first pass:
//! the probe ADC channel, the relay outputs (at their safe boot levels)
//! and the dial inputs with their GPIO interrupts.  Raw ESP-IDF sys calls;
//! called once from `main()`.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::drivers::encoder::{encoder_click_isr, encoder_edge_isr};
#[cfg(target_os = "espidf")]
use crate::pins;

/// Errors during one-shot peripheral initialization.  Each carries the
/// raw `esp_err_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    ProbeAdc(i32),
    Gpio { pin: i32, rc: i32 },
    IsrService(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ProbeAdc(rc) => write!(f, "probe ADC setup failed (rc={})", rc),
            Self::Gpio { pin, rc } => write!(f, "GPIO{} config failed (rc={})", pin, rc),
            Self::IsrService(rc) => write!(f, "dial ISR setup failed (rc={})", rc),
        }
    }
}

/// ADC1 channel wired to the water probe (GPIO 1).
pub const ADC1_CH_PROBE: u32 = 0;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: called once from main() before the control loop starts.
    unsafe {
        init_relay_outputs()?;
        init_probe_adc()?;
        init_dial_inputs()?;
    }
    info!("hw_init: relays, probe and dial ready");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): nothing to configure");
    Ok(())
}

// ── Probe ADC ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut PROBE_ADC: adc_oneshot_unit_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe fn init_probe_adc() -> Result<(), HwInitError> {
    let unit = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: PROBE_ADC is written once here, before any read.
    let rc = unsafe { adc_oneshot_new_unit(&unit, &raw mut PROBE_ADC) };
    if rc != ESP_OK as i32 {
        return Err(HwInitError::ProbeAdc(rc));
    }

    // 12 dB attenuation covers the full 0–3.3 V divider swing.
    let channel = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let rc = unsafe { adc_oneshot_config_channel(PROBE_ADC, ADC1_CH_PROBE, &channel) };
    if rc != ESP_OK as i32 {
        return Err(HwInitError::ProbeAdc(rc));
    }

    info!("hw_init: probe on ADC1 CH{} (12-bit)", ADC1_CH_PROBE);
    Ok(())
}

/// One 12-bit conversion.  A failed read yields 0, which the median stage
/// discards unless it dominates the window.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: PROBE_ADC was set during init; only the main loop reads.
    let rc = unsafe { adc_oneshot_read(PROBE_ADC, channel, &mut raw) };
    if rc != ESP_OK as i32 {
        return 0;
    }
    raw.clamp(0, 4095) as u16
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn configure_pins(
    pins: &[i32],
    mode: gpio_mode_t,
    pull_up: bool,
    intr: gpio_int_type_t,
) -> Result<(), HwInitError> {
    for &pin in pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode,
            pull_up_en: if pull_up {
                gpio_pullup_t_GPIO_PULLUP_ENABLE
            } else {
                gpio_pullup_t_GPIO_PULLUP_DISABLE
            },
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: intr,
        };
        let rc = unsafe { gpio_config(&cfg) };
        if rc != ESP_OK as i32 {
            return Err(HwInitError::Gpio { pin, rc });
        }
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_relay_outputs() -> Result<(), HwInitError> {
    unsafe {
        configure_pins(
            &[pins::HEAT_RELAY_GPIO, pins::PUMP_RELAY_GPIO],
            gpio_mode_t_GPIO_MODE_OUTPUT,
            false,
            gpio_int_type_t_GPIO_INTR_DISABLE,
        )?;
        // Heater must never glitch on at boot; the pump relay starts energised.
        gpio_set_level(pins::HEAT_RELAY_GPIO, 0);
        gpio_set_level(pins::PUMP_RELAY_GPIO, 1);
    }
    info!("hw_init: relays heat=LOW pump=HIGH");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_dial_inputs() -> Result<(), HwInitError> {
    unsafe {
        // A interrupts on both edges; B is only sampled.
        configure_pins(
            &[pins::ENCODER_A_GPIO],
            gpio_mode_t_GPIO_MODE_INPUT,
            true,
            gpio_int_type_t_GPIO_INTR_ANYEDGE,
        )?;
        configure_pins(
            &[pins::ENCODER_B_GPIO],
            gpio_mode_t_GPIO_MODE_INPUT,
            true,
            gpio_int_type_t_GPIO_INTR_DISABLE,
        )?;
        configure_pins(
            &[pins::ENCODER_BUTTON_GPIO],
            gpio_mode_t_GPIO_MODE_INPUT,
            true,
            gpio_int_type_t_GPIO_INTR_NEGEDGE,
        )?;
    }
    info!("hw_init: dial inputs configured");
    Ok(())
}

/// Drive a relay output.  Pin must be one configured in `init_relay_outputs`.
#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: output pin, main loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── Dial interrupts ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn on_encoder_edge(_arg: *mut core::ffi::c_void) {
    // SAFETY: level reads are plain register reads.
    let (a, b) = unsafe {
        (
            gpio_get_level(pins::ENCODER_A_GPIO) != 0,
            gpio_get_level(pins::ENCODER_B_GPIO) != 0,
        )
    };
    encoder_edge_isr(a, b);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn on_encoder_press(_arg: *mut core::ffi::c_void) {
    // SAFETY: esp_timer_get_time is ISR-safe.
    let now_ms = (unsafe { esp_timer_get_time() } / 1_000) as u32;
    encoder_click_isr(now_ms);
}

/// Install the GPIO ISR service and hook the dial handlers.  Call after
/// [`init_peripherals`].
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    let handlers: [(i32, unsafe extern "C" fn(*mut core::ffi::c_void)); 2] = [
        (pins::ENCODER_A_GPIO, on_encoder_edge),
        (pins::ENCODER_BUTTON_GPIO, on_encoder_press),
    ];
    // SAFETY: handlers only touch lock-free atomics.
    unsafe {
        let rc = gpio_install_isr_service(0);
        // Already installed is fine.
        if rc != ESP_OK as i32 && rc != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrService(rc));
        }
        for (pin, handler) in handlers {
            let rc = gpio_isr_handler_add(pin, Some(handler), core::ptr::null_mut());
            if rc != ESP_OK as i32 {
                return Err(HwInitError::IsrService(rc));
            }
        }
    }
    info!("hw_init: dial ISRs installed");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): no ISRs to install");
    Ok(())
}
