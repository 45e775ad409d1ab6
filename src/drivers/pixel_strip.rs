//! SK6812 RGBW strip output.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: each frame is encoded as RMT pulses (GRBW byte order, MSB
//! first) and clocked out on one RMT channel.  A 60-pixel frame takes
//! roughly 2.4 ms on the wire.
//! On host/test: the last frame is kept in memory for inspection.

use crate::drivers::led_moods::Rgbw;

#[cfg(not(target_os = "espidf"))]
use crate::config::PIXEL_COUNT;

#[cfg(target_os = "espidf")]
use esp_idf_hal::{
    gpio::OutputPin,
    peripheral::Peripheral,
    rmt::{
        config::TransmitConfig, PinState, Pulse, PulseTicks, RmtChannel, TxRmtDriver,
        VariableLengthSignal,
    },
    sys::EspError,
};

/// 80 MHz APB / 2 = 25 ns per tick.
#[cfg(target_os = "espidf")]
const RMT_CLOCK_DIVIDER: u8 = 2;
#[cfg(target_os = "espidf")]
const T0H_TICKS: u16 = 12; // 0.3 µs
#[cfg(target_os = "espidf")]
const T0L_TICKS: u16 = 36; // 0.9 µs
#[cfg(target_os = "espidf")]
const T1H_TICKS: u16 = 24; // 0.6 µs
#[cfg(target_os = "espidf")]
const T1L_TICKS: u16 = 24; // 0.6 µs

#[cfg(target_os = "espidf")]
pub struct PixelStrip {
    tx: TxRmtDriver<'static>,
    zero: [Pulse; 2],
    one: [Pulse; 2],
}

#[cfg(target_os = "espidf")]
impl PixelStrip {
    pub fn new<C, P>(
        channel: impl Peripheral<P = C> + 'static,
        pin: impl Peripheral<P = P> + 'static,
    ) -> Result<Self, EspError>
    where
        C: RmtChannel,
        P: OutputPin,
    {
        let config = TransmitConfig::new()
            .clock_divider(RMT_CLOCK_DIVIDER)
            .idle(Some(PinState::Low));
        let tx = TxRmtDriver::new(channel, pin, &config)?;

        let zero = [
            Pulse::new(PinState::High, PulseTicks::new(T0H_TICKS)?),
            Pulse::new(PinState::Low, PulseTicks::new(T0L_TICKS)?),
        ];
        let one = [
            Pulse::new(PinState::High, PulseTicks::new(T1H_TICKS)?),
            Pulse::new(PinState::Low, PulseTicks::new(T1L_TICKS)?),
        ];
        log::info!("PixelStrip: RMT transmitter ready");
        Ok(Self { tx, zero, one })
    }

    pub fn write(&mut self, pixels: &[Rgbw]) -> Result<(), EspError> {
        let mut signal = VariableLengthSignal::with_capacity(pixels.len() * 32 * 2);
        for px in pixels {
            for byte in [px.g, px.r, px.b, px.w] {
                for bit in (0..8).rev() {
                    let pulses = if byte & (1 << bit) == 0 { &self.zero } else { &self.one };
                    signal.push(pulses.iter())?;
                }
            }
        }
        self.tx.start_blocking(&signal)
    }
}

#[cfg(not(target_os = "espidf"))]
pub struct PixelStrip {
    last_frame: heapless::Vec<Rgbw, PIXEL_COUNT>,
    frames: u32,
}

#[cfg(not(target_os = "espidf"))]
impl Default for PixelStrip {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl PixelStrip {
    pub fn new() -> Self {
        log::info!("PixelStrip(sim): in-memory frame buffer");
        Self {
            last_frame: heapless::Vec::new(),
            frames: 0,
        }
    }

    /// Keeps the first `PIXEL_COUNT` pixels of the frame.
    pub fn write(&mut self, pixels: &[Rgbw]) -> Result<(), core::convert::Infallible> {
        self.last_frame.clear();
        for px in pixels.iter().take(PIXEL_COUNT) {
            // Cannot fail: at most PIXEL_COUNT pushes.
            let _ = self.last_frame.push(*px);
        }
        self.frames = self.frames.wrapping_add(1);
        Ok(())
    }

    pub fn last_frame(&self) -> &[Rgbw] {
        &self.last_frame
    }

    pub fn frames_written(&self) -> u32 {
        self.frames
    }
}
