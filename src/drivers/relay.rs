//! Relay contactor driver.
//!
//! Wraps any `embedded_hal` [`OutputPin`] and only touches the pin when
//! the requested level differs from the last one driven, so repeated
//! commands never chatter the contactor.
//!
//! [`GpioPin`] is the board implementation: on ESP-IDF it drives a raw
//! GPIO configured by `hw_init`; on host it only tracks the level.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::drivers::hw_init;

pub struct Relay<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Relay<P> {
    /// Take ownership of `pin` and drive it to `initial`.
    pub fn new(mut pin: P, initial: bool) -> Result<Self, P::Error> {
        if initial {
            pin.set_high()?;
        } else {
            pin.set_low()?;
        }
        Ok(Self { pin, on: initial })
    }

    pub fn set(&mut self, on: bool) -> Result<(), P::Error> {
        if on == self.on {
            return Ok(());
        }
        if on {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

/// Raw GPIO output through `hw_init`.
pub struct GpioPin {
    gpio: i32,
    high: bool,
}

impl GpioPin {
    pub fn new(gpio: i32) -> Self {
        Self { gpio, high: false }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    pub fn is_high(&self) -> bool {
        self.high
    }
}

impl ErrorType for GpioPin {
    type Error = Infallible;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, false);
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, true);
        self.high = true;
        Ok(())
    }
}
