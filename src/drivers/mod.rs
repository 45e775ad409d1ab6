//! Board drivers: relays, dial, LED strip, peripheral init and watchdog.

pub mod encoder;
pub mod hw_init;
pub mod led_moods;
pub mod pixel_strip;
pub mod relay;
pub mod watchdog;
