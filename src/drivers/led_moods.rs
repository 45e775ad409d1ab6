//! LED mood engine for the addressable RGBW strip.
//!
//! The main loop calls [`MoodEngine::tick`] every pass; the engine gates
//! itself on an internal pixel timer whose cadence depends on the mood
//! category, and pushes full frames through a [`PixelSink`].
//!
//! | Mood         | Per tick                                   | Cadence |
//! |--------------|--------------------------------------------|---------|
//! | Solid colour | colour-wipe one pixel                      | 500 ms  |
//! | ColorCycle   | colour-wipe, next palette colour per scene | 500 ms  |
//! | Rainbow      | recompute every pixel from [`wheel`]       | 100 ms  |
//! | Party        | sparkle every third pixel, then clear      | 50 ms   |
//! | Off          | nothing (cleared on entry)                 | -       |

use crate::app::ports::PixelSink;
use crate::error::Error;
use crate::timer::IntervalTimer;

/// One strip pixel, with a dedicated white channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgbw {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl Rgbw {
    pub const OFF: Self = Self::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, w: 0 }
    }
}

pub const RED: Rgbw = Rgbw::rgb(255, 0, 0);
pub const GREEN: Rgbw = Rgbw::rgb(0, 255, 0);
pub const BLUE: Rgbw = Rgbw::rgb(0, 0, 255);
pub const YELLOW: Rgbw = Rgbw::rgb(255, 255, 0);
pub const CYAN: Rgbw = Rgbw::rgb(0, 255, 255);
pub const PURPLE: Rgbw = Rgbw::rgb(255, 0, 255);
pub const PINK: Rgbw = Rgbw::rgb(255, 0, 195);
pub const ORANGE: Rgbw = Rgbw::rgb(255, 51, 0);
pub const WHITE: Rgbw = Rgbw {
    r: 0,
    g: 0,
    b: 0,
    w: 255,
};

/// Colour-cycle order.
pub const PALETTE: [Rgbw; 9] = [RED, GREEN, BLUE, YELLOW, CYAN, PURPLE, PINK, ORANGE, WHITE];

const SOLID_CADENCE_MS: u32 = 500;
const RAINBOW_CADENCE_MS: u32 = 100;
const PARTY_CADENCE_MS: u32 = 50;
const SCENE_PERIOD_MS: u32 = 5 * 60_000;

/// Selectable lighting mood.  Discriminants are the stable wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Mood {
    Off = 0,
    Red = 1,
    Green = 2,
    Blue = 3,
    Yellow = 4,
    Cyan = 5,
    Purple = 6,
    Pink = 7,
    Orange = 8,
    White = 9,
    ColorCycle = 10,
    Rainbow = 11,
    Party = 12,
}

impl Mood {
    pub const ALL: [Mood; 13] = [
        Mood::Off,
        Mood::Red,
        Mood::Green,
        Mood::Blue,
        Mood::Yellow,
        Mood::Cyan,
        Mood::Purple,
        Mood::Pink,
        Mood::Orange,
        Mood::White,
        Mood::ColorCycle,
        Mood::Rainbow,
        Mood::Party,
    ];

    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Human-readable name for UI lists.
    pub const fn label(self) -> &'static str {
        match self {
            Mood::Off => "Light OFF",
            Mood::Red => "Red",
            Mood::Green => "Green",
            Mood::Blue => "Blue",
            Mood::Yellow => "Yellow",
            Mood::Cyan => "Cyan",
            Mood::Purple => "Purple",
            Mood::Pink => "Pink",
            Mood::Orange => "Orange",
            Mood::White => "White",
            Mood::ColorCycle => "Color Cycle",
            Mood::Rainbow => "Rainbow",
            Mood::Party => "Party",
        }
    }

    /// Fixed colour for the solid moods.
    pub const fn solid_colour(self) -> Option<Rgbw> {
        match self {
            Mood::Red => Some(RED),
            Mood::Green => Some(GREEN),
            Mood::Blue => Some(BLUE),
            Mood::Yellow => Some(YELLOW),
            Mood::Cyan => Some(CYAN),
            Mood::Purple => Some(PURPLE),
            Mood::Pink => Some(PINK),
            Mood::Orange => Some(ORANGE),
            Mood::White => Some(WHITE),
            Mood::Off | Mood::ColorCycle | Mood::Rainbow | Mood::Party => None,
        }
    }

    const fn cadence_ms(self) -> u32 {
        match self {
            Mood::Rainbow => RAINBOW_CADENCE_MS,
            Mood::Party => PARTY_CADENCE_MS,
            _ => SOLID_CADENCE_MS,
        }
    }
}

impl TryFrom<u16> for Mood {
    type Error = Error;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Mood::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(Error::UnknownMood(code))
    }
}

/// Colour wheel: red → green → blue → red over 0..=255 in three 85-wide
/// linear segments.
pub const fn wheel(pos: u8) -> Rgbw {
    let p = 255 - pos;
    if p < 85 {
        Rgbw::rgb(255 - p * 3, 0, p * 3)
    } else if p < 170 {
        let p = p - 85;
        Rgbw::rgb(0, p * 3, 255 - p * 3)
    } else {
        let p = p - 170;
        Rgbw::rgb(p * 3, 255 - p * 3, 0)
    }
}

/// Animation state for an `N`-pixel strip.
pub struct MoodEngine<const N: usize> {
    pixels: [Rgbw; N],
    mood: Mood,
    current_pixel: usize,
    scene: u16,
    party_offset: usize,
    pixel_timer: IntervalTimer,
    scene_timer: IntervalTimer,
}

impl<const N: usize> Default for MoodEngine<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MoodEngine<N> {
    pub const fn new() -> Self {
        Self {
            pixels: [Rgbw::OFF; N],
            mood: Mood::Off,
            current_pixel: 0,
            scene: 0,
            party_offset: 0,
            pixel_timer: IntervalTimer::new(SOLID_CADENCE_MS),
            scene_timer: IntervalTimer::new(SCENE_PERIOD_MS),
        }
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn pixels(&self) -> &[Rgbw; N] {
        &self.pixels
    }

    /// Switch mood and render the first frame immediately.
    pub fn set_mood(&mut self, mood: Mood, now_ms: u32, strip: &mut impl PixelSink) {
        self.mood = mood;
        self.current_pixel = 0;
        self.scene = 0;
        self.party_offset = 0;
        if mood == Mood::Off {
            self.pixels = [Rgbw::OFF; N];
            strip.show(&self.pixels);
        }
        self.pixel_timer.modify(mood.cadence_ms());
        self.pixel_timer.force_expire();
        self.scene_timer.reset(now_ms);
        self.tick(now_ms, strip);
    }

    /// Advance the animation if the pixel timer has expired.
    pub fn tick(&mut self, now_ms: u32, strip: &mut impl PixelSink) {
        if !self.pixel_timer.expired(now_ms) {
            return;
        }
        self.pixel_timer.reset(now_ms);

        match self.mood {
            Mood::Off => {}
            Mood::ColorCycle => {
                self.colour_wipe(PALETTE[usize::from(self.scene)], strip);
                if self.scene_timer.expired(now_ms) {
                    self.current_pixel = 0;
                    self.scene_timer.reset(now_ms);
                    self.scene = (self.scene + 1) % PALETTE.len() as u16;
                }
            }
            Mood::Rainbow => self.rainbow(strip),
            Mood::Party => self.party(strip),
            solid => {
                if let Some(colour) = solid.solid_colour() {
                    self.colour_wipe(colour, strip);
                }
            }
        }
    }

    fn colour_wipe(&mut self, colour: Rgbw, strip: &mut impl PixelSink) {
        if N == 0 {
            return;
        }
        self.pixels[self.current_pixel] = colour;
        strip.show(&self.pixels);
        self.current_pixel += 1;
        if self.current_pixel >= N {
            self.current_pixel = 0;
        }
    }

    fn rainbow(&mut self, strip: &mut impl PixelSink) {
        for (i, px) in self.pixels.iter_mut().enumerate() {
            *px = wheel(((i * 256 / N) as u16 + self.scene) as u8);
        }
        strip.show(&self.pixels);
        self.scene = (self.scene + 1) % 256;
    }

    fn party(&mut self, strip: &mut impl PixelSink) {
        for i in (0..N).step_by(3) {
            if let Some(px) = self.pixels.get_mut(i + self.party_offset) {
                *px = wheel(((i + usize::from(self.scene)) % 255) as u8);
            }
        }
        strip.show(&self.pixels);
        for i in (0..N).step_by(3) {
            if let Some(px) = self.pixels.get_mut(i + self.party_offset) {
                *px = Rgbw::OFF;
            }
        }
        self.party_offset = (self.party_offset + 1) % 3;
        self.scene = (self.scene + 1) % 256;
    }
}
