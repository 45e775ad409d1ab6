//! Mock adapters for integration tests.
//!
//! Records every relay write, strip frame and display call so tests can
//! assert on the full command history without touching real GPIO/RMT.

use std::collections::VecDeque;

use spa_controller::app::events::{AppEvent, SetpointLimits, SpaState};
use spa_controller::app::ports::{
    ActuatorPort, DialPort, DisplayPort, EventSink, PixelSink, SensorPort, SetpointStore,
    StatePublisher, StorageError,
};
use spa_controller::drivers::encoder::DialInput;
use spa_controller::drivers::led_moods::Rgbw;

// ── Call records ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCall {
    Heat(bool),
    Pump(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayCall {
    Wake,
    Sleep,
    Render { temperature_f: f32, setpoint_f: i16 },
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Value returned by every probe read.
    pub raw_sample: u16,
    pub samples_read: u32,
    pub relays: Vec<RelayCall>,
    pub frames: Vec<Vec<Rgbw>>,
    pub display: Vec<DisplayCall>,
    pub dial: VecDeque<DialInput>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(raw_sample: u16) -> Self {
        Self {
            raw_sample,
            samples_read: 0,
            relays: Vec::new(),
            frames: Vec::new(),
            display: Vec::new(),
            dial: VecDeque::new(),
        }
    }

    pub fn heat_writes(&self) -> Vec<bool> {
        self.relays
            .iter()
            .filter_map(|c| match c {
                RelayCall::Heat(on) => Some(*on),
                RelayCall::Pump(_) => None,
            })
            .collect()
    }

    pub fn pump_writes(&self) -> Vec<bool> {
        self.relays
            .iter()
            .filter_map(|c| match c {
                RelayCall::Pump(on) => Some(*on),
                RelayCall::Heat(_) => None,
            })
            .collect()
    }

    pub fn last_frame(&self) -> Option<&[Rgbw]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn turn(&mut self, steps: i32) {
        self.dial.push_back(DialInput {
            steps,
            clicked: false,
        });
    }

    pub fn click(&mut self) {
        self.dial.push_back(DialInput {
            steps: 0,
            clicked: true,
        });
    }
}

impl SensorPort for MockHardware {
    fn read_raw_sample(&mut self) -> u16 {
        self.samples_read += 1;
        self.raw_sample
    }
}

impl ActuatorPort for MockHardware {
    fn write_heat(&mut self, on: bool) {
        self.relays.push(RelayCall::Heat(on));
    }

    fn write_pump(&mut self, on: bool) {
        self.relays.push(RelayCall::Pump(on));
    }
}

impl PixelSink for MockHardware {
    fn show(&mut self, pixels: &[Rgbw]) {
        self.frames.push(pixels.to_vec());
    }
}

impl DialPort for MockHardware {
    fn take_dial_input(&mut self) -> DialInput {
        self.dial.pop_front().unwrap_or_default()
    }
}

impl DisplayPort for MockHardware {
    fn wake(&mut self) {
        self.display.push(DisplayCall::Wake);
    }

    fn sleep(&mut self) {
        self.display.push(DisplayCall::Sleep);
    }

    fn render(&mut self, temperature_f: f32, setpoint_f: i16) {
        self.display.push(DisplayCall::Render {
            temperature_f,
            setpoint_f,
        });
    }
}

// ── MockStore ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    pub stored: Option<i16>,
    pub writes: Vec<i16>,
    /// When set, every read and write fails with this error.
    pub fail_with: Option<StorageError>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn with_setpoint(value: i16) -> Self {
        Self {
            stored: Some(value),
            ..Self::default()
        }
    }

    pub fn failing(err: StorageError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::default()
        }
    }
}

impl SetpointStore for MockStore {
    fn read_setpoint(&self) -> Result<Option<i16>, StorageError> {
        match self.fail_with {
            Some(e) => Err(e),
            None => Ok(self.stored),
        }
    }

    fn write_setpoint(&mut self, value: i16) -> Result<(), StorageError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.stored = Some(value);
        self.writes.push(value);
        Ok(())
    }
}

// ── MockPublisher ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Push {
    State(SpaState),
    Defaults(SetpointLimits),
}

#[derive(Default)]
pub struct MockPublisher {
    pub observers: usize,
    pub pushes: Vec<Push>,
}

#[allow(dead_code)]
impl MockPublisher {
    pub fn with_observers(observers: usize) -> Self {
        Self {
            observers,
            pushes: Vec::new(),
        }
    }

    pub fn states(&self) -> Vec<SpaState> {
        self.pushes
            .iter()
            .filter_map(|p| match p {
                Push::State(s) => Some(*s),
                Push::Defaults(_) => None,
            })
            .collect()
    }
}

impl StatePublisher for MockPublisher {
    fn observer_count(&self) -> usize {
        self.observers
    }

    fn push_state(&mut self, state: &SpaState) {
        self.pushes.push(Push::State(*state));
    }

    fn push_defaults(&mut self, limits: &SetpointLimits) {
        self.pushes.push(Push::Defaults(*limits));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
