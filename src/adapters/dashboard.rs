//! Browser dashboard bridge.
//!
//! [`DashboardPublisher`] implements [`StatePublisher`] by rendering JSON
//! text frames and handing them to a transport closure (the WebSocket
//! broadcast in production, a `Vec` in tests).  [`parse_request`] turns
//! inbound dashboard messages into [`AppCommand`]s.
//!
//! ## Frames
//!
//! ```text
//! → {"type":"data","temp":101.3,"setTemp":102,"pump":"ON","heat":"OFF","light":11}
//! → {"type":"defaults","min":80,"max":104,"setTemp":102,"colors":["Light OFF","Red",...]}
//! ← {"setTemp":103}   {"light":11}   {"refresh":1}
//! ```

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::commands::AppCommand;
use crate::app::events::{SetpointLimits, SpaState};
use crate::app::ports::StatePublisher;
use crate::drivers::led_moods::Mood;
use crate::error::Error;

#[derive(Serialize)]
struct DataFrame {
    #[serde(rename = "type")]
    kind: &'static str,
    temp: f32,
    #[serde(rename = "setTemp")]
    set_temp: i16,
    pump: &'static str,
    heat: &'static str,
    /// Current mood code; selects the entry in the page's light list.
    light: u16,
}

#[derive(Serialize)]
struct DefaultsFrame {
    #[serde(rename = "type")]
    kind: &'static str,
    min: i16,
    max: i16,
    #[serde(rename = "setTemp")]
    set_temp: i16,
    /// Mood labels indexed by code.
    colors: [&'static str; 13],
}

#[derive(Deserialize)]
struct Request {
    #[serde(rename = "setTemp", alias = "set_temp")]
    set_temp: Option<i16>,
    light: Option<u16>,
    refresh: Option<u8>,
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

/// One decimal place, as shown on the dashboard.
fn round_tenth(t: f32) -> f32 {
    (t * 10.0).round() / 10.0
}

pub fn encode_state(state: &SpaState) -> Result<String, Error> {
    serde_json::to_string(&DataFrame {
        kind: "data",
        temp: round_tenth(state.temperature_f),
        set_temp: state.setpoint_f,
        pump: on_off(state.pump_on),
        heat: on_off(state.heat_on),
        light: state.mood.code(),
    })
    .map_err(|_| Error::Protocol("state frame encode failed"))
}

pub fn encode_defaults(limits: &SetpointLimits) -> Result<String, Error> {
    serde_json::to_string(&DefaultsFrame {
        kind: "defaults",
        min: limits.min,
        max: limits.max,
        set_temp: limits.setpoint_f,
        colors: Mood::ALL.map(Mood::label),
    })
    .map_err(|_| Error::Protocol("defaults frame encode failed"))
}

/// Decode one inbound text frame.  A frame may carry several requests;
/// they are returned in setpoint, mood, refresh order.
pub fn parse_request(text: &str) -> Result<heapless::Vec<AppCommand, 3>, Error> {
    let req: Request =
        serde_json::from_str(text).map_err(|_| Error::Protocol("malformed dashboard request"))?;

    let mut cmds = heapless::Vec::new();
    // Capacity 3 matches the three optional fields; pushes cannot fail.
    // A zero setpoint means "not set".
    if let Some(t) = req.set_temp.filter(|&t| t != 0) {
        let _ = cmds.push(AppCommand::SetSetpoint(t));
    }
    if let Some(code) = req.light {
        let _ = cmds.push(AppCommand::SetMood(code));
    }
    if req.refresh.is_some_and(|r| r != 0) {
        let _ = cmds.push(AppCommand::Refresh);
    }
    Ok(cmds)
}

/// [`StatePublisher`] over a text-frame transport.
pub struct DashboardPublisher<F: FnMut(&str)> {
    send: F,
    observers: usize,
}

impl<F: FnMut(&str)> DashboardPublisher<F> {
    pub fn new(send: F) -> Self {
        Self { send, observers: 0 }
    }

    /// Updated by the transport on connect / disconnect.
    pub fn set_observer_count(&mut self, count: usize) {
        self.observers = count;
    }

    fn send_frame(&mut self, frame: Result<String, Error>) {
        match frame {
            Ok(text) => {
                debug!("Dashboard: sending {}", text);
                (self.send)(&text);
            }
            Err(e) => warn!("Dashboard: {}", e),
        }
    }
}

impl<F: FnMut(&str)> StatePublisher for DashboardPublisher<F> {
    fn observer_count(&self) -> usize {
        self.observers
    }

    fn push_state(&mut self, state: &SpaState) {
        self.send_frame(encode_state(state));
    }

    fn push_defaults(&mut self, limits: &SetpointLimits) {
        self.send_frame(encode_defaults(limits));
    }
}
