//! Rotary encoder setpoint dial.
//!
//! ## ISR → main loop handoff
//!
//! The A-channel edge ISR decodes direction from the A/B levels and adds
//! ±1 to an edge accumulator; the button ISR latches a click after a
//! debounce window.  Both are single lock-free atomic writes.  The main
//! loop drains them with [`take_input`] once per pass, converting edges to
//! detents, and feeds the result to [`SetpointDial::poll`].
//!
//! ## Dial behaviour
//!
//! | Dial state | Input             | Effect                                   |
//! |-----------|-------------------|------------------------------------------|
//! | Idle      | click             | engage, display on                       |
//! | Engaged   | rotation          | adjust within bounds, restart idle timer |
//! | Engaged   | click             | commit, display stays lit until idle     |
//! | Engaged   | idle timeout      | commit, display off                      |
//! | Lingering | idle timeout      | display off                              |

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

use crate::timer::IntervalTimer;

const CLICK_DEBOUNCE_MS: u32 = 50;

/// A-channel edges (rising plus falling) per detent click.
pub const EDGES_PER_DETENT: i32 = 2;

static ENCODER_EDGES: AtomicI32 = AtomicI32::new(0);
static ENCODER_CLICKED: AtomicBool = AtomicBool::new(false);
static LAST_CLICK_MS: AtomicU32 = AtomicU32::new(0);

/// ISR handler for an A-channel edge.  `a`/`b` are the pin levels sampled
/// inside the ISR.
pub fn encoder_edge_isr(a: bool, b: bool) {
    let delta = if a == b { -1 } else { 1 };
    ENCODER_EDGES.fetch_add(delta, Ordering::Relaxed);
}

/// ISR handler for the push switch falling edge.
pub fn encoder_click_isr(now_ms: u32) {
    let last = LAST_CLICK_MS.load(Ordering::Relaxed);
    if now_ms.wrapping_sub(last) < CLICK_DEBOUNCE_MS {
        return;
    }
    LAST_CLICK_MS.store(now_ms, Ordering::Relaxed);
    ENCODER_CLICKED.store(true, Ordering::Release);
}

/// Raw dial input accumulated since the previous pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DialInput {
    /// Whole detents, signed by direction.
    pub steps: i32,
    pub clicked: bool,
}

/// Drain the ISR staging cells.  Edges short of a full detent stay in
/// the accumulator for the next pass.
pub fn take_input() -> DialInput {
    let edges = ENCODER_EDGES.load(Ordering::Relaxed);
    let steps = edges / EDGES_PER_DETENT;
    if steps != 0 {
        ENCODER_EDGES.fetch_sub(steps * EDGES_PER_DETENT, Ordering::Relaxed);
    }
    DialInput {
        steps,
        clicked: ENCODER_CLICKED.swap(false, Ordering::Acquire),
    }
}

/// What the main loop should do after a dial poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialEvent {
    /// Editing started; wake the display.
    Engaged(i16),
    /// Pending value moved; redraw.
    Adjusted(i16),
    /// Value accepted by a click; display stays lit until idle.
    Committed(i16),
    /// Value accepted by idle timeout; display goes dark.
    TimedOut(i16),
    /// Display idle after a click-commit.
    DisplayIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialState {
    Idle,
    Engaged,
    Lingering,
}

pub struct SetpointDial {
    state: DialState,
    value: i16,
    min: i16,
    max: i16,
    idle_timer: IntervalTimer,
}

impl SetpointDial {
    pub fn new(min: i16, max: i16, idle_timeout_ms: u32) -> Self {
        Self {
            state: DialState::Idle,
            value: min,
            min,
            max,
            idle_timer: IntervalTimer::new(idle_timeout_ms),
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.state == DialState::Engaged
    }

    /// `current_setpoint` seeds the pending value when editing starts, so a
    /// remote change made while idle is not overwritten.
    pub fn poll(&mut self, now_ms: u32, input: DialInput, current_setpoint: i16) -> Option<DialEvent> {
        if input.clicked {
            return Some(self.click(now_ms, current_setpoint));
        }

        match self.state {
            DialState::Idle => None,
            DialState::Engaged => {
                if input.steps != 0 {
                    self.idle_timer.reset(now_ms);
                    let next = (i32::from(self.value) + input.steps)
                        .clamp(i32::from(self.min), i32::from(self.max)) as i16;
                    if next == self.value {
                        return None;
                    }
                    self.value = next;
                    Some(DialEvent::Adjusted(next))
                } else if self.idle_timer.expired(now_ms) {
                    self.state = DialState::Idle;
                    Some(DialEvent::TimedOut(self.value))
                } else {
                    None
                }
            }
            DialState::Lingering => {
                if self.idle_timer.expired(now_ms) {
                    self.state = DialState::Idle;
                    Some(DialEvent::DisplayIdle)
                } else {
                    None
                }
            }
        }
    }

    fn click(&mut self, now_ms: u32, current_setpoint: i16) -> DialEvent {
        if self.state == DialState::Engaged {
            self.state = DialState::Lingering;
            DialEvent::Committed(self.value)
        } else {
            self.idle_timer.reset(now_ms);
            self.value = current_setpoint.clamp(self.min, self.max);
            self.state = DialState::Engaged;
            DialEvent::Engaged(self.value)
        }
    }
}
