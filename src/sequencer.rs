//! The shot cycle as a pure, tick-driven state machine.
//!
//! [`Phase`] holds everything the watchdog interrupt mutates. One call of
//! [`Phase::advance()`] corresponds to one interrupt; it updates the phase and
//! reports what the two output lines should look like afterwards. Nothing in
//! here touches hardware, which is left to [`crate::driver::Sequencer`].
//!
//! ```ascii-drawing
//!            shot threshold                min press ticks
//!   ┌──────┐ ──────────────> ┌─────────────────┐ ────────> ┌───────────────────┐
//!   │ Idle │                 │ PressingToStart │           │ WaitingForCapture │
//!   └──────┘ <────────────── └─────────────────┘           └───────────────────┘
//!      ^     shutdown timeout ┌────────────────┐  capture timeout  │
//!      └──────────────────────│ PressingToStop │ <─────────────────┘
//!                             └────────────────┘
//! ```
use crate::config::{Timing, TICKS_PER_SECOND};

/// The four steps of one shot cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for the next shot with the camera switched off.
    ///
    /// Transitions to [`State::PressingToStart`] once the elapsed seconds
    /// reach [`Timing::shot_threshold()`].
    Idle,
    /// The button is held to wake the camera, which then takes a photo.
    ///
    /// Released after [`Timing::min_press_ticks`] raw ticks.
    PressingToStart,
    /// The camera snaps and stores the photo on its own.
    ///
    /// Transitions to [`State::PressingToStop`] once the elapsed seconds
    /// reach [`Timing::capture_timeout`].
    WaitingForCapture,
    /// The button is held long enough for the camera to switch off.
    ///
    /// Transitions to [`State::Idle`] once the elapsed seconds reach
    /// [`Timing::shutdown_timeout`].
    PressingToStop,
}

impl State {
    /// The only state this one may transition to.
    pub const fn next(self) -> Self {
        match self {
            Self::Idle => Self::PressingToStart,
            Self::PressingToStart => Self::WaitingForCapture,
            Self::WaitingForCapture => Self::PressingToStop,
            Self::PressingToStop => Self::Idle,
        }
    }

    /// Whether the button line is pressed for the whole time spent here.
    pub const fn holds_button(self) -> bool {
        matches!(self, Self::PressingToStart | Self::PressingToStop)
    }
}

/// A state change taken during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: State,
    pub to: State,
    /// Elapsed-seconds counter at the moment of the change.
    pub at: u16,
}

/// What to do with the indicator line after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Switch on: a cycle has just been completed.
    Pulse,
    /// Switch off (done on every ungated tick).
    Clear,
    /// Leave the line as it is.
    Unchanged,
}

/// The result of one [`Phase::advance()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outputs {
    pub button_pressed: bool,
    pub indicator: Indicator,
    /// The state change of this tick. A valid [`Timing`] never allows more
    /// than one per tick.
    pub transition: Option<Transition>,
}

/// The mutable state of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub state: State,
    /// Elapsed gated ticks ("seconds"), cleared when a shot starts.
    pub time: u16,
    /// Raw ticks, cleared when a shot starts and wrapping otherwise.
    pub tick: u8,
}

impl Phase {
    /// The conditions right after reset: idle, released, with the startup
    /// grace period already on the clock.
    pub const fn power_on(timing: &Timing) -> Self {
        Self {
            state: State::Idle,
            time: timing.startup_grace,
            tick: 0,
        }
    }

    /// Whether the current tick runs the once-per-second checks.
    pub const fn is_gated(&self) -> bool {
        self.tick % TICKS_PER_SECOND == 0
    }

    /// Process one watchdog tick.
    pub fn advance(&mut self, timing: &Timing) -> Outputs {
        let mut transition = None;

        // the start press is timed in raw ticks, so it runs on every tick
        if self.state == State::PressingToStart && self.tick >= timing.min_press_ticks {
            transition = Some(self.enter(State::WaitingForCapture));
        }

        let indicator = if self.is_gated() {
            self.time = self.time.saturating_add(1);
            match self.gated_transition(timing) {
                Some(t) => {
                    transition = Some(t);
                    if t.to == State::Idle {
                        Indicator::Pulse
                    } else {
                        Indicator::Unchanged
                    }
                }
                None => Indicator::Unchanged,
            }
        } else {
            Indicator::Clear
        };

        self.tick = self.tick.wrapping_add(1);

        Outputs {
            button_pressed: self.state.holds_button(),
            indicator,
            transition,
        }
    }

    fn gated_transition(&mut self, timing: &Timing) -> Option<Transition> {
        let due = match self.state {
            State::Idle => self.time >= timing.shot_threshold(),
            State::WaitingForCapture => self.time >= timing.capture_timeout,
            State::PressingToStop => self.time >= timing.shutdown_timeout,
            State::PressingToStart => false,
        };
        if !due {
            return None;
        }

        let transition = self.enter(self.state.next());
        if transition.to == State::PressingToStart {
            self.time = 0;
            self.tick = 0;
        }
        Some(transition)
    }

    fn enter(&mut self, to: State) -> Transition {
        let from = self.state;
        self.state = to;
        Transition {
            from,
            to,
            at: self.time,
        }
    }
}
