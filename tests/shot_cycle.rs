use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};
use intervalometer::{Indicator, Phase, Sequencer, State, Timing, Transition};

const TIMING: Timing = Timing::REFERENCE;

/// An output line whose level can still be observed after it was moved into
/// the sequencer.
#[derive(Clone, Default)]
struct ProbePin(Rc<Cell<Option<bool>>>);

impl ProbePin {
    fn level(&self) -> Option<bool> {
        self.0.get()
    }
}

impl ErrorType for ProbePin {
    type Error = Infallible;
}

impl OutputPin for ProbePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(Some(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(Some(true));
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// A line that fails after a number of successful writes.
struct BrokenPin {
    writes_left: usize,
}

impl ErrorType for BrokenPin {
    type Error = PinFault;
}

impl OutputPin for BrokenPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_high()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.writes_left == 0 {
            return Err(PinFault);
        }
        self.writes_left -= 1;
        Ok(())
    }
}

/// Advance until a transition happens, returning it and the ticks consumed.
fn until_transition(phase: &mut Phase, limit: usize) -> (Transition, usize, usize) {
    let mut gated = 0;
    for raw in 1..=limit {
        if phase.is_gated() {
            gated += 1;
        }
        if let Some(t) = phase.advance(&TIMING).transition {
            return (t, raw, gated);
        }
    }
    panic!("no transition within {limit} ticks from {phase:?}");
}

#[test]
fn full_cycle_from_zero() {
    let mut phase = Phase { state: State::Idle, time: 0, tick: 0 };

    let (t, raw, gated) = until_transition(&mut phase, 1000);
    assert_eq!((t.from, t.to), (State::Idle, State::PressingToStart));
    assert_eq!(gated, 165);
    assert_eq!(raw, 4 * 164 + 1);
    assert_eq!(phase.time, 0);

    let (t, raw, _) = until_transition(&mut phase, 100);
    assert_eq!((t.from, t.to), (State::PressingToStart, State::WaitingForCapture));
    assert_eq!(raw, 3);

    let (t, _, gated) = until_transition(&mut phase, 100);
    assert_eq!((t.from, t.to), (State::WaitingForCapture, State::PressingToStop));
    assert_eq!(gated, 8);
    assert_eq!(t.at, 8);

    let (t, _, gated) = until_transition(&mut phase, 100);
    assert_eq!((t.from, t.to), (State::PressingToStop, State::Idle));
    assert_eq!(gated, 3);
    assert_eq!(t.at, 11);
}

#[test]
fn consecutive_shots_are_one_cycle_apart() {
    let mut phase = Phase::power_on(&TIMING);
    let mut starts = Vec::new();
    for raw in 0..3 * TIMING.cycle_ticks() {
        if let Some(t) = phase.advance(&TIMING).transition {
            if t.to == State::PressingToStart {
                starts.push(raw);
            }
        }
    }
    assert_eq!(starts.len(), 3);
    assert_eq!(starts[0], 4 * (165 - 10 - 1));
    assert_eq!(starts[1] - starts[0], TIMING.cycle_ticks());
    assert_eq!(starts[2] - starts[1], TIMING.cycle_ticks());
}

#[test]
fn new_releases_button_and_clears_indicator() {
    let button = ProbePin::default();
    let led = ProbePin::default();
    let sequencer = Sequencer::new(TIMING, button.clone(), led.clone()).unwrap();

    assert_eq!(button.level(), Some(true));
    assert_eq!(led.level(), Some(false));
    assert_eq!(*sequencer.phase(), Phase::power_on(&TIMING));
    assert_eq!(*sequencer.timing(), TIMING);
}

#[test]
fn pins_follow_the_cycle() {
    let button = ProbePin::default();
    let led = ProbePin::default();
    let mut sequencer = Sequencer::new(TIMING, button.clone(), led.clone()).unwrap();

    let mut pulses = 0;
    let mut transitions = Vec::new();
    // one full cycle from power-on, but short of the second shot
    for _ in 0..TIMING.cycle_ticks() + 100 {
        let transition = sequencer.on_tick().unwrap();
        let pressed = button.level() == Some(false);
        assert_eq!(pressed, sequencer.phase().state.holds_button());

        if led.level() == Some(true) {
            pulses += 1;
            assert_eq!(transition.map(|t| t.to), Some(State::Idle));
        }
        transitions.extend(transition.map(|t| t.to));
    }

    assert_eq!(
        transitions,
        [
            State::PressingToStart,
            State::WaitingForCapture,
            State::PressingToStop,
            State::Idle
        ]
    );
    assert_eq!(pulses, 1);
    assert_eq!(led.level(), Some(false));
}

#[test]
fn indicator_pulse_lasts_one_tick() {
    let mut phase = Phase { state: State::PressingToStop, time: 10, tick: 8 };
    assert_eq!(phase.advance(&TIMING).indicator, Indicator::Pulse);
    for _ in 0..3 {
        assert_eq!(phase.advance(&TIMING).indicator, Indicator::Clear);
    }
    assert_eq!(phase.advance(&TIMING).indicator, Indicator::Unchanged);
}

#[test]
fn pin_errors_are_propagated() {
    let err = Sequencer::new(
        TIMING,
        BrokenPin { writes_left: 0 },
        BrokenPin { writes_left: 10 },
    )
    .err();
    assert_eq!(err, Some(PinFault));

    let mut sequencer = Sequencer::new(
        TIMING,
        BrokenPin { writes_left: 1 },
        BrokenPin { writes_left: 10 },
    )
    .unwrap();
    assert_eq!(sequencer.on_tick(), Err(PinFault));
}
