//! Binding of the [`Phase`] state machine to the two output lines.
use embedded_hal::digital::{OutputPin, PinState};
use log::{debug, info};

use crate::config::Timing;
use crate::sequencer::{Indicator, Phase, Transition};

/// The sequencer driving the camera button and the indicator LED.
///
/// The button line is active-low: driving it low shorts the camera's power
/// button, high leaves it released. The indicator is active-high.
pub struct Sequencer<B, L> {
    phase: Phase,
    timing: Timing,
    button: B,
    indicator: L,
}

impl<B, L, E> Sequencer<B, L>
where
    B: OutputPin<Error = E>,
    L: OutputPin<Error = E>,
{
    /// Take over both lines, releasing the button and switching the indicator
    /// off.
    pub fn new(timing: Timing, mut button: B, mut indicator: L) -> Result<Self, E> {
        button.set_high()?;
        indicator.set_low()?;

        let phase = Phase::power_on(&timing);
        info!(
            "sequencer up: first shot in {}s, then every {}s",
            timing.shot_threshold().saturating_sub(phase.time),
            timing.cycle_seconds()
        );
        Ok(Self {
            phase,
            timing,
            button,
            indicator,
        })
    }

    /// Handle one watchdog tick.
    ///
    /// The button line is re-driven on every tick from the current state, so
    /// it is pressed exactly while a pressing state is active.
    pub fn on_tick(&mut self) -> Result<Option<Transition>, E> {
        let outputs = self.phase.advance(&self.timing);

        self.button
            .set_state(PinState::from(!outputs.button_pressed))?;
        match outputs.indicator {
            Indicator::Pulse => self.indicator.set_high()?,
            Indicator::Clear => self.indicator.set_low()?,
            Indicator::Unchanged => {}
        }

        if let Some(t) = outputs.transition {
            debug!("{:?} -> {:?} at {}s", t.from, t.to, t.at);
        }
        Ok(outputs.transition)
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Give back the output lines.
    pub fn release(self) -> (B, L) {
        (self.button, self.indicator)
    }
}
