//! Compile-time timing of the shot cycle.
//!
//! Every threshold is counted in ticks of the watchdog oscillator, either raw
//! (one interrupt) or gated (every [`TICKS_PER_SECOND`]th interrupt, roughly
//! one second). The watchdog runs from the uncalibrated internal 128kHz
//! oscillator, so the values in [`Timing::REFERENCE`] only hold for the
//! reference board: a different oscillator needs the numbers re-derived, the
//! state machine stays the same.

/// Number of raw ticks forming one gated "second".
pub const TICKS_PER_SECOND: u8 = 4;

/// Nominal period of one raw tick (watchdog at 4K cycles).
///
/// Only used for reporting, the state machine never converts ticks to time.
pub const TICK_PERIOD_MS: u32 = 32;

/// The full set of thresholds driving the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Nominal seconds between two shots.
    pub shot_interval: u16,
    /// Correction added to [`Self::shot_interval`] for oscillator drift.
    pub calibration_offset: u16,
    /// Value of the elapsed-seconds counter at power-on.
    ///
    /// Starting above zero lets the supply capacitor charge before the first
    /// press, since the first shot fires once the counter reaches
    /// [`Self::shot_threshold()`].
    pub startup_grace: u16,
    /// Raw ticks the button is held to wake the camera and take a photo.
    pub min_press_ticks: u8,
    /// Seconds after the start press at which the stop press begins.
    pub capture_timeout: u16,
    /// Seconds after the start press at which the stop press ends.
    pub shutdown_timeout: u16,
}

/// Reason a [`Timing`] table cannot drive a sane cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingError {
    /// A start press of zero ticks would never reach the camera.
    EmptyPress,
    /// The start press outlasts the capture wait.
    PressOutlastsCapture,
    /// The stop press would end before it begins.
    ShutdownBeforeCapture,
    /// The next shot would fire right after the camera was switched off.
    CycleShorterThanShutdown,
}

impl Timing {
    /// Thresholds tuned against the reference camera and oscillator.
    pub const REFERENCE: Self = Self {
        shot_interval: 158,
        calibration_offset: 7,
        startup_grace: 10,
        min_press_ticks: 3,
        capture_timeout: 8,
        shutdown_timeout: 11,
    };

    /// Elapsed seconds at which an idle sequencer presses for the next shot.
    pub const fn shot_threshold(&self) -> u16 {
        self.shot_interval.saturating_add(self.calibration_offset)
    }

    /// Gated ticks between two consecutive start presses.
    ///
    /// The elapsed counter is only cleared when a shot starts, so the whole
    /// cycle (capture, shutdown and idle) spans exactly one shot threshold.
    pub const fn cycle_seconds(&self) -> u16 {
        self.shot_threshold()
    }

    /// Raw ticks between two consecutive start presses.
    pub const fn cycle_ticks(&self) -> u32 {
        self.cycle_seconds() as u32 * TICKS_PER_SECOND as u32
    }

    /// Check the ordering constraints between the thresholds.
    ///
    /// This is a `const fn` so the firmware can reject a bad table at build
    /// time.
    pub const fn validate(&self) -> Result<(), TimingError> {
        if self.min_press_ticks == 0 {
            return Err(TimingError::EmptyPress);
        }
        if self.min_press_ticks as u32 >= self.capture_timeout as u32 * TICKS_PER_SECOND as u32 {
            return Err(TimingError::PressOutlastsCapture);
        }
        if self.capture_timeout >= self.shutdown_timeout {
            return Err(TimingError::ShutdownBeforeCapture);
        }
        if self.shutdown_timeout >= self.shot_threshold() {
            return Err(TimingError::CycleShorterThanShutdown);
        }
        Ok(())
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::REFERENCE
    }
}

const _: () = assert!(Timing::REFERENCE.validate().is_ok());
