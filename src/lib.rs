//! Portable core of the camera intervalometer.
//!
//! Everything that decides *when* the camera button is pressed lives here and
//! is free of any hardware access, so it builds for the ATtiny85 as well as for
//! the host, where it is tested and simulated.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod driver;
pub mod sequencer;

pub use config::{Timing, TimingError};
pub use driver::Sequencer;
pub use sequencer::{Indicator, Outputs, Phase, State, Transition};
