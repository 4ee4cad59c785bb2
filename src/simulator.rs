//! Host-side simulation of the firmware with synthetic watchdog ticks.
use core::convert::Infallible;

use anyhow::{anyhow, bail};
use embedded_hal::digital::{ErrorType, OutputPin};
use intervalometer::config::TICK_PERIOD_MS;
use intervalometer::{Sequencer, State, Timing};
use log::{info, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// An output line that only remembers its level.
#[derive(Default)]
struct SimPin {
    high: bool,
    rising_edges: u32,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.high {
            self.rising_edges += 1;
        }
        self.high = true;
        Ok(())
    }
}

/// Run the sequencer from power-on until `cycles` shots have completed.
pub fn run(timing: Timing, cycles: u32) -> anyhow::Result<()> {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(LevelFilter::Debug))
        .map_err(|e| anyhow!("{e}"))?;
    if let Err(e) = timing.validate() {
        bail!("unusable timing table: {e:?}");
    }

    let Ok(mut sequencer) = Sequencer::new(timing, SimPin::default(), SimPin::default());
    // every cycle fits into one cycle length, plus the startup grace
    let budget = u64::from(timing.cycle_ticks()) * (u64::from(cycles) + 1);

    let mut completed = 0;
    let mut ticks = 0u64;
    while completed < cycles {
        if ticks >= budget {
            bail!("no cycle completed within {budget} ticks");
        }
        let Ok(transition) = sequencer.on_tick();
        ticks += 1;
        if let Some(t) = transition {
            let ms = ticks * u64::from(TICK_PERIOD_MS);
            info!(
                "{:>4}.{:03}s  {:?} -> {:?}",
                ms / 1000,
                ms % 1000,
                t.from,
                t.to
            );
            if t.to == State::Idle {
                completed += 1;
            }
        }
    }

    let (button, led) = sequencer.release();
    info!(
        "{completed} cycles in {ticks} ticks, {} LED flashes, button {}",
        led.rising_edges,
        if button.high { "released" } else { "pressed" }
    );
    Ok(())
}
