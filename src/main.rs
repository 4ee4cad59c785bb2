//! Camera intervalometer on the camera's own power button
//!
//! This little project wakes an action camera in "one button mode" at a fixed
//! interval, lets it take a single photo and switches it off again. It does so
//! without any data connection to the camera: the only interface is the power
//! button, which is shorted to ground by a transistor. The camera distinguishes
//! "power on and shoot" from "power off" purely by how long the button is held,
//! so the whole control strategy is open-loop timing.
//!
//! # Cycle
//! 1. press the button for three ticks (~100ms): the camera wakes up and takes
//!    a photo
//! 2. wait until 8s after the start press: the photo is snapped and stored
//! 3. press the button until 11s after the start press: the camera powers off
//! 4. flash the LED once and wait for the next shot (165s after the last one)
//!
//! All timing is derived from the watchdog interrupt (~32ms), which is the only
//! thing running while the device sleeps. The watchdog runs from the internal
//! oscillator, which is not accurate: see [`intervalometer::config`] for the
//! calibration constants.
//!
//! # MCU used
//! This project is implemented using an AVR ATtiny85.
//! ```ascii-drawing
//!                           ┌───╥───┐
//!                   RESET ━┥ 1   8 ┝━ VCC
//!                     PB3 ━┥ 2   7 ┝━ PB2
//!                     PB4 ━┥ 3   6 ┝━ PB1 (indicator LED, active high)
//!                     GND ━┥ 4   5 ┝━ PB0 (camera button, active low)
//!                           └───────┘
//! ```
//! `PB0` drives the transistor across the camera's power button (low means
//! pressed), `PB1` drives the indicator LED. The remaining pins are unused.
//!
//! # Host build
//! Built for anything but AVR, this binary is a simulator: it runs the very
//! same sequencer from power-on with synthetic ticks and logs every transition
//! with its simulated time. The first argument selects the number of full
//! cycles to run (default 2).
#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod pins;
#[cfg(target_arch = "avr")]
mod power;
#[cfg(not(target_arch = "avr"))]
mod simulator;

#[cfg(target_arch = "avr")]
mod firmware {
    use core::cell::Cell;

    use avr_device::interrupt::{self, Mutex};
    use embedded_hal::digital::PinState;
    use intervalometer::{Sequencer, Timing};

    use crate::{pins::PortBPin, power};

    /// The timing table flashed into the device.
    const TIMING: Timing = Timing::REFERENCE;
    const _: () = assert!(TIMING.validate().is_ok(), "inconsistent timing table");

    type CameraButton = PortBPin<0>;
    type IndicatorLed = PortBPin<1>;

    /// The sequencer, owned by the watchdog interrupt once set up.
    static SEQUENCER: Mutex<Cell<Option<Sequencer<CameraButton, IndicatorLed>>>> =
        Mutex::new(Cell::new(None));

    #[avr_device::entry]
    fn main() -> ! {
        // SAFETY: this is the first and only time, the peripherals are taken.
        // Normally, this would be done via the safe `take()`-function, but this
        // introduces a "possible panic" into the code with additional code being
        // generated. Therefore, this `unsafe`-function is used.
        let mut peripherals = unsafe { avr_device::attiny85::Peripherals::steal() };

        power::divide_system_clock_by::<256>(&mut peripherals.CPU); // 8MHz/256≈31kHz
        power::disable_unused_peripherals(&mut peripherals.CPU, &mut peripherals.AC);

        let portb = &mut peripherals.PORTB;
        let button = CameraButton::output(portb, PinState::High);
        let led = IndicatorLed::output(portb, PinState::Low);
        let Ok(sequencer) = Sequencer::new(TIMING, button, led);
        interrupt::free(|cs| SEQUENCER.borrow(cs).set(Some(sequencer)));

        let cpu = &mut peripherals.CPU;
        cpu.mcucr.write(|w| w.sm().pdown());
        power::start_ticking::<4>(cpu, &mut peripherals.WDT);
        loop {
            power::sleep(cpu);
        }
    }

    #[avr_device::interrupt(attiny85)]
    fn WDT() {
        interrupt::free(|cs| {
            let slot = SEQUENCER.borrow(cs);
            if let Some(mut sequencer) = slot.take() {
                let Ok(_) = sequencer.on_tick();
                slot.set(Some(sequencer));
            }
        });
    }

    /// The panic handler of the application.
    ///
    /// This project aims to avoid panics altogether, but the [`core`]-crate
    /// requires the function to be provided by a `![no_std]`-binary. Therefore
    /// this function contains a body, that will not link if any panic is still
    /// reachable after optimization:
    /// ```console
    /// src/main.rs:63:(.text.rust_begin_unwind+0x0): undefined reference to `a_panic_is_reachable'
    /// ```
    /// This shows even the line number of the offending call.
    #[panic_handler]
    fn panic(_: &core::panic::PanicInfo) -> ! {
        extern "C" {
            fn a_panic_is_reachable() -> !;
        }
        // SAFETY: if this would be reachable, the code would not compile
        unsafe { a_panic_is_reachable() };
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() -> anyhow::Result<()> {
    let cycles = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid cycle count `{arg}`: {e}"))?,
        None => 2,
    };
    simulator::run(intervalometer::Timing::REFERENCE, cycles)
}
