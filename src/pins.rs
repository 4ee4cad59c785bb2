//! Output lines on port B.
use core::convert::Infallible;

use avr_device::attiny85::PORTB;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};

/// A single port B line configured as a push-pull output.
///
/// The pin is a zero-sized handle: it writes the port register directly, so
/// it can be moved into the interrupt handler without carrying the `PORTB`
/// peripheral along. Only the watchdog interrupt ever writes port B once the
/// setup is done.
pub struct PortBPin<const BIT: u8>(());

impl<const BIT: u8> PortBPin<BIT> {
    const MASK: u8 = 1 << BIT;

    /// Configure the pin as output with the given initial level.
    ///
    /// The level is latched before the direction is switched, so the line
    /// never glitches to the opposite level.
    pub fn output(portb: &mut PORTB, initial: PinState) -> Self {
        let mut pin = Self(());
        let Ok(()) = pin.set_state(initial);
        // SAFETY: all bit patterns are valid for the direction register
        portb
            .ddrb
            .modify(|r, w| unsafe { w.bits(r.bits() | Self::MASK) });
        pin
    }
}

impl<const BIT: u8> ErrorType for PortBPin<BIT> {
    type Error = Infallible;
}

impl<const BIT: u8> OutputPin for PortBPin<BIT> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        // SAFETY: the register block is always mapped and the read-modify-
        // write only touches this pin's bit
        unsafe {
            (*PORTB::ptr())
                .portb
                .modify(|r, w| w.bits(r.bits() & !Self::MASK));
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        // SAFETY: see `set_low`
        unsafe {
            (*PORTB::ptr())
                .portb
                .modify(|r, w| w.bits(r.bits() | Self::MASK));
        }
        Ok(())
    }
}
