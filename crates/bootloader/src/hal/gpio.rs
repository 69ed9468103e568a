//! Fast GPIO (FIO) output pins.
//!
//! Write-only driver: FIOSET/FIOCLR take a mask and touch no other pin in
//! the port, so no read-modify-write is needed after configuration.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use platform::config::PinId;
use platform::lpc17xx::{FIO_BASE, FIO_CLR, FIO_DIR, FIO_PORT_STRIDE, FIO_SET, PINSEL_BASE};

use super::{read_reg, write_reg};

/// One FIO pin configured as a push-pull digital output.
pub struct FioPin {
    port_base: u32,
    mask: u32,
}

impl FioPin {
    /// Select the GPIO function for `id` and configure it as an output.
    ///
    /// The output level is left as-is; callers drive it explicitly.
    #[allow(clippy::arithmetic_side_effects)] // port <= 4 and pin <= 31 by the PinId contract
    #[must_use]
    pub fn output(id: PinId) -> Self {
        let port = u32::from(id.port);
        let pin = u32::from(id.pin);

        // PINSEL function 00 = GPIO: two bits per pin, two registers per port.
        let pinsel = PINSEL_BASE + 4 * (port * 2 + pin / 16);
        let shift = (pin % 16) * 2;
        // SAFETY: pinsel addresses a valid PINSEL register for this pin;
        // only this pin's two function bits change.
        unsafe {
            let v = read_reg(pinsel);
            write_reg(pinsel, v & !(0b11 << shift));
        }

        let port_base = FIO_BASE + FIO_PORT_STRIDE * port;
        let mask = 1 << pin;
        // SAFETY: FIODIR is read-modify-write; only this pin's bit is set.
        unsafe {
            let dir = read_reg(port_base + FIO_DIR);
            write_reg(port_base + FIO_DIR, dir | mask);
        }

        Self { port_base, mask }
    }
}

impl ErrorType for FioPin {
    type Error = Infallible;
}

impl OutputPin for FioPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        // SAFETY: FIOSET writes affect only the masked pin.
        unsafe { write_reg(self.port_base.wrapping_add(FIO_SET), self.mask) }
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        // SAFETY: FIOCLR writes affect only the masked pin.
        unsafe { write_reg(self.port_base.wrapping_add(FIO_CLR), self.mask) }
        Ok(())
    }
}
