//! UART0 boot-message channel.
//!
//! Transmit-only in practice: the receive pin is configured for the UART
//! function but nothing ever reads it. Writes block on FIFO space, so no
//! byte is lost even though the channel itself buffers at most one FIFO's
//! worth; `flush` blocks until the shift register is empty, which is what
//! makes it safe to kill the peripheral clock afterwards.

use core::convert::Infallible;

use embedded_io::Write;
use platform::diag::{DiagnosticSink, UartDivisors};
use platform::lpc17xx::{
    PCLKSEL0, PCONP, PCONP_PCUART0, PINSEL_BASE, UART0_BASE, UART_DLL, UART_DLM, UART_FCR,
    UART_FCR_ENABLE_RESET, UART_FDR, UART_FIFO_DEPTH, UART_LCR, UART_LCR_8N1, UART_LCR_DLAB,
    UART_LSR, UART_LSR_TEMT, UART_LSR_THRE, UART_THR,
};

use super::{read_reg, write_reg};

/// PCLKSEL0 field for UART0: bits 7:6, value 01 = CCLK undivided.
///
/// The divisors in `platform::diag` assume the full core clock; anything
/// else silently quarters the line rate.
const PCLKSEL0_UART0_SHIFT: u32 = 6;

/// The UART0 diagnostic sink.
pub struct Uart0 {
    divisors: UartDivisors,
}

impl Uart0 {
    /// Power the peripheral, route P0.2/P0.3, and program the line rate.
    #[must_use]
    pub fn init(divisors: UartDivisors) -> Self {
        let uart = Self { divisors };
        uart.configure();
        uart
    }

    /// A handle to an already-configured channel.
    ///
    /// # Safety
    ///
    /// The channel must have been initialized by [`Uart0::init`] and not
    /// shut down since. Used by the fault handlers, which interrupt the
    /// owner but never return to it.
    #[must_use]
    pub unsafe fn steal() -> Self {
        Self {
            divisors: platform::diag::DIAG_DIVISORS,
        }
    }

    fn configure(&self) {
        // SAFETY: UART0 register block, owned by this driver while the
        // diagnostics feature is compiled in. Sequence per UM10360 §14.4:
        // power, pin select, peripheral clock, divisors under DLAB, FIFOs.
        unsafe {
            let pconp = read_reg(PCONP);
            write_reg(PCONP, pconp | PCONP_PCUART0);

            // PCLK_UART0 = CCLK.
            let pclksel = read_reg(PCLKSEL0);
            write_reg(
                PCLKSEL0,
                (pclksel & !(0b11 << PCLKSEL0_UART0_SHIFT)) | (0b01 << PCLKSEL0_UART0_SHIFT),
            );

            // P0.2 -> TXD0 (bits 5:4 = 01), P0.3 -> RXD0 (bits 7:6 = 01).
            let pinsel0 = read_reg(PINSEL_BASE);
            write_reg(PINSEL_BASE, (pinsel0 & !0xF0) | 0x50);

            write_reg(UART0_BASE | UART_LCR, UART_LCR_DLAB | UART_LCR_8N1);
            write_reg(UART0_BASE | UART_DLL, u32::from(self.divisors.dll));
            write_reg(UART0_BASE | UART_DLM, u32::from(self.divisors.dlm));
            write_reg(UART0_BASE | UART_FDR, self.divisors.fdr());
            write_reg(UART0_BASE | UART_LCR, UART_LCR_8N1);
            write_reg(UART0_BASE | UART_FCR, UART_FCR_ENABLE_RESET);
        }
    }

    fn line_status(&self) -> u32 {
        // SAFETY: LSR read has no side effects on the TX path.
        unsafe { read_reg(UART0_BASE | UART_LSR) }
    }
}

impl embedded_io::ErrorType for Uart0 {
    type Error = Infallible;
}

impl Write for Uart0 {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        // THRE set means the TX FIFO is empty: a full FIFO's worth fits.
        while self.line_status() & UART_LSR_THRE == 0 {}
        let chunk = buf.iter().take(UART_FIFO_DEPTH);
        let mut sent = 0usize;
        for byte in chunk {
            // SAFETY: FIFO has space for this burst per the THRE wait above.
            unsafe { write_reg(UART0_BASE | UART_THR, u32::from(*byte)) }
            sent = sent.wrapping_add(1);
        }
        Ok(sent)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // TEMT covers both the FIFO and the shift register.
        while self.line_status() & UART_LSR_TEMT == 0 {}
        Ok(())
    }
}

impl DiagnosticSink for Uart0 {
    fn shutdown(&mut self) {
        let _ = self.flush();
        // SAFETY: the channel is drained; powering the block down mid-frame
        // is no longer possible.
        unsafe {
            let pconp = read_reg(PCONP);
            write_reg(PCONP, pconp & !PCONP_PCUART0);
        }
    }

    fn restart(&mut self) {
        self.configure();
    }
}
