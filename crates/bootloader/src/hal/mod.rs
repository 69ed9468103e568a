//! Memory-mapped hardware layer.
//!
//! Only compiled for the LPC1768 target (`--features hardware`). Host tests
//! never compile or link this module; they run the boot flow against the
//! simulated register file in `platform::mocks` instead.
//!
//! Register addresses and bit values all come from `platform::lpc17xx` so
//! the hardware layer and the simulation cannot drift apart.

mod gpio;
#[cfg(feature = "diagnostics")]
mod uart;
mod wdt;

pub use gpio::FioPin;
#[cfg(feature = "diagnostics")]
pub use uart::Uart0;
pub use wdt::Lpc17xxWatchdog;

use platform::lpc17xx::{FLASHCFG, PLL0CON, PLL0FEED, PLL0STAT};
use platform::lpc17xx::{CCLKCFG, CLKSRCSEL, SCB_VTOR, SCS};
use platform::sysctl::SystemControl;

#[inline]
pub(crate) unsafe fn write_reg(addr: u32, value: u32) {
    // SAFETY: caller names a valid memory-mapped register address.
    unsafe { (addr as *mut u32).write_volatile(value) }
}

#[inline]
pub(crate) unsafe fn read_reg(addr: u32) -> u32 {
    // SAFETY: caller names a valid memory-mapped register address.
    unsafe { (addr as *const u32).read_volatile() }
}

/// The one live [`SystemControl`] capability.
///
/// Owns the clock, flash-timing, and vector-table registers for the rest of
/// the boot. Zero-sized: the registers themselves are the state.
pub struct Lpc17xxSystem {
    _private: (),
}

impl Lpc17xxSystem {
    /// Construct the capability.
    ///
    /// # Safety
    ///
    /// At most one instance may exist, and nothing else may write the
    /// PLL0/clock/FLASHCFG/VTOR registers while it lives. `main` constructs
    /// it once, before interrupts are of any concern.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl SystemControl for Lpc17xxSystem {
    fn pll0_write_control(&mut self, value: u32) {
        // SAFETY: PLL0CON is owned by this capability.
        unsafe { write_reg(PLL0CON, value) }
    }

    fn pll0_feed_write(&mut self, value: u32) {
        // SAFETY: PLL0FEED is write-only and owned by this capability.
        unsafe { write_reg(PLL0FEED, value) }
    }

    fn pll0_status(&self) -> u32 {
        // SAFETY: PLL0STAT is a read-only status register.
        unsafe { read_reg(PLL0STAT) }
    }

    fn flash_config(&self) -> u32 {
        // SAFETY: FLASHCFG read has no side effects.
        unsafe { read_reg(FLASHCFG) }
    }

    fn write_flash_config(&mut self, value: u32) {
        // SAFETY: FLASHCFG is owned by this capability; the caller has
        // preserved the reserved bits.
        unsafe { write_reg(FLASHCFG, value) }
    }

    fn write_cpu_clock_divider(&mut self, value: u32) {
        // SAFETY: CCLKCFG is owned by this capability.
        unsafe { write_reg(CCLKCFG, value) }
    }

    fn write_clock_source(&mut self, value: u32) {
        // SAFETY: CLKSRCSEL is owned by this capability.
        unsafe { write_reg(CLKSRCSEL, value) }
    }

    fn write_system_controls(&mut self, value: u32) {
        // SAFETY: SCS is owned by this capability; the main oscillator is
        // no longer feeding anything when this is written.
        unsafe { write_reg(SCS, value) }
    }

    fn write_vector_table_base(&mut self, base: u32) {
        // SAFETY: base is 128-byte aligned per the engine's masking; the
        // table at that address belongs to the image being jumped to.
        unsafe { write_reg(SCB_VTOR, base) }
    }

    fn memory_barriers(&mut self) {
        cortex_m::asm::dmb();
        cortex_m::asm::dsb();
        cortex_m::asm::isb();
    }

    fn settle_delay(&mut self, iterations: u32) {
        cortex_m::asm::delay(iterations);
    }

    fn read_image_word(&mut self, address: u32) -> u32 {
        // SAFETY: address lies in the user image's flash region; volatile
        // so the word is fetched from flash even if read twice.
        unsafe { (address as *const u32).read_volatile() }
    }

    fn jump(&mut self, stack_pointer: u32, entry: u32) {
        // SAFETY: single load of MSP then a branch into the image's reset
        // handler (Thumb bit in `entry`). Nothing may execute in between.
        // If the branch anomalously falls back here the caller escalates
        // to a system reset — the stack is the image's by then, which the
        // reset makes irrelevant.
        unsafe {
            core::arch::asm!(
                "msr msp, {sp}",
                "bx {entry}",
                sp = in(reg) stack_pointer,
                entry = in(reg) entry,
                clobber_abi("C"),
            );
        }
    }

    fn system_reset(&mut self) {
        cortex_m::peripheral::SCB::sys_reset()
    }
}
