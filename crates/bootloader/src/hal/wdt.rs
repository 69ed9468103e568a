//! Hardware watchdog timer driver.

use platform::lpc17xx::{FEED_COMMIT, FEED_UNLOCK, WDT_BASE, WDT_CLKSEL, WDT_FEED, WDT_MOD, WDT_TC};
use platform::watchdog::{WatchdogConfig, WatchdogTimer};

use super::write_reg;

/// The LPC17xx windowed watchdog in its plain-timeout configuration.
pub struct Lpc17xxWatchdog {
    _private: (),
}

impl Lpc17xxWatchdog {
    /// The watchdog capability. Plain construction: the registers are
    /// harmless until the guard is armed.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for Lpc17xxWatchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchdogTimer for Lpc17xxWatchdog {
    fn feed(&mut self) {
        // An interrupt between the two feed words aborts the sequence, and
        // once WDEN is set an aborted sequence resets the chip (UM10360
        // §28.6.3). The pair must therefore be atomic.
        critical_section::with(|_| {
            // SAFETY: WDFEED is write-only; the pair is the documented
            // unlock/commit protocol.
            unsafe {
                write_reg(WDT_BASE.wrapping_add(WDT_FEED), FEED_UNLOCK);
                write_reg(WDT_BASE.wrapping_add(WDT_FEED), FEED_COMMIT);
            }
        });
    }

    fn arm(&mut self, config: WatchdogConfig) {
        // SAFETY: clock select and timeout must be programmed before WDEN;
        // the final feed latches WDEN and starts the countdown.
        unsafe {
            write_reg(WDT_BASE.wrapping_add(WDT_CLKSEL), config.clock_source as u32);
            write_reg(WDT_BASE.wrapping_add(WDT_TC), config.timeout_ticks);
            write_reg(WDT_BASE.wrapping_add(WDT_MOD), config.mode_bits());
        }
        self.feed();
    }
}
