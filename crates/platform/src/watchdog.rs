//! Watchdog guard model.
//!
//! The watchdog has two jobs at boot. First, it must be fed before anything
//! else happens: on some reset paths the counter is already running when
//! the bootloader gains control. Second — build-time optional — it is armed
//! as a roll-back net for the handoff: once armed in reset mode it cannot
//! be disarmed, so if the clock transition hangs on a status poll the chip
//! resets itself after the timeout and gets one more run from the earliest
//! known-good state.
//!
//! The feed register takes the same 0xAA/0x55 unlock/commit pair as the PLL
//! feed, with a harsher failure mode: once the watchdog is enabled, an
//! interrupted pair triggers an immediate reset. The hardware driver feeds
//! inside a critical section for that reason.

use crate::lpc17xx::{WDMOD_WDEN, WDMOD_WDRESET};

/// Watchdog clock source (WDCLKSEL values).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WdtClockSource {
    /// Internal RC oscillator — keeps counting through the PLL shutdown,
    /// which is the whole point of arming it before the handoff.
    InternalRc = 0,
    /// Peripheral clock.
    PeripheralClock = 1,
    /// RTC 32 kHz oscillator.
    RtcOscillator = 2,
}

/// How the guard is armed. Reset-on-expiry is the only supported mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchdogConfig {
    /// Clock the timeout counts against.
    pub clock_source: WdtClockSource,
    /// Ticks until reset if nothing feeds the counter.
    pub timeout_ticks: u32,
}

impl WatchdogConfig {
    /// The configuration the boot path arms before the handoff.
    #[must_use]
    pub const fn handoff_guard() -> Self {
        Self {
            clock_source: WdtClockSource::InternalRc,
            timeout_ticks: crate::config::WATCHDOG_TIMEOUT_TICKS,
        }
    }

    /// WDMOD value: enabled, reset on expiry.
    #[must_use]
    pub const fn mode_bits(self) -> u32 {
        WDMOD_WDEN | WDMOD_WDRESET
    }
}

/// The watchdog capability the boot path drives.
pub trait WatchdogTimer {
    /// Reset the countdown. Must be the very first hardware access of the
    /// boot path: a counter from the power-on state may already be running.
    fn feed(&mut self);

    /// Switch to reset-on-expiry mode with `config`, including the feed
    /// that latches the new mode. Irreversible: the hardware provides no
    /// disarm, and this program never feeds again after the handoff starts.
    fn arm(&mut self, config: WatchdogConfig);
}
