//! Bootloader entry point — hardware only.

#![no_std]
#![no_main]

use cortex_m_rt::entry;

use bootloader::boot::{self, BootIo};
use bootloader::hal::{FioPin, Lpc17xxWatchdog, Lpc17xxSystem};
use platform::config;
use platform::image::BootTarget;
use platform::watchdog::WatchdogConfig;

#[cfg(feature = "diagnostics")]
use bootloader::hal::Uart0;
#[cfg(not(feature = "diagnostics"))]
use platform::diag::NullSink;

// Global logger + panic handler
use defmt_rtt as _;
use panic_probe as _;

#[entry]
fn main() -> ! {
    // SAFETY: constructed exactly once, before anything else could be
    // touching the clock registers.
    let sys = unsafe { Lpc17xxSystem::new() };
    let mut watchdog = Lpc17xxWatchdog::new();

    let mut status_lines = config::STATUS_PINS.map(FioPin::output);
    let mut quiesce_pins = config::QUIESCE_PINS.map(FioPin::output);

    #[cfg(feature = "diagnostics")]
    let mut diag = Uart0::init(platform::diag::DIAG_DIVISORS);
    #[cfg(not(feature = "diagnostics"))]
    let mut diag = NullSink;

    let guard: Option<WatchdogConfig> = if cfg!(feature = "watchdog") {
        Some(WatchdogConfig::handoff_guard())
    } else {
        None
    };

    defmt::info!("stage0 bootloader, user image at {=u32:#x}", config::USER_FLASH_START);

    let io = BootIo {
        sys,
        watchdog: &mut watchdog,
        status_lines: &mut status_lines,
        quiesce_pins: &mut quiesce_pins,
        diag: &mut diag,
    };
    let _ = boot::run(io, BootTarget::new(config::USER_FLASH_START), guard);

    // run() ends in the jump or in a system reset; this is unreachable in
    // practice but the entry signature needs a diverging tail.
    loop {
        cortex_m::asm::nop();
    }
}
