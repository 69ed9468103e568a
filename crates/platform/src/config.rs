//! Build-time bootloader configuration.
//!
//! Everything here is a compile-time constant: the bootloader has no
//! configuration store, no CLI, and no runtime discovery. Changing any of
//! these values means relinking both the bootloader and the user image, so
//! they are collected in one place and cross-checked by tests.
//!
//! The pin assignments are the Smoothieboard wiring the original hardware
//! shipped with: five indicator LEDs, four heater MOSFET gates, UART0 on
//! P0.2/P0.3.

use crate::lpc17xx::VTOR_ALIGN_MASK;

/// Physical flash address where the user image is linked.
///
/// The image's vector table must start here: word 0 is its initial stack
/// pointer, word 1 its reset entry point. Must be 128-byte aligned so the
/// relocated vector table base equals the image base exactly.
pub const USER_FLASH_START: u32 = 0x0001_0000;

/// Core clock while the PLL is still connected, as left by the reset-path
/// clock init. Used only to derive UART divisors; the handoff drops the
/// core to the internal RC oscillator before the jump.
pub const BOOT_CCLK_HZ: u32 = 100_000_000;

/// Diagnostic channel line rate.
pub const DIAG_BAUD: u32 = 2_000_000;

/// Busy-wait iterations before the first clock register write.
///
/// Empirical, not calibrated to a time unit: clock consumers elsewhere may
/// still be draining when the bootloader reaches the engine.
pub const PRE_HANDOFF_SETTLE: u32 = 3_000_000;

/// Busy-wait iterations after the clock source switch, before relocating
/// the vector table.
pub const POST_SWITCH_SETTLE: u32 = 1_000;

/// Busy-wait iterations between the jump-return anomaly message and the
/// forced system reset, so the drain has visibly completed on the wire.
pub const ANOMALY_RESET_DELAY: u32 = 1 << 18;

/// Watchdog timeout, in watchdog clock ticks, when the guard is armed.
pub const WATCHDOG_TIMEOUT_TICKS: u32 = 1 << 22;

/// A port/pin pair on the FIO interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId {
    /// GPIO port number (0-4).
    pub port: u8,
    /// Pin number within the port (0-31).
    pub pin: u8,
}

impl PinId {
    /// Shorthand constructor, `PinId::new(2, 4)` for P2.4.
    #[must_use]
    pub const fn new(port: u8, pin: u8) -> Self {
        Self { port, pin }
    }
}

/// Number of status indicator lines.
pub const STATUS_LINE_COUNT: usize = 5;

/// Status indicator LEDs, bit 0 of the pattern first.
pub const STATUS_PINS: [PinId; STATUS_LINE_COUNT] = [
    PinId::new(1, 18),
    PinId::new(1, 19),
    PinId::new(1, 20),
    PinId::new(1, 21),
    PinId::new(4, 28),
];

/// "Alive" pattern: all five indicator lines high.
pub const STATUS_ALIVE: u8 = 0b1_1111;

/// Actuator-disable lines driven low before any clock change.
///
/// These gate the heater MOSFETs; the incoming firmware has not taken
/// control of them yet, so they must default to off across the handoff.
pub const QUIESCE_PINS: [PinId; 4] = [
    PinId::new(2, 4),
    PinId::new(2, 5),
    PinId::new(2, 6),
    PinId::new(2, 7),
];

/// UART0 transmit pin (TXD0 function).
pub const DIAG_TX_PIN: PinId = PinId::new(0, 2);
/// UART0 receive pin (RXD0 function; configured but never read).
pub const DIAG_RX_PIN: PinId = PinId::new(0, 3);
