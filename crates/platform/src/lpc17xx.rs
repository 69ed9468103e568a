//! LPC17xx register map — the subset the bootloader touches.
//!
//! Addresses and bit positions are from the NXP UM10360 user manual
//! (LPC176x/5x, rev 4.1). Only registers the boot path writes or polls are
//! listed; everything else belongs to the user image.
//!
//! # Protected clock registers
//!
//! PLL0 control changes are not honored until a feed sequence is written to
//! PLL0FEED: `0xAA` followed by `0x55`, with no other PLL0 register access in
//! between (UM10360 §4.5.8). The watchdog reload register has the same
//! unlock/commit pair on WDFEED (§28.6.3) — there an *interrupted* pair causes
//! an immediate reset once the watchdog is enabled.
//!
//! # Register ownership during handoff
//!
//! | Register  | Access    | Notes                                        |
//! |-----------|-----------|----------------------------------------------|
//! | PLL0CON   | overwrite | engine-owned during the transition           |
//! | PLL0FEED  | overwrite | write-only feed pair                         |
//! | PLL0STAT  | read      | poll-only                                    |
//! | FLASHCFG  | rmw       | low 12 bits are reserved and must be kept    |
//! | CCLKCFG   | overwrite | engine-owned                                 |
//! | CLKSRCSEL | overwrite | engine-owned                                 |
//! | SCS       | overwrite | engine-owned (main oscillator off)           |
//! | SCB VTOR  | overwrite | 128-byte-aligned table base                  |

// ── System control block (clocking and power) ───────────────────────────────

/// System control base (UM10360 §3.2).
pub const SYSCON_BASE: u32 = 0x400F_C000;

/// Flash accelerator configuration register.
pub const FLASHCFG: u32 = SYSCON_BASE;
/// PLL0 control register.
pub const PLL0CON: u32 = SYSCON_BASE + 0x080;
/// PLL0 configuration register (multiplier/divider — untouched by the engine).
pub const PLL0CFG: u32 = SYSCON_BASE + 0x084;
/// PLL0 status register.
pub const PLL0STAT: u32 = SYSCON_BASE + 0x088;
/// PLL0 feed register (write-only).
pub const PLL0FEED: u32 = SYSCON_BASE + 0x08C;
/// CPU clock divider register.
pub const CCLKCFG: u32 = SYSCON_BASE + 0x104;
/// Clock source select register.
pub const CLKSRCSEL: u32 = SYSCON_BASE + 0x10C;
/// Peripheral power control register.
pub const PCONP: u32 = SYSCON_BASE + 0x0C4;
/// System controls and status register (main oscillator enable/status).
pub const SCS: u32 = SYSCON_BASE + 0x1A0;
/// Peripheral clock select register 0.
pub const PCLKSEL0: u32 = SYSCON_BASE + 0x1A8;

/// PLL0CON: PLL enable.
pub const PLL0CON_PLLE: u32 = 1 << 0;
/// PLL0CON: PLL connect (PLL output drives the CPU clock).
pub const PLL0CON_PLLC: u32 = 1 << 1;
/// PLL0CON value that detaches the PLL but leaves it running.
pub const PLL0CON_DISCONNECT: u32 = PLL0CON_PLLE;
/// PLL0CON value that powers the PLL down entirely.
pub const PLL0CON_POWER_DOWN: u32 = 0x0;

/// PLL0STAT: read-back of the enable bit, updated after a feed commit.
pub const PLL0STAT_PLLE0: u32 = 1 << 24;
/// PLL0STAT: read-back of the connect bit, updated after a feed commit.
pub const PLL0STAT_PLLC0: u32 = 1 << 25;

/// First (unlock) word of the PLL0/WDT feed sequence.
pub const FEED_UNLOCK: u32 = 0xAA;
/// Second (commit) word of the PLL0/WDT feed sequence.
pub const FEED_COMMIT: u32 = 0x55;

/// FLASHCFG bits below the FLASHTIM field — reserved, preserved on rmw.
pub const FLASHCFG_RESERVED_MASK: u32 = 0x0000_0FFF;
/// FLASHTIM setting safe at any core clock rate (UM10360 Table 8: six
/// CPU clocks per flash access).
pub const FLASHCFG_TIM_SAFE: u32 = 0x0000_5000;

/// CCLKCFG: undivided (CCLK = sysclk), the IRC default.
pub const CCLKCFG_DIV_1: u32 = 0x0;
/// CLKSRCSEL: internal RC oscillator.
pub const CLKSRCSEL_IRC: u32 = 0x0;
/// SCS with the main oscillator disabled.
pub const SCS_MAIN_OSC_OFF: u32 = 0x0;

/// PCONP: UART0 power/clock enable.
pub const PCONP_PCUART0: u32 = 1 << 3;

// ── Cortex-M3 system control space ──────────────────────────────────────────

/// SCB vector table offset register.
pub const SCB_VTOR: u32 = 0xE000_ED08;
/// The LPC17xx vector table base must be 128-byte aligned; bits above the
/// implemented address range read as zero (UM10360 §34.4.3.5).
pub const VTOR_ALIGN_MASK: u32 = 0x1FFF_FF80;

// ── GPIO (fast FIO interface) ───────────────────────────────────────────────

/// Fast GPIO base; ports are 0x20 apart.
pub const FIO_BASE: u32 = 0x2009_C000;
/// Byte stride between FIO port register blocks.
pub const FIO_PORT_STRIDE: u32 = 0x20;
/// FIODIR offset within a port block.
pub const FIO_DIR: u32 = 0x00;
/// FIOSET offset within a port block (write-only, sets bits).
pub const FIO_SET: u32 = 0x18;
/// FIOCLR offset within a port block (write-only, clears bits).
pub const FIO_CLR: u32 = 0x1C;

/// Pin function select base; two 32-bit registers per port, two bits per pin.
pub const PINSEL_BASE: u32 = 0x4002_C000;

// ── UART0 ───────────────────────────────────────────────────────────────────

/// UART0 register base.
pub const UART0_BASE: u32 = 0x4000_C000;
/// Transmit holding register (DLAB=0, write).
pub const UART_THR: u32 = 0x00;
/// Divisor latch LSB (DLAB=1).
pub const UART_DLL: u32 = 0x00;
/// Divisor latch MSB (DLAB=1).
pub const UART_DLM: u32 = 0x04;
/// FIFO control register (write).
pub const UART_FCR: u32 = 0x08;
/// Line control register.
pub const UART_LCR: u32 = 0x0C;
/// Line status register.
pub const UART_LSR: u32 = 0x14;
/// Fractional divider register.
pub const UART_FDR: u32 = 0x28;

/// LCR: 8 data bits, no parity, 1 stop bit.
pub const UART_LCR_8N1: u32 = 0x03;
/// LCR: divisor latch access bit.
pub const UART_LCR_DLAB: u32 = 0x80;
/// FCR: enable FIFOs and reset both.
pub const UART_FCR_ENABLE_RESET: u32 = 0x07;
/// LSR: transmit holding register empty (FIFO can take a full burst).
pub const UART_LSR_THRE: u32 = 1 << 5;
/// LSR: transmitter empty (FIFO and shift register both drained).
pub const UART_LSR_TEMT: u32 = 1 << 6;
/// TX FIFO depth.
pub const UART_FIFO_DEPTH: usize = 16;

// ── Watchdog timer ──────────────────────────────────────────────────────────

/// Watchdog register base.
pub const WDT_BASE: u32 = 0x4000_0000;
/// Watchdog mode register offset.
pub const WDT_MOD: u32 = 0x00;
/// Watchdog timeout constant register offset.
pub const WDT_TC: u32 = 0x04;
/// Watchdog feed register offset (write-only).
pub const WDT_FEED: u32 = 0x08;
/// Watchdog clock select register offset.
pub const WDT_CLKSEL: u32 = 0x10;

/// WDMOD: watchdog enable.
pub const WDMOD_WDEN: u32 = 1 << 0;
/// WDMOD: reset the chip on expiry.
pub const WDMOD_WDRESET: u32 = 1 << 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pll0_registers_are_contiguous() {
        assert_eq!(PLL0CON, 0x400F_C080);
        assert_eq!(PLL0CFG, 0x400F_C084);
        assert_eq!(PLL0STAT, 0x400F_C088);
        assert_eq!(PLL0FEED, 0x400F_C08C);
    }

    #[test]
    fn disconnect_keeps_pll_enabled() {
        // Disconnect first, power down second: the disconnect value must keep
        // PLLE set or the two transitions collapse into one.
        assert_eq!(PLL0CON_DISCONNECT & PLL0CON_PLLE, PLL0CON_PLLE);
        assert_eq!(PLL0CON_DISCONNECT & PLL0CON_PLLC, 0);
        assert_eq!(PLL0CON_POWER_DOWN, 0);
    }

    #[test]
    fn flash_timing_fields_do_not_overlap() {
        assert_eq!(FLASHCFG_RESERVED_MASK & FLASHCFG_TIM_SAFE, 0);
    }

    #[test]
    fn vtor_mask_clears_the_low_seven_bits() {
        assert_eq!(VTOR_ALIGN_MASK & 0x7F, 0);
    }
}
