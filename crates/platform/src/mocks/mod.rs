//! Mock implementations for testing.
//!
//! Host-side substitutes for every hardware capability the boot path
//! drives, with observable operation logs. [`SimulatedSystem`] is the
//! simulated register file the handoff engine runs against: it models the
//! PLL0 feed protocol, so an engine that skips or reorders the unlock/
//! commit pair leaves the simulated status bits unchanged and the test
//! hangs its poll budget instead of passing silently.

#![cfg(any(test, feature = "std"))]
#![allow(clippy::arithmetic_side_effects)] // bounded test bookkeeping

use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_io::Write;

use crate::diag::DiagnosticSink;
use crate::lpc17xx::{
    FEED_COMMIT, FEED_UNLOCK, PLL0CON_PLLC, PLL0CON_PLLE, PLL0STAT_PLLC0, PLL0STAT_PLLE0,
};
use crate::sysctl::SystemControl;
use crate::watchdog::{WatchdogConfig, WatchdogTimer};

/// One observable operation against the simulated system registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysOp {
    /// PLL0CON overwrite.
    PllControlWrite(u32),
    /// One word of the PLL0FEED sequence.
    PllFeedWrite(u32),
    /// FLASHCFG overwrite.
    FlashConfigWrite(u32),
    /// CCLKCFG overwrite.
    CpuClockDividerWrite(u32),
    /// CLKSRCSEL overwrite.
    ClockSourceWrite(u32),
    /// SCS overwrite.
    SystemControlsWrite(u32),
    /// SCB VTOR overwrite.
    VectorTableWrite(u32),
    /// DMB/DSB/ISB triple.
    Barriers,
    /// Fixed busy-wait request.
    SettleDelay(u32),
    /// Uncached user-image flash read.
    ImageRead(u32),
    /// The bootstrap jump.
    Jump {
        /// Stack pointer loaded before the jump.
        stack_pointer: u32,
        /// Entry address the program counter was loaded with.
        entry: u32,
    },
    /// Forced full system reset.
    SystemReset,
}

/// Simulated LPC17xx clock/system register file.
///
/// Control writes are held pending until a correct, uninterrupted feed pair
/// commits them, mirroring the hardware's protected-register protocol. The
/// status register reads back the committed state — unless the simulation
/// is configured stuck, in which case it never changes, for exercising the
/// unbounded-poll behavior under a test budget.
pub struct SimulatedSystem {
    ops: heapless::Vec<SysOp, 64>,
    pll0_pending: u32,
    pll0_active: u32,
    pll0_status: u32,
    feed_unlocked: bool,
    stuck_pll: bool,
    flash_config: u32,
    image_base: u32,
    image_words: heapless::Vec<u32, 8>,
}

impl SimulatedSystem {
    /// FLASHCFG power-on value (UM10360 §3.4.1): reserved low bits plus a
    /// five-clock FLASHTIM.
    pub const FLASHCFG_RESET: u32 = 0x0000_403A;

    /// A system with the PLL connected and no image programmed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ops: heapless::Vec::new(),
            pll0_pending: PLL0CON_PLLE | PLL0CON_PLLC,
            pll0_active: PLL0CON_PLLE | PLL0CON_PLLC,
            pll0_status: PLL0STAT_PLLE0 | PLL0STAT_PLLC0,
            feed_unlocked: false,
            stuck_pll: false,
            flash_config: Self::FLASHCFG_RESET,
            image_base: 0,
            image_words: heapless::Vec::new(),
        }
    }

    /// A system with `words` programmed at `base` in simulated flash.
    #[must_use]
    pub fn with_image(base: u32, words: &[u32]) -> Self {
        let mut sim = Self::new();
        sim.image_base = base;
        for word in words {
            let _ = sim.image_words.push(*word);
        }
        sim
    }

    /// Freeze the PLL status register: feeds commit but the status bits
    /// never change, so disconnect/power-down polls spin forever.
    #[must_use]
    pub fn stuck_pll(mut self) -> Self {
        self.stuck_pll = true;
        self
    }

    /// Everything the boot path did, in order.
    pub fn ops(&self) -> &[SysOp] {
        &self.ops
    }

    /// The recorded jump, if one happened.
    pub fn jumped(&self) -> Option<(u32, u32)> {
        self.ops.iter().find_map(|op| match op {
            SysOp::Jump {
                stack_pointer,
                entry,
            } => Some((*stack_pointer, *entry)),
            _ => None,
        })
    }

    /// Whether a forced system reset was recorded.
    pub fn reset_requested(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, SysOp::SystemReset))
    }

    /// Current simulated PLL0STAT value.
    pub fn pll0_status_bits(&self) -> u32 {
        self.pll0_status
    }

    fn record(&mut self, op: SysOp) {
        let _ = self.ops.push(op);
    }

    fn commit_pll0(&mut self) {
        self.pll0_active = self.pll0_pending;
        if self.stuck_pll {
            return;
        }
        let enabled = self.pll0_active & PLL0CON_PLLE != 0;
        let connected = enabled && self.pll0_active & PLL0CON_PLLC != 0;
        self.pll0_status = 0;
        if enabled {
            self.pll0_status |= PLL0STAT_PLLE0;
        }
        if connected {
            self.pll0_status |= PLL0STAT_PLLC0;
        }
    }
}

impl Default for SimulatedSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemControl for SimulatedSystem {
    fn pll0_write_control(&mut self, value: u32) {
        self.record(SysOp::PllControlWrite(value));
        self.pll0_pending = value;
        // Any non-feed PLL0 access voids a half-finished feed sequence.
        self.feed_unlocked = false;
    }

    fn pll0_feed_write(&mut self, value: u32) {
        self.record(SysOp::PllFeedWrite(value));
        if value == FEED_UNLOCK {
            self.feed_unlocked = true;
        } else if value == FEED_COMMIT && self.feed_unlocked {
            self.feed_unlocked = false;
            self.commit_pll0();
        } else {
            self.feed_unlocked = false;
        }
    }

    fn pll0_status(&self) -> u32 {
        self.pll0_status
    }

    fn flash_config(&self) -> u32 {
        self.flash_config
    }

    fn write_flash_config(&mut self, value: u32) {
        self.record(SysOp::FlashConfigWrite(value));
        self.flash_config = value;
    }

    fn write_cpu_clock_divider(&mut self, value: u32) {
        self.record(SysOp::CpuClockDividerWrite(value));
    }

    fn write_clock_source(&mut self, value: u32) {
        self.record(SysOp::ClockSourceWrite(value));
    }

    fn write_system_controls(&mut self, value: u32) {
        self.record(SysOp::SystemControlsWrite(value));
    }

    fn write_vector_table_base(&mut self, base: u32) {
        self.record(SysOp::VectorTableWrite(base));
    }

    fn memory_barriers(&mut self) {
        self.record(SysOp::Barriers);
    }

    fn settle_delay(&mut self, iterations: u32) {
        self.record(SysOp::SettleDelay(iterations));
    }

    fn read_image_word(&mut self, address: u32) -> u32 {
        self.record(SysOp::ImageRead(address));
        let offset = address.wrapping_sub(self.image_base) / 4;
        self.image_words
            .get(offset as usize)
            .copied()
            .unwrap_or(0xFFFF_FFFF)
    }

    fn jump(&mut self, stack_pointer: u32, entry: u32) {
        self.record(SysOp::Jump {
            stack_pointer,
            entry,
        });
    }

    fn system_reset(&mut self) {
        self.record(SysOp::SystemReset);
    }
}

/// Output pin recording its level and how often it was driven.
#[derive(Debug, Default)]
pub struct MockPin {
    high: bool,
    set_count: usize,
}

impl MockPin {
    /// A pin starting low.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A pin starting high, for asserting that quiesce pulls it down.
    #[must_use]
    pub fn high() -> Self {
        Self {
            high: true,
            set_count: 0,
        }
    }

    /// Current driven level.
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Number of `set_high`/`set_low` calls.
    pub fn set_count(&self) -> usize {
        self.set_count
    }
}

impl PinErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for MockPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        self.set_count += 1;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        self.set_count += 1;
        Ok(())
    }
}

/// Diagnostic sink capturing everything written to it.
#[derive(Debug, Default)]
pub struct MockSink {
    written: heapless::Vec<u8, 256>,
    flushes: usize,
    shutdowns: usize,
    restarts: usize,
    written_at_shutdown: Option<usize>,
}

impl MockSink {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every byte written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Number of drain requests.
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Number of shutdown requests.
    pub fn shutdowns(&self) -> usize {
        self.shutdowns
    }

    /// Number of restart requests.
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    /// Bytes that had been written when the first shutdown arrived.
    pub fn written_at_shutdown(&self) -> Option<usize> {
        self.written_at_shutdown
    }
}

impl embedded_io::ErrorType for MockSink {
    type Error = core::convert::Infallible;
}

impl Write for MockSink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let _ = self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

impl DiagnosticSink for MockSink {
    fn shutdown(&mut self) {
        self.shutdowns += 1;
        if self.written_at_shutdown.is_none() {
            self.written_at_shutdown = Some(self.written.len());
        }
    }

    fn restart(&mut self) {
        self.restarts += 1;
    }
}

/// Watchdog recording feeds and the armed configuration.
#[derive(Debug, Default)]
pub struct MockWatchdog {
    feeds: usize,
    armed: Option<WatchdogConfig>,
    fed_after_arm: bool,
}

impl MockWatchdog {
    /// An unfed, unarmed watchdog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total feed count.
    pub fn feeds(&self) -> usize {
        self.feeds
    }

    /// The configuration the guard was armed with, if any.
    pub fn armed(&self) -> Option<WatchdogConfig> {
        self.armed
    }

    /// Whether an armed, since-unfed guard would have reset the chip after
    /// `elapsed_ticks`.
    pub fn expired_after(&self, elapsed_ticks: u32) -> bool {
        match self.armed {
            Some(config) => !self.fed_after_arm && elapsed_ticks >= config.timeout_ticks,
            None => false,
        }
    }
}

impl WatchdogTimer for MockWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
        if self.armed.is_some() {
            self.fed_after_arm = true;
        }
    }

    fn arm(&mut self, config: WatchdogConfig) {
        self.armed = Some(config);
        self.fed_after_arm = false;
    }
}
