//! The system-control capability the handoff engine runs against.
//!
//! The engine's only access to clock, flash-timing, vector-table, and jump
//! hardware goes through this trait, held as an owned capability rather than
//! ambient global state. The bootloader binary implements it with raw
//! memory-mapped writes; host tests substitute a simulated register file
//! ([`crate::mocks::SimulatedSystem`]) so every write is observable.

/// Exclusive, ordered access to the registers the handoff sequence owns.
///
/// One implementor exists per boot: there is a single thread of control and
/// no interrupt handler touches these registers, so methods take `&mut self`
/// without further locking.
pub trait SystemControl {
    /// Overwrite PLL0CON. Not honored by hardware until the next feed pair.
    fn pll0_write_control(&mut self, value: u32);

    /// Write one word of the PLL0 feed sequence to PLL0FEED.
    ///
    /// The engine always writes [`crate::lpc17xx::FEED_UNLOCK`] then
    /// [`crate::lpc17xx::FEED_COMMIT`] back to back; any other access
    /// between the two voids the sequence.
    fn pll0_feed_write(&mut self, value: u32);

    /// Read PLL0STAT.
    fn pll0_status(&self) -> u32;

    /// Read FLASHCFG.
    fn flash_config(&self) -> u32;

    /// Overwrite FLASHCFG. Callers preserve the reserved low bits.
    fn write_flash_config(&mut self, value: u32);

    /// Overwrite the CPU clock divider (CCLKCFG).
    fn write_cpu_clock_divider(&mut self, value: u32);

    /// Overwrite the system clock source selector (CLKSRCSEL).
    fn write_clock_source(&mut self, value: u32);

    /// Overwrite the system controls and status register (SCS).
    fn write_system_controls(&mut self, value: u32);

    /// Overwrite the vector table base (SCB VTOR). The value must already
    /// satisfy the 128-byte alignment the hardware requires.
    fn write_vector_table_base(&mut self, base: u32);

    /// Data memory barrier, data synchronization barrier, instruction
    /// synchronization barrier — in exactly that order.
    fn memory_barriers(&mut self);

    /// Busy-wait for a fixed iteration count. Not calibrated to a time unit.
    fn settle_delay(&mut self, iterations: u32);

    /// Read one 32-bit word of the user image from flash, uncached.
    fn read_image_word(&mut self, address: u32) -> u32;

    /// Load the stack pointer and jump to `entry`.
    ///
    /// On hardware this must not return; a return is the jump anomaly and
    /// the caller escalates to [`SystemControl::system_reset`]. Simulated
    /// implementations record the call and return so tests can observe it.
    fn jump(&mut self, stack_pointer: u32, entry: u32);

    /// Force a full hardware system reset. Diverges on hardware.
    fn system_reset(&mut self);
}

impl<T: SystemControl + ?Sized> SystemControl for &mut T {
    fn pll0_write_control(&mut self, value: u32) {
        (**self).pll0_write_control(value);
    }
    fn pll0_feed_write(&mut self, value: u32) {
        (**self).pll0_feed_write(value);
    }
    fn pll0_status(&self) -> u32 {
        (**self).pll0_status()
    }
    fn flash_config(&self) -> u32 {
        (**self).flash_config()
    }
    fn write_flash_config(&mut self, value: u32) {
        (**self).write_flash_config(value);
    }
    fn write_cpu_clock_divider(&mut self, value: u32) {
        (**self).write_cpu_clock_divider(value);
    }
    fn write_clock_source(&mut self, value: u32) {
        (**self).write_clock_source(value);
    }
    fn write_system_controls(&mut self, value: u32) {
        (**self).write_system_controls(value);
    }
    fn write_vector_table_base(&mut self, base: u32) {
        (**self).write_vector_table_base(base);
    }
    fn memory_barriers(&mut self) {
        (**self).memory_barriers();
    }
    fn settle_delay(&mut self, iterations: u32) {
        (**self).settle_delay(iterations);
    }
    fn read_image_word(&mut self, address: u32) -> u32 {
        (**self).read_image_word(address)
    }
    fn jump(&mut self, stack_pointer: u32, entry: u32) {
        (**self).jump(stack_pointer, entry);
    }
    fn system_reset(&mut self) {
        (**self).system_reset();
    }
}
