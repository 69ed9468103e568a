//! Clock transition and handoff engine.
//!
//! The sequence below is strictly ordered, non-interruptible, and
//! non-retryable. Once the first PLL register is touched there is no way
//! back: the engine either reaches the jump or hangs on a status poll that
//! the hardware never satisfies. The polls have no timeout on purpose —
//! the only external bound is the watchdog, if the boot path armed it.
//!
//! Sequence (MUST be respected — order matters for correctness):
//!   1. Settle delay: clock consumers elsewhere may still be draining
//!   2. Disconnect PLL0 (control write + feed pair), poll connect bit clear
//!   3. Power down PLL0 (control write + feed pair), poll enable bit clear
//!   4. Retune flash access timing for IRC speed (read-modify-write)
//!   5. CPU clock divider to /1, clock source to IRC, main oscillator off
//!   6. Second settle delay
//!   7. Relocate the vector table base to the user image (128-byte aligned)
//!   8. DMB, DSB, ISB — table base and prior writes visible, pipeline flushed
//!   9. Load SP from `base + 0`, jump to the word at `base + 4`
//!
//! Steps 2 and 3 are two distinct transitions: a connected PLL must be
//! detached from the clock path before it may be powered down (UM10360
//! §4.5.13 warns the CPU is left without a clock otherwise).

use crate::image::{BootTarget, VectorTable};
use crate::lpc17xx::{
    CCLKCFG_DIV_1, CLKSRCSEL_IRC, FEED_COMMIT, FEED_UNLOCK, FLASHCFG_RESERVED_MASK,
    FLASHCFG_TIM_SAFE, PLL0CON_DISCONNECT, PLL0CON_POWER_DOWN, PLL0STAT_PLLC0, PLL0STAT_PLLE0,
    SCS_MAIN_OSC_OFF, VTOR_ALIGN_MASK,
};
use crate::sysctl::SystemControl;

/// Ordered list of the handoff steps, for documentation and order tests.
pub const HANDOFF_SEQUENCE_STEPS: &[&str] = &[
    "1. Settle: fixed busy-wait before the first clock register write",
    "2. PLL0 disconnect: control write, feed pair, poll connect bit clear",
    "3. PLL0 power down: control write, feed pair, poll enable bit clear",
    "4. Flash timing: retune FLASHCFG for IRC speed, preserving reserved bits",
    "5. Clock switch: CCLKCFG /1, CLKSRCSEL to IRC, main oscillator off",
    "6. Settle: second fixed busy-wait after the source switch",
    "7. Vector table: relocate VTOR to the 128-byte-aligned image base",
    "8. Barriers: DMB, DSB, ISB in that order",
    "9. Jump: SP from base+0, PC from base+4, never returns",
];

/// Where the engine is in the transition. Mutated only by [`ClockHandoff`];
/// read by tests and by the poll-budget error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandoffPhase {
    /// Initial state: PLL0 drives the core, nothing touched yet.
    PllConnected,
    /// Disconnect written and fed; polling the connect status bit.
    PllDisconnectRequested,
    /// Connect status bit observed clear.
    PllDisconnected,
    /// Power-down written and fed; polling the enable status bit.
    PllPowerDownRequested,
    /// Enable status bit observed clear.
    PllPoweredDown,
    /// FLASHCFG retimed for the internal oscillator.
    FlashTimingRetuned,
    /// Divider, source selector, and SCS switched to the IRC default.
    ClockSourceSwitched,
    /// VTOR points at the user image.
    VectorTableRelocated,
    /// Barriers issued; the next action is the jump.
    BarrierSynced,
    /// Terminal. On hardware this state is never observed from inside.
    Jumped,
}

/// Engine failure. Only constructible when a host test installs a poll
/// budget; hardware builds leave the budget unset and poll forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandoffError {
    /// A PLL0 status poll did not observe the expected bit change within
    /// the installed budget.
    #[error("PLL0 status poll budget exhausted in phase {phase:?}")]
    PollBudgetExhausted {
        /// Phase the engine was in when the budget ran out.
        phase: HandoffPhase,
    },
}

/// Mask the image base down to the hardware-required vector table alignment.
///
/// The low 7 bits must be clear (128-byte alignment); bits above the
/// implemented address range are dropped the way the register would drop
/// them.
#[must_use]
pub const fn vector_table_base(image_base: u32) -> u32 {
    image_base & VTOR_ALIGN_MASK
}

/// The clock transition and handoff state machine.
///
/// Consumes the system capability for the duration of the boot: nothing else
/// may touch the clock registers once the engine exists.
pub struct ClockHandoff<S: SystemControl> {
    sys: S,
    phase: HandoffPhase,
    poll_budget: Option<u32>,
    pre_settle: u32,
    post_settle: u32,
}

impl<S: SystemControl> ClockHandoff<S> {
    /// Engine over `sys` with the production settle delays and unbounded
    /// status polls.
    pub fn new(sys: S) -> Self {
        Self {
            sys,
            phase: HandoffPhase::PllConnected,
            poll_budget: None,
            pre_settle: crate::config::PRE_HANDOFF_SETTLE,
            post_settle: crate::config::POST_SWITCH_SETTLE,
        }
    }

    /// Bound every status poll to `polls` reads.
    ///
    /// Host-test aid only: the faithful behavior is the unbounded poll, and
    /// hardware builds never call this. With a budget installed, a stuck
    /// status bit surfaces as [`HandoffError::PollBudgetExhausted`] instead
    /// of a hang.
    #[must_use]
    pub fn with_poll_budget(mut self, polls: u32) -> Self {
        self.poll_budget = Some(polls);
        self
    }

    /// Current state-machine phase.
    pub fn phase(&self) -> HandoffPhase {
        self.phase
    }

    /// Release the system capability (after an anomalous return).
    pub fn into_inner(self) -> S {
        self.sys
    }

    /// Run the transition and jump to `target`.
    ///
    /// On hardware this returns only in the jump-return anomaly case; the
    /// caller must treat any return as fatal and escalate to a system
    /// reset. `Err` is only produced under a test poll budget.
    pub fn run(&mut self, target: BootTarget) -> Result<(), HandoffError> {
        self.sys.settle_delay(self.pre_settle);

        // Detach the PLL from the clock path. The core keeps running on the
        // PLL output until the hardware acknowledges the disconnect.
        self.phase = HandoffPhase::PllDisconnectRequested;
        self.sys.pll0_write_control(PLL0CON_DISCONNECT);
        self.feed_pll0();
        self.wait_pll0_clear(PLL0STAT_PLLC0)?;
        self.phase = HandoffPhase::PllDisconnected;

        self.phase = HandoffPhase::PllPowerDownRequested;
        self.sys.pll0_write_control(PLL0CON_POWER_DOWN);
        self.feed_pll0();
        self.wait_pll0_clear(PLL0STAT_PLLE0)?;
        self.phase = HandoffPhase::PllPoweredDown;

        // The low 12 bits of FLASHCFG are reserved; only the timing field
        // changes.
        let flash = self.sys.flash_config() & FLASHCFG_RESERVED_MASK;
        self.sys.write_flash_config(flash | FLASHCFG_TIM_SAFE);
        self.phase = HandoffPhase::FlashTimingRetuned;

        self.sys.write_cpu_clock_divider(CCLKCFG_DIV_1);
        self.sys.write_clock_source(CLKSRCSEL_IRC);
        self.sys.write_system_controls(SCS_MAIN_OSC_OFF);
        self.phase = HandoffPhase::ClockSourceSwitched;

        self.sys.settle_delay(self.post_settle);

        self.sys
            .write_vector_table_base(vector_table_base(target.base_address));
        self.phase = HandoffPhase::VectorTableRelocated;

        self.sys.memory_barriers();
        self.phase = HandoffPhase::BarrierSynced;

        let table = VectorTable::read(&mut self.sys, target);
        self.phase = HandoffPhase::Jumped;
        self.sys
            .jump(table.initial_stack_pointer, table.reset_entry_point);
        Ok(())
    }

    fn feed_pll0(&mut self) {
        self.sys.pll0_feed_write(FEED_UNLOCK);
        self.sys.pll0_feed_write(FEED_COMMIT);
    }

    fn wait_pll0_clear(&mut self, mask: u32) -> Result<(), HandoffError> {
        let mut budget = self.poll_budget;
        while self.sys.pll0_status() & mask != 0 {
            if let Some(remaining) = budget {
                budget = Some(
                    remaining
                        .checked_sub(1)
                        .ok_or(HandoffError::PollBudgetExhausted { phase: self.phase })?,
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::lpc17xx::{FLASHCFG, PLL0CON, PLL0FEED};
    use crate::mocks::{SimulatedSystem, SysOp};

    fn target() -> BootTarget {
        BootTarget::new(0x0001_0000)
    }

    fn run_to_jump(sim: &mut SimulatedSystem) {
        let mut engine = ClockHandoff::new(&mut *sim);
        engine.run(target()).expect("unbounded run cannot fail");
        assert_eq!(engine.phase(), HandoffPhase::Jumped);
    }

    #[test]
    fn sequence_writes_follow_the_step_list() {
        let mut sim = SimulatedSystem::with_image(0x0001_0000, &[0x1000_1000, 0x0001_0201]);
        run_to_jump(&mut sim);

        let expected = [
            SysOp::SettleDelay(crate::config::PRE_HANDOFF_SETTLE),
            SysOp::PllControlWrite(PLL0CON_DISCONNECT),
            SysOp::PllFeedWrite(FEED_UNLOCK),
            SysOp::PllFeedWrite(FEED_COMMIT),
            SysOp::PllControlWrite(PLL0CON_POWER_DOWN),
            SysOp::PllFeedWrite(FEED_UNLOCK),
            SysOp::PllFeedWrite(FEED_COMMIT),
            SysOp::FlashConfigWrite((SimulatedSystem::FLASHCFG_RESET & 0x0FFF) | 0x5000),
            SysOp::CpuClockDividerWrite(0),
            SysOp::ClockSourceWrite(0),
            SysOp::SystemControlsWrite(0),
            SysOp::SettleDelay(crate::config::POST_SWITCH_SETTLE),
            SysOp::VectorTableWrite(0x0001_0000),
            SysOp::Barriers,
            SysOp::ImageRead(0x0001_0000),
            SysOp::ImageRead(0x0001_0004),
            SysOp::Jump {
                stack_pointer: 0x1000_1000,
                entry: 0x0001_0201,
            },
        ];
        assert_eq!(sim.ops(), expected.as_slice());
    }

    #[test]
    fn jump_is_the_final_operation() {
        let mut sim = SimulatedSystem::with_image(0x0001_0000, &[0x1000_1000, 0x0001_0201]);
        run_to_jump(&mut sim);
        assert!(matches!(sim.ops().last(), Some(SysOp::Jump { .. })));
    }

    #[test]
    fn status_bits_read_back_each_committed_transition() {
        let mut sim = SimulatedSystem::with_image(0x0001_0000, &[0, 0]);
        {
            let mut engine = ClockHandoff::new(&mut sim);
            engine.run(target()).unwrap();
        }
        // After both feed commits the simulated PLL is disconnected and off.
        assert_eq!(sim.pll0_status_bits() & (PLL0STAT_PLLC0 | PLL0STAT_PLLE0), 0);
    }

    #[test]
    fn flash_timing_preserves_reserved_bits() {
        let mut sim = SimulatedSystem::with_image(0x0001_0000, &[0, 0]);
        run_to_jump(&mut sim);
        let written = sim
            .ops()
            .iter()
            .find_map(|op| match op {
                SysOp::FlashConfigWrite(v) => Some(*v),
                _ => None,
            })
            .unwrap();
        assert_eq!(written & 0x0FFF, SimulatedSystem::FLASHCFG_RESET & 0x0FFF);
        assert_eq!(written & !0x0FFF, FLASHCFG_TIM_SAFE);
    }

    #[test]
    fn image_words_come_only_from_base_and_base_plus_four() {
        let mut sim = SimulatedSystem::with_image(0x0001_0000, &[0x1000_1000, 0x0001_0201]);
        run_to_jump(&mut sim);
        let reads: heapless::Vec<u32, 8> = sim
            .ops()
            .iter()
            .filter_map(|op| match op {
                SysOp::ImageRead(addr) => Some(*addr),
                _ => None,
            })
            .collect();
        assert_eq!(reads.as_slice(), [0x0001_0000, 0x0001_0004].as_slice());
    }

    #[test]
    fn jump_loads_sp_then_pc_from_the_image() {
        let mut sim = SimulatedSystem::with_image(0x0001_0000, &[0x1000_1000, 0x0001_0201]);
        run_to_jump(&mut sim);
        assert_eq!(sim.jumped(), Some((0x1000_1000, 0x0001_0201)));
    }

    #[test]
    fn stuck_pll_never_reaches_flash_retiming() {
        let mut sim =
            SimulatedSystem::with_image(0x0001_0000, &[0x1000_1000, 0x0001_0201]).stuck_pll();
        let mut engine = ClockHandoff::new(&mut sim).with_poll_budget(64);
        let err = engine.run(target()).unwrap_err();
        assert_eq!(
            err,
            HandoffError::PollBudgetExhausted {
                phase: HandoffPhase::PllDisconnectRequested
            }
        );
        assert_eq!(engine.phase(), HandoffPhase::PllDisconnectRequested);
        drop(engine);
        assert!(!sim
            .ops()
            .iter()
            .any(|op| matches!(op, SysOp::FlashConfigWrite(_))));
    }

    #[test]
    fn phases_are_totally_ordered() {
        assert!(HandoffPhase::PllConnected < HandoffPhase::PllDisconnectRequested);
        assert!(HandoffPhase::PllDisconnectRequested < HandoffPhase::FlashTimingRetuned);
        assert!(HandoffPhase::FlashTimingRetuned < HandoffPhase::BarrierSynced);
        assert!(HandoffPhase::BarrierSynced < HandoffPhase::Jumped);
    }

    #[test]
    fn vector_table_base_masks_the_low_bits() {
        assert_eq!(vector_table_base(0x0001_0000), 0x0001_0000);
        assert_eq!(vector_table_base(0x0001_007F), 0x0001_0000);
        assert_eq!(vector_table_base(0xFFFF_FFFF), 0x1FFF_FF80);
    }

    #[test]
    fn step_list_matches_the_phase_count() {
        // Nine steps; the tenth phase (Jumped) is terminal, not a step.
        assert_eq!(HANDOFF_SEQUENCE_STEPS.len(), 9);
        let barrier_idx = HANDOFF_SEQUENCE_STEPS
            .iter()
            .position(|s| s.contains("Barriers"))
            .unwrap();
        let vtor_idx = HANDOFF_SEQUENCE_STEPS
            .iter()
            .position(|s| s.contains("Vector table"))
            .unwrap();
        let jump_idx = HANDOFF_SEQUENCE_STEPS
            .iter()
            .position(|s| s.contains("Jump"))
            .unwrap();
        assert!(vtor_idx < barrier_idx, "VTOR write must precede the barriers");
        assert!(barrier_idx < jump_idx, "barriers must precede the jump");
    }

    #[test]
    fn registers_named_in_the_map_are_the_ones_the_engine_owns() {
        // Guards against the register map and the engine drifting apart.
        assert_eq!(PLL0CON, 0x400F_C080);
        assert_eq!(PLL0FEED, 0x400F_C08C);
        assert_eq!(FLASHCFG, 0x400F_C000);
    }
}
