//! Integration test: simulates a complete boot-and-handoff run using mock
//! peripherals.
//!
//! Tests that:
//!   1. The full boot sequence ends in a jump with the stack pointer and
//!      entry point read from the user image's first two words
//!   2. The watchdog is fed, and armed with the handoff guard when asked
//!   3. Quiesce pins end low and the status LEDs show the alive pattern
//!   4. Diagnostic output (banner, entry report, jump line) all lands
//!      before the channel shutdown that precedes the clock transition
//!   5. A stuck PLL keeps the engine from ever retuning flash timing, and
//!      the armed guard expires at the configured tick count
//!   6. The simulated jump-return anomaly ends in a forced system reset
//!   7. The diagnostics-disabled build variant touches the image only for
//!      the two words the jump needs
//!
//! Does NOT require physical hardware.
//!
//! Run with: cargo test -p bootloader --test integration_boot_sequence

// Integration test file -- intentional test patterns permitted.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
)]

use bootloader::boot::{self, BootIo, ANOMALY_MESSAGE, BOOT_BANNER, JUMP_MESSAGE};
use platform::config::{STATUS_ALIVE, WATCHDOG_TIMEOUT_TICKS};
use platform::diag::NullSink;
use platform::handoff::{HandoffError, HandoffPhase};
use platform::image::BootTarget;
use platform::mocks::{MockPin, MockSink, MockWatchdog, SimulatedSystem, SysOp};
use platform::watchdog::WatchdogConfig;

const IMAGE_BASE: u32 = 0x0001_0000;
const IMAGE_SP: u32 = 0x1000_1000;
const IMAGE_ENTRY: u32 = 0x0001_0201; // Thumb bit set

fn image() -> SimulatedSystem {
    SimulatedSystem::with_image(IMAGE_BASE, &[IMAGE_SP, IMAGE_ENTRY])
}

fn pins<const N: usize>() -> [MockPin; N] {
    core::array::from_fn(|_| MockPin::new())
}

struct Harness {
    sim: SimulatedSystem,
    watchdog: MockWatchdog,
    status: [MockPin; 5],
    quiesce: [MockPin; 4],
    sink: MockSink,
}

impl Harness {
    fn new(sim: SimulatedSystem) -> Self {
        Self {
            sim,
            watchdog: MockWatchdog::new(),
            status: pins(),
            quiesce: [MockPin::high(), MockPin::high(), MockPin::high(), MockPin::high()],
            sink: MockSink::new(),
        }
    }

    fn run(&mut self, guard: Option<WatchdogConfig>) -> Result<(), HandoffError> {
        boot::run(
            BootIo {
                sys: &mut self.sim,
                watchdog: &mut self.watchdog,
                status_lines: &mut self.status,
                quiesce_pins: &mut self.quiesce,
                diag: &mut self.sink,
            },
            BootTarget::new(IMAGE_BASE),
            guard,
        )
    }

    fn run_stuck(&mut self, guard: Option<WatchdogConfig>, polls: u32) -> Result<(), HandoffError> {
        boot::run_with_poll_budget(
            BootIo {
                sys: &mut self.sim,
                watchdog: &mut self.watchdog,
                status_lines: &mut self.status,
                quiesce_pins: &mut self.quiesce,
                diag: &mut self.sink,
            },
            BootTarget::new(IMAGE_BASE),
            guard,
            polls,
        )
    }
}

// -- End-to-end handoff ----------------------------------------------------

/// The reference scenario: image at 0x00010000 with SP 0x10001000 and a
/// Thumb entry at 0x00010201 must be entered with exactly those values.
#[test]
fn full_boot_jumps_with_the_image_stack_and_entry() {
    let mut h = Harness::new(image());
    h.run(None).expect("simulated boot must complete");
    assert_eq!(h.sim.jumped(), Some((IMAGE_SP, IMAGE_ENTRY)));
}

#[test]
fn watchdog_is_fed_before_anything_else() {
    let mut h = Harness::new(image());
    h.run(None).unwrap();
    assert!(h.watchdog.feeds() >= 1, "boot must feed the power-on watchdog");
}

#[test]
fn guard_is_armed_only_when_requested() {
    let mut h = Harness::new(image());
    h.run(None).unwrap();
    assert_eq!(h.watchdog.armed(), None);

    let mut h = Harness::new(image());
    h.run(Some(WatchdogConfig::handoff_guard())).unwrap();
    assert_eq!(h.watchdog.armed(), Some(WatchdogConfig::handoff_guard()));
}

#[test]
fn quiesce_pins_are_low_and_leds_show_alive() {
    let mut h = Harness::new(image());
    h.run(None).unwrap();
    assert!(h.quiesce.iter().all(|p| !p.is_high()), "heater lines must be off");
    for (bit, led) in h.status.iter().enumerate() {
        assert_eq!(led.is_high(), STATUS_ALIVE & (1 << bit) != 0);
    }
}

// -- Diagnostic channel ----------------------------------------------------

#[test]
fn boot_messages_precede_the_channel_shutdown() {
    let mut h = Harness::new(image());
    h.run(None).unwrap();

    let written = h.sink.written();
    let banner_end = BOOT_BANNER.len();
    assert_eq!(&written[..banner_end], BOOT_BANNER);

    let as_text = core::str::from_utf8(written).unwrap();
    assert!(as_text.contains("Jumping to 0x00010201"), "entry report missing: {as_text}");

    let shutdown_at = h.sink.written_at_shutdown().expect("channel must be shut down");
    let jump_line_end = as_text.find("Jump!\n").unwrap() + JUMP_MESSAGE.len();
    assert!(jump_line_end <= shutdown_at, "jump line must be out before shutdown");
    assert!(h.sink.flushes() >= 1, "channel must drain before shutdown");
}

/// The jump "returning" is simulated by the mock; the boot path must then
/// restart the channel, report the anomaly, and force a reset.
#[test]
fn simulated_jump_return_forces_a_system_reset() {
    let mut h = Harness::new(image());
    h.run(None).unwrap();

    assert_eq!(h.sink.restarts(), 1);
    let as_text = core::str::from_utf8(h.sink.written()).unwrap();
    assert!(as_text.ends_with(core::str::from_utf8(ANOMALY_MESSAGE).unwrap()));
    assert!(h.sim.reset_requested());

    // The anomaly tail follows the jump in the operation log.
    let ops = h.sim.ops();
    let jump_idx = ops.iter().position(|op| matches!(op, SysOp::Jump { .. })).unwrap();
    assert!(matches!(ops[ops.len() - 1], SysOp::SystemReset));
    assert!(jump_idx < ops.len() - 1);
}

// -- Stuck PLL / liveness --------------------------------------------------

#[test]
fn stuck_pll_never_reaches_flash_retiming() {
    let mut h = Harness::new(image().stuck_pll());
    let err = h.run_stuck(Some(WatchdogConfig::handoff_guard()), 128).unwrap_err();
    assert_eq!(
        err,
        HandoffError::PollBudgetExhausted {
            phase: HandoffPhase::PllDisconnectRequested
        }
    );
    assert!(
        !h.sim.ops().iter().any(|op| matches!(op, SysOp::FlashConfigWrite(_))),
        "flash timing must not change while the PLL reports connected"
    );
    assert!(h.sim.jumped().is_none());
}

#[test]
fn armed_guard_expires_while_the_engine_spins() {
    let mut h = Harness::new(image().stuck_pll());
    let _ = h.run_stuck(Some(WatchdogConfig::handoff_guard()), 128);

    // Nothing feeds after arming, so the reset lands at the timeout.
    assert!(!h.watchdog.expired_after(WATCHDOG_TIMEOUT_TICKS - 1));
    assert!(h.watchdog.expired_after(WATCHDOG_TIMEOUT_TICKS));
}

#[test]
fn unarmed_stuck_boot_hangs_with_no_escape() {
    let mut h = Harness::new(image().stuck_pll());
    let _ = h.run_stuck(None, 128);
    // The liveness gap is real: no reset, no jump, nothing left to fire.
    assert!(!h.sim.reset_requested());
    assert!(h.sim.jumped().is_none());
    assert!(!h.watchdog.expired_after(u32::MAX));
}

// -- Diagnostics-disabled variant ------------------------------------------

#[test]
fn null_sink_boot_reads_only_the_two_jump_words() {
    let mut sim = image();
    let mut watchdog = MockWatchdog::new();
    let mut status: [MockPin; 5] = pins();
    let mut quiesce: [MockPin; 4] = pins();
    let mut diag = NullSink;

    boot::run(
        BootIo {
            sys: &mut sim,
            watchdog: &mut watchdog,
            status_lines: &mut status,
            quiesce_pins: &mut quiesce,
            diag: &mut diag,
        },
        BootTarget::new(IMAGE_BASE),
        None,
    )
    .unwrap();

    let reads: Vec<u32> = sim
        .ops()
        .iter()
        .filter_map(|op| match op {
            SysOp::ImageRead(addr) => Some(*addr),
            _ => None,
        })
        .collect();
    assert_eq!(reads, vec![IMAGE_BASE, IMAGE_BASE + 4]);
    assert_eq!(sim.jumped(), Some((IMAGE_SP, IMAGE_ENTRY)));
}

/// With the real sink the entry report adds one extra read of base+4; the
/// jump itself still reads only the two vector words.
#[test]
fn diagnostic_entry_report_reads_only_the_entry_word() {
    let mut h = Harness::new(image());
    h.run(None).unwrap();
    let reads: Vec<u32> = h
        .sim
        .ops()
        .iter()
        .filter_map(|op| match op {
            SysOp::ImageRead(addr) => Some(*addr),
            _ => None,
        })
        .collect();
    assert_eq!(reads, vec![IMAGE_BASE + 4, IMAGE_BASE, IMAGE_BASE + 4]);
}
