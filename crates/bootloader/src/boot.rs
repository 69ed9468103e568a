//! Boot orchestration.
//!
//! The whole flow is generic over the platform capabilities so it runs
//! unmodified against the simulated register file in host tests; `main`
//! instantiates it with the memory-mapped hardware layer. Initialization
//! order (MUST be respected — order matters for correctness):
//!
//!   1. Feed the watchdog — a counter from the power-on state may already
//!      be running when we get control
//!   2. Quiesce the actuator lines before anything can go wrong
//!   3. Status LEDs to the alive pattern
//!   4. Diagnostics up, banner out
//!   5. Arm the reset-on-expiry guard (build-time optional)
//!   6. Report the image entry vector, drain, shut the channel down —
//!      the handoff kills the peripheral clock, and cutting it mid-frame
//!      corrupts the byte on the wire
//!   7. Run the clock transition engine; it does not come back
//!   8. If it does come back, that is a hardware anomaly: restart
//!      diagnostics, say so, drain, and force a full system reset

use embedded_hal::digital::OutputPin;
use embedded_io::Write;

use platform::config::{ANOMALY_RESET_DELAY, STATUS_ALIVE, STATUS_LINE_COUNT};
use platform::diag::{write_hex, DiagnosticSink};
use platform::handoff::{ClockHandoff, HandoffError};
use platform::image::BootTarget;
use platform::indicator::{quiesce_outputs, set_status};
use platform::sysctl::SystemControl;
use platform::watchdog::{WatchdogConfig, WatchdogTimer};

/// Ordered list of boot sequence steps for documentation and testing.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. Watchdog: feed before any other hardware access",
    "2. Quiesce: actuator-disable lines P2.4-P2.7 driven low",
    "3. Status: indicator LEDs to the alive pattern",
    "4. Diagnostics: UART0 up at 2 Mbaud, boot banner out",
    "5. Watchdog: arm the reset-on-expiry guard (watchdog builds only)",
    "6. Diagnostics: entry vector report, drain, channel shutdown",
    "7. Handoff: clock transition engine runs and jumps to the user image",
    "8. Anomaly: a returned jump restarts diagnostics and forces a reset",
];

/// First line on the diagnostic channel.
pub const BOOT_BANNER: &[u8] = b"Bootloader Start\n";
/// Prefix of the entry-vector report.
pub const ENTRY_REPORT_PREFIX: &[u8] = b"Jumping to ";
/// Last line before the channel shuts down.
pub const JUMP_MESSAGE: &[u8] = b"Jump!\n";
/// Emitted only on the jump-return anomaly path.
pub const ANOMALY_MESSAGE: &[u8] = b"This should never happen\n";

/// The capabilities the boot sequence drives.
///
/// `sys` is owned: once the handoff engine exists nothing else may touch
/// the clock registers. The rest are borrowed peripherals.
pub struct BootIo<'a, S, W, P, Q, D> {
    /// Clock/system register capability, consumed by the engine.
    pub sys: S,
    /// Watchdog timer.
    pub watchdog: &'a mut W,
    /// The five indicator lines, pattern bit 0 first.
    pub status_lines: &'a mut [P; STATUS_LINE_COUNT],
    /// Actuator lines to park low before the transition.
    pub quiesce_pins: &'a mut [Q],
    /// Boot-message channel (the real UART or the inert sink).
    pub diag: &'a mut D,
}

/// Run the boot sequence against `io`, handing off to `target`.
///
/// Arms the watchdog with `guard` when it is `Some` (the `watchdog`
/// build). On hardware this returns only through the anomaly path, and
/// that path ends in a system reset; the `Result` exists for the host
/// tests, which run the engine under a poll budget via
/// [`run_with_poll_budget`].
pub fn run<S, W, P, Q, D>(
    io: BootIo<'_, S, W, P, Q, D>,
    target: BootTarget,
    guard: Option<WatchdogConfig>,
) -> Result<(), HandoffError>
where
    S: SystemControl,
    W: WatchdogTimer,
    P: OutputPin,
    Q: OutputPin,
    D: DiagnosticSink,
{
    run_inner(io, target, guard, None)
}

/// [`run`] with every engine status poll bounded to `polls` reads.
///
/// Host-test seam only — see `ClockHandoff::with_poll_budget`. The
/// hardware entry point never bounds the polls.
pub fn run_with_poll_budget<S, W, P, Q, D>(
    io: BootIo<'_, S, W, P, Q, D>,
    target: BootTarget,
    guard: Option<WatchdogConfig>,
    polls: u32,
) -> Result<(), HandoffError>
where
    S: SystemControl,
    W: WatchdogTimer,
    P: OutputPin,
    Q: OutputPin,
    D: DiagnosticSink,
{
    run_inner(io, target, guard, Some(polls))
}

fn run_inner<S, W, P, Q, D>(
    io: BootIo<'_, S, W, P, Q, D>,
    target: BootTarget,
    guard: Option<WatchdogConfig>,
    poll_budget: Option<u32>,
) -> Result<(), HandoffError>
where
    S: SystemControl,
    W: WatchdogTimer,
    P: OutputPin,
    Q: OutputPin,
    D: DiagnosticSink,
{
    let BootIo {
        mut sys,
        watchdog,
        status_lines,
        quiesce_pins,
        diag,
    } = io;

    watchdog.feed();

    // Indicator and quiesce lines are fire-and-forget; the pin drivers are
    // infallible on this hardware.
    let _ = quiesce_outputs(quiesce_pins);
    let _ = set_status(status_lines, STATUS_ALIVE);

    let _ = diag.write_all(BOOT_BANNER);

    if let Some(config) = guard {
        watchdog.arm(config);
    }

    if D::ENABLED {
        let entry = sys.read_image_word(target.entry_point_address());
        let _ = diag.write_all(ENTRY_REPORT_PREFIX);
        let _ = write_hex(&mut *diag, entry);
        let _ = diag.write_all(b"\n");
    }

    let _ = diag.write_all(JUMP_MESSAGE);
    let _ = diag.flush();
    diag.shutdown();

    let mut engine = ClockHandoff::new(&mut sys);
    if let Some(polls) = poll_budget {
        engine = engine.with_poll_budget(polls);
    }
    engine.run(target)?;

    // The jump came back — hardware anomaly. Report it and take the one
    // recovery path left: a full reset from the earliest known-good state.
    diag.restart();
    let _ = diag.write_all(ANOMALY_MESSAGE);
    let _ = diag.flush();
    sys.settle_delay(ANOMALY_RESET_DELAY);
    sys.system_reset();
    Ok(())
}
