//! Status indicator and actuator quiesce helpers.
//!
//! Both are fire-and-forget GPIO sweeps over [`embedded_hal::digital::OutputPin`]:
//! the lines are never read back and take part in no protocol. The hardware
//! pin driver configures each line as an output before the boot path calls
//! in here.

use embedded_hal::digital::OutputPin;

use crate::config::STATUS_LINE_COUNT;

/// Drive indicator line *i* high iff bit *i* of `pattern` is set.
///
/// Bits above the line count are ignored.
pub fn set_status<P: OutputPin>(
    lines: &mut [P; STATUS_LINE_COUNT],
    pattern: u8,
) -> Result<(), P::Error> {
    for (bit, line) in lines.iter_mut().enumerate() {
        if pattern & (1 << bit) != 0 {
            line.set_high()?;
        } else {
            line.set_low()?;
        }
    }
    Ok(())
}

/// Drive every pin low, putting the attached actuators in their safe state.
///
/// Runs before any clock change so the lines hold a known level regardless
/// of whether the handoff succeeds.
pub fn quiesce_outputs<P: OutputPin>(pins: &mut [P]) -> Result<(), P::Error> {
    for pin in pins {
        pin.set_low()?;
    }
    Ok(())
}
