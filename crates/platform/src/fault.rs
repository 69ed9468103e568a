//! Hardware fault classes and their diagnostic reports.
//!
//! A fault during bring-up is unrecoverable by definition: the handler
//! cannot trust the machine state that produced it, and continuing risks
//! further hardware damage. Every handler therefore reports its class over
//! the diagnostic sink (when built in) and halts forever. The halt itself
//! lives in the bootloader's exception handlers; this module owns the
//! class table and the report so both are host-testable.

use embedded_io::Write;

use crate::diag::DiagnosticSink;

/// The five fault classes the bootloader traps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultClass {
    /// Non-maskable interrupt.
    NonMaskableInterrupt,
    /// Escalated or direct hard fault.
    HardFault,
    /// Memory-management fault.
    MemoryManagement,
    /// Bus fault.
    BusFault,
    /// Usage fault (undefined instruction, invalid state, …).
    UsageFault,
}

impl FaultClass {
    /// Every trapped class, in vector-table order.
    pub const ALL: [FaultClass; 5] = [
        FaultClass::NonMaskableInterrupt,
        FaultClass::HardFault,
        FaultClass::MemoryManagement,
        FaultClass::BusFault,
        FaultClass::UsageFault,
    ];

    /// The diagnostic line for this class.
    #[must_use]
    pub const fn message(self) -> &'static [u8] {
        match self {
            FaultClass::NonMaskableInterrupt => b"NMI\n",
            FaultClass::HardFault => b"HardFault\n",
            FaultClass::MemoryManagement => b"MemManage\n",
            FaultClass::BusFault => b"BusFault\n",
            FaultClass::UsageFault => b"UsageFault\n",
        }
    }
}

/// Emit the fault line and drain it.
///
/// This is the last observable action before the handler halts: the drain
/// matters because the halt loop never comes back to flush the FIFO.
pub fn report<W: DiagnosticSink>(sink: &mut W, class: FaultClass) -> Result<(), W::Error> {
    sink.write_all(class.message())?;
    sink.flush()
}
