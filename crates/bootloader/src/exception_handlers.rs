//! Cortex-M exception handlers — the fault trap.
//!
//! A fault during bring-up is unrecoverable: the handler cannot trust the
//! state of the machine that raised it, and pressing on risks corrupting
//! the very flash image we are about to jump into. Each handler therefore
//! reports its fault class over the diagnostic channel (when compiled in)
//! and halts forever. The halt is the terminal state, not a bug — only a
//! reset (or the armed watchdog) gets the chip out of it.
//!
//! # Hardware-only handlers
//!
//! The `#[cortex_m_rt::exception]` attribute requires the ARM target and is
//! gated behind `feature = "hardware"`. The module itself (and
//! [`FAULT_HANDLERS_DEFINED`]) compiles unconditionally so host tests can
//! verify the trap exists without an ARM toolchain.

/// Marker constant — confirmed by host tests to verify this module exists.
///
/// When `FAULT_HANDLERS_DEFINED` is `true`, the handlers in the
/// `#[cfg(feature = "hardware")]` block below will be linked into the
/// bootloader binary, one per class in `platform::fault::FaultClass::ALL`.
pub const FAULT_HANDLERS_DEFINED: bool = true;

#[cfg(feature = "hardware")]
mod handlers {
    use cortex_m_rt::exception;
    use platform::fault::FaultClass;

    /// Report the fault class, then halt forever.
    ///
    /// Returning from a fault handler to the interrupted boot flow would
    /// resume a machine in unknown state; the `-> !` makes that impossible.
    fn trap(class: FaultClass) -> ! {
        #[cfg(feature = "diagnostics")]
        {
            // SAFETY: fault context. The interrupted flow owned the channel
            // but never resumes, so the stolen handle is the only live one.
            let mut sink = unsafe { crate::hal::Uart0::steal() };
            let _ = platform::fault::report(&mut sink, class);
        }
        #[cfg(not(feature = "diagnostics"))]
        let _ = class;

        loop {
            cortex_m::asm::nop();
        }
    }

    #[exception]
    fn NMI() {
        trap(FaultClass::NonMaskableInterrupt)
    }

    #[exception]
    unsafe fn HardFault(_frame: &cortex_m_rt::ExceptionFrame) -> ! {
        trap(FaultClass::HardFault)
    }

    #[exception]
    fn MemoryManagement() {
        trap(FaultClass::MemoryManagement)
    }

    #[exception]
    fn BusFault() {
        trap(FaultClass::BusFault)
    }

    #[exception]
    fn UsageFault() {
        trap(FaultClass::UsageFault)
    }
}

#[cfg(test)]
mod tests {
    use platform::fault::FaultClass;

    #[test]
    fn fault_trap_module_is_present() {
        assert!(super::FAULT_HANDLERS_DEFINED);
    }

    #[test]
    fn one_handler_per_fault_class() {
        // The handlers above are written one per class; this pins the class
        // count so adding a class forces a handler (or a conscious skip).
        assert_eq!(FaultClass::ALL.len(), 5);
    }
}
