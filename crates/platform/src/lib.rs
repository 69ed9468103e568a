//! Hardware abstraction layer for the LPC1768 first-stage bootloader.
//!
//! This crate holds everything about the boot handoff that does not need an
//! ARM target to run: the register map, the clock transition engine, the
//! boot-image types, the indicator/quiesce helpers, the diagnostic sink
//! types, the watchdog model, and the fault class table. The bootloader
//! crate supplies the memory-mapped implementations; host tests substitute
//! the mocks.
//!
//! # Architecture Layers
//!
//! ```text
//! Boot orchestration (bootloader crate)
//!         ↓
//! Platform layer (this crate - traits + pure register math)
//!         ↓
//! Hardware layer (bootloader::hal - volatile writes, asm barriers, jump)
//! ```
//!
//! # Features
//!
//! - `std`: expose [`mocks`] to downstream test crates
//! - `defmt`: enable defmt::Format derives on all platform types

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// Pedantic lints suppressed for this hardware crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod diag;
pub mod fault;
pub mod handoff;
pub mod image;
pub mod indicator;
pub mod lpc17xx;
pub mod sysctl;
pub mod watchdog;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export the boot-path surface
pub use diag::{baud_divisors, BaudError, DiagnosticSink, NullSink, UartDivisors};
pub use fault::FaultClass;
pub use handoff::{
    vector_table_base, ClockHandoff, HandoffError, HandoffPhase, HANDOFF_SEQUENCE_STEPS,
};
pub use image::{BootTarget, VectorTable};
pub use indicator::{quiesce_outputs, set_status};
pub use sysctl::SystemControl;
pub use watchdog::{WatchdogConfig, WatchdogTimer, WdtClockSource};
