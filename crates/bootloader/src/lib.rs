//! LPC1768 first-stage bootloader.
//!
//! Brings the chip down to a known clock state and hands execution to the
//! user image at `USER_FLASH_START`, permanently. The interesting part is
//! the ordered, irreversible clock transition in `platform::handoff`; this
//! crate contributes the boot orchestration, the memory-mapped hardware
//! layer, and the fault trap.
//!
//! # Architecture
//!
//! ```text
//! Boot orchestration (boot module — host-testable, generic over traits)
//!         ↓
//! Platform layer (platform crate — engine, register math, mocks)
//!         ↓
//! Hardware layer (hal module — volatile writes, barriers, the jump)
//! ```
//!
//! # Features
//!
//! - `hardware` - build for the LPC1768 target (cortex-m, cortex-m-rt)
//! - `diagnostics` - compile the UART0 boot-message channel in
//! - `watchdog` - arm the reset-on-expiry guard before the handoff
//!
//! # Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7m-none-eabi --features hardware,diagnostics,watchdog
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// Intentional allows for this crate:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)] // register names and hex addresses in docs
#![allow(clippy::must_use_candidate)]

pub mod boot;
pub mod exception_handlers;

#[cfg(feature = "hardware")]
pub mod hal;

pub use boot::{BootIo, BOOT_SEQUENCE_STEPS};
