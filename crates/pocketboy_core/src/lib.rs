//! SM83 (Game Boy) CPU core.
//!
//! [`cpu::Cpu`] executes one instruction per step against any [`cpu::Bus`].
//! [`memory::AddressSpace`] is the flat 64 KiB store with observers and a
//! write log, [`machine::GameBoy`] wires both to a timer and dispatches
//! interrupts, and [`session::TesterSession`] exposes the step-and-compare
//! interface used by conformance testers.

pub mod cpu;
pub mod error;
pub mod machine;
pub mod memory;
pub mod session;

pub use cpu::{Cpu, CpuConfig};
pub use error::{CpuError, DecodeError};
pub use machine::{GameBoy, MachineConfig};
pub use memory::AddressSpace;
pub use session::{CpuState, TesterSession};
