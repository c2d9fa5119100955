mod alu;
mod boot;
mod bus;
mod cb;
mod decode;
mod exec;
mod helpers;
mod init;
mod instruction;
mod interrupts;
mod regs;
mod step;

pub use boot::{BOOT_OFF_ADDR, BOOT_OVERLAY_LEN};
pub use bus::Bus;
pub use decode::{decode, PREFIX_BYTE};
pub use instruction::{
    AluOp, Cond, Indirect, Instruction, OperandKind, Reg16, Reg8, ShiftOp, StackPair, Timing,
};
pub use interrupts::{Interrupts, IE_ADDR, IF_ADDR, INTERRUPT_DISPATCH_CYCLES};
pub use regs::{Flag, Flags, Registers};

use typed_builder::TypedBuilder;

/// Scanline register read by boot code while it waits for vertical blank.
pub const LY_ADDR: u16 = 0xFF44;
/// Value reported for `LDH A,(0x44)` when the LY shim is enabled.
pub const LY_SPOOF_VALUE: u8 = 0x90;

/// Which operand the non-carry `SUB` subtracts from A.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubOperand {
    /// Subtract the decoded operand (hardware behaviour).
    #[default]
    Operand,
    /// Compute flags from the operand but always subtract register B.
    ///
    /// Reproduces a long-standing quirk of one reference core so traces
    /// can be diffed against it.
    RegisterB,
}

/// How much of the prefixed table the executor accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrefixedCoverage {
    #[default]
    Full,
    /// Only `BIT b,r` and `RL r`; everything else reports
    /// [`crate::CpuError::Unimplemented`].
    BitAndRotateOnly,
}

/// How far `STOP` advances PC.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopLength {
    /// Opcode plus the padding byte, as on hardware.
    #[default]
    TwoBytes,
    /// Opcode only; the padding byte executes as the next instruction.
    OneByte,
}

/// CPU behaviour switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TypedBuilder)]
pub struct CpuConfig {
    #[builder(default)]
    pub sub_operand: SubOperand,
    /// Report [`LY_SPOOF_VALUE`] for `LDH A,(0x44)` instead of reading memory.
    #[builder(default = true)]
    pub spoof_ly: bool,
    #[builder(default)]
    pub prefixed: PrefixedCoverage,
    #[builder(default)]
    pub stop_length: StopLength,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Game Boy CPU core.
///
/// Executes one instruction per [`Cpu::step`] against any [`Bus`]. The
/// engine does not service interrupts on its own; the embedding loop calls
/// [`Cpu::service_interrupt`] between steps.
#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    pub ime: bool,
    /// Set by HALT and STOP. `step` does not consult it; the embedding loop
    /// decides whether to keep stepping.
    pub halted: bool,
    config: CpuConfig,
    boot_overlay: Option<boot::BootOverlay>,
    /// Machine cycles consumed by the current step.
    cycles: u32,
}

impl Cpu {
    #[inline]
    pub fn get_flag(&self, flag: Flag) -> bool {
        self.regs.f.get(flag)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        self.regs.f.set(flag, value);
    }

    #[inline]
    pub fn clear_flags(&mut self) {
        self.regs.f = Flags::default();
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    /// Machine cycles consumed by the most recent step.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }
}

#[cfg(test)]
mod tests;
