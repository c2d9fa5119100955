use super::decode::{decode, PREFIX_BYTE};
use super::instruction::{Instruction, OperandKind, ShiftOp};
use super::{Bus, Cpu, PrefixedCoverage, StopLength};
use crate::error::CpuError;

impl Cpu {
    /// Fetch, decode and execute one instruction at PC.
    ///
    /// Operands are read at PC+1 (and PC+2), PC advances by the encoded
    /// length unless the instruction jumps, and the return value is the
    /// cost in machine cycles. HALT state is not consulted.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        self.cycles = 0;

        let pc = self.regs.pc;
        let (opcode, prefixed) = match bus.read8(pc) {
            PREFIX_BYTE => (bus.read8(pc.wrapping_add(1)), true),
            opcode => (opcode, false),
        };

        let instruction = decode(opcode, prefixed).map_err(|source| {
            self.log_fatal(&source.to_string(), pc);
            CpuError::Decode { source, pc }
        })?;
        self.ensure_supported(instruction, pc)?;

        let operand = match instruction.operand() {
            OperandKind::None => 0,
            OperandKind::Byte => bus.read8(pc.wrapping_add(1)) as u16,
            OperandKind::Word => bus.read16(pc.wrapping_add(1)),
        };
        log::trace!(
            "0x{pc:04X}: {instruction} (operand=0x{operand:04X}) AF=0x{af:04X} BC=0x{bc:04X} DE=0x{de:04X} HL=0x{hl:04X} SP=0x{sp:04X}",
            af = self.regs.af(),
            bc = self.regs.bc(),
            de = self.regs.de(),
            hl = self.regs.hl(),
            sp = self.regs.sp,
        );

        self.regs.pc = pc.wrapping_add(self.encoded_length(instruction));
        let taken = self.execute(bus, instruction, operand);

        let timing = instruction.timing();
        let cost = if taken { timing.taken } else { timing.base };
        self.cycles += u32::from(cost);
        Ok(self.cycles)
    }

    fn encoded_length(&self, instruction: Instruction) -> u16 {
        match instruction {
            Instruction::Stop if self.config.stop_length == StopLength::OneByte => 1,
            _ => instruction.length(),
        }
    }

    fn ensure_supported(&self, instruction: Instruction, pc: u16) -> Result<(), CpuError> {
        let supported = match self.config.prefixed {
            PrefixedCoverage::Full => true,
            PrefixedCoverage::BitAndRotateOnly => match instruction {
                Instruction::Bit { .. } => true,
                Instruction::Shift { op, .. } => op == ShiftOp::Rl,
                other => !other.is_prefixed(),
            },
        };
        if supported {
            return Ok(());
        }
        let name = instruction.diagnostic_name();
        self.log_fatal(&format!("unimplemented instruction {name}"), pc);
        Err(CpuError::Unimplemented {
            instruction: name,
            pc,
        })
    }

    fn log_fatal(&self, what: &str, pc: u16) {
        log::error!(
            "CPU halted: {what} at PC=0x{pc:04X} (SP=0x{sp:04X} AF=0x{af:04X} BC=0x{bc:04X} DE=0x{de:04X} HL=0x{hl:04X})",
            sp = self.regs.sp,
            af = self.regs.af(),
            bc = self.regs.bc(),
            de = self.regs.de(),
            hl = self.regs.hl(),
        );
    }
}
