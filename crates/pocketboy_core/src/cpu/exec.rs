mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

use super::instruction::{Instruction, ShiftOp};
use super::{Bus, Cpu};

impl Cpu {
    /// Execute a decoded instruction.
    ///
    /// PC already points at the next instruction and `operand` holds the
    /// immediate byte or word (zero when there is none). Returns whether a
    /// conditional control transfer was taken.
    pub(super) fn execute<B: Bus>(
        &mut self,
        bus: &mut B,
        instruction: Instruction,
        operand: u16,
    ) -> bool {
        use Instruction::*;

        let imm8 = operand as u8;
        match instruction {
            Nop => {}
            Stop => self.exec_stop(),
            Halt => self.exec_halt(),
            Di => self.exec_di(),
            Ei => self.exec_ei(),

            Ld { dst, src } => self.exec_ld(bus, dst, src),
            LdImm8 { dst } => self.write_reg8(bus, dst, imm8),
            LdImm16 { dst } => self.write_reg16(dst, operand),
            StoreA { dst } => self.exec_store_a(bus, dst),
            LoadA { src } => self.exec_load_a(bus, src),
            StoreSp => bus.write16(operand, self.regs.sp),
            LdhStore => self.exec_ldh_store(bus, imm8),
            LdhLoad => self.exec_ldh_load(bus, imm8),
            LdhStoreC => self.exec_ldh_store_c(bus),
            LdhLoadC => self.regs.a = bus.read8(0xFF00 | self.regs.c as u16),
            StoreAbs => bus.write8(operand, self.regs.a),
            LoadAbs => self.regs.a = bus.read8(operand),
            LdHlSpOffset => self.exec_ld_hl_sp_offset(imm8),
            LdSpHl => self.regs.sp = self.regs.hl(),

            Alu { op, src } => self.exec_alu(bus, op, src),
            AluImm { op } => self.alu_op(op, imm8),
            Inc { reg } => self.exec_inc8(bus, reg),
            Dec { reg } => self.exec_dec8(bus, reg),
            Inc16 { reg } => self.exec_inc16(reg),
            Dec16 { reg } => self.exec_dec16(reg),
            AddHl { src } => self.exec_add_hl(src),
            AddSpOffset => self.exec_add_sp_offset(imm8),
            Rlca => self.exec_rotate_a(ShiftOp::Rlc),
            Rrca => self.exec_rotate_a(ShiftOp::Rrc),
            Rla => self.exec_rotate_a(ShiftOp::Rl),
            Rra => self.exec_rotate_a(ShiftOp::Rr),
            Daa => self.alu_daa(),
            Cpl => self.exec_cpl(),
            Scf => self.exec_scf(),
            Ccf => self.exec_ccf(),

            Jr => return self.jr(imm8, true),
            JrIf(cond) => return self.jr(imm8, self.condition(cond)),
            Jp => return self.jp(operand, true),
            JpIf(cond) => return self.jp(operand, self.condition(cond)),
            JpHl => self.regs.pc = self.regs.hl(),
            Call => return self.call(bus, operand, true),
            CallIf(cond) => {
                let taken = self.condition(cond);
                return self.call(bus, operand, taken);
            }
            Ret => return self.ret(bus, true),
            RetIf(cond) => {
                let taken = self.condition(cond);
                return self.ret(bus, taken);
            }
            Reti => self.exec_reti(bus),
            Rst(vector) => self.exec_rst(bus, vector),
            Push(pair) => self.exec_push(bus, pair),
            Pop(pair) => self.exec_pop(bus, pair),

            Shift { op, reg } => self.exec_shift(bus, op, reg),
            Bit { bit, reg } => self.exec_bit(bus, bit, reg),
            Res { bit, reg } => self.exec_res(bus, bit, reg),
            Set { bit, reg } => self.exec_set(bus, bit, reg),
        }
        false
    }
}
