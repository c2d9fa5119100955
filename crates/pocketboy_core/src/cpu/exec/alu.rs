use crate::cpu::instruction::{AluOp, Reg16, Reg8, ShiftOp};
use crate::cpu::{Bus, Cpu, Flag};

impl Cpu {
    pub(super) fn exec_alu<B: Bus>(&mut self, bus: &mut B, op: AluOp, src: Reg8) {
        let value = self.read_reg8(bus, src);
        self.alu_op(op, value);
    }

    pub(super) fn exec_add_hl(&mut self, src: Reg16) {
        let value = self.read_reg16(src);
        self.alu_add16_hl(value);
    }

    pub(super) fn exec_add_sp_offset(&mut self, offset: u8) {
        self.regs.sp = self.alu_add16_signed(self.regs.sp, offset);
    }

    /// RLCA/RRCA/RLA/RRA: same as the prefixed forms on A, except Z is
    /// always cleared.
    pub(super) fn exec_rotate_a(&mut self, op: ShiftOp) {
        self.regs.a = self.alu_shift(op, self.regs.a);
        self.set_flag(Flag::Z, false);
    }

    pub(super) fn exec_cpl(&mut self) {
        self.regs.a = !self.regs.a;
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, true);
    }

    pub(super) fn exec_scf(&mut self) {
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, true);
    }

    pub(super) fn exec_ccf(&mut self) {
        let carry = self.get_flag(Flag::C);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, !carry);
    }
}
