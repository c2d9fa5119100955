use super::instruction::{Reg8, ShiftOp};
use super::{Bus, Cpu, Flag};

impl Cpu {
    /// RLC/RRC/RL/RR/SLA/SRA/SWAP/SRL on a register or (HL).
    pub(super) fn exec_shift<B: Bus>(&mut self, bus: &mut B, op: ShiftOp, reg: Reg8) {
        let value = self.read_reg8(bus, reg);
        let result = self.alu_shift(op, value);
        self.write_reg8(bus, reg, result);
    }

    /// BIT b,r: Z reflects the tested bit, N=0, H=1, C is preserved.
    pub(super) fn exec_bit<B: Bus>(&mut self, bus: &mut B, bit: u8, reg: Reg8) {
        let value = self.read_reg8(bus, reg);
        self.set_flag(Flag::Z, value & (1 << bit) == 0);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, true);
    }

    pub(super) fn exec_res<B: Bus>(&mut self, bus: &mut B, bit: u8, reg: Reg8) {
        let value = self.read_reg8(bus, reg);
        self.write_reg8(bus, reg, value & !(1 << bit));
    }

    pub(super) fn exec_set<B: Bus>(&mut self, bus: &mut B, bit: u8, reg: Reg8) {
        let value = self.read_reg8(bus, reg);
        self.write_reg8(bus, reg, value | (1 << bit));
    }
}
