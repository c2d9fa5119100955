use crate::cpu::instruction::{Reg16, Reg8};
use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(super) fn exec_inc8<B: Bus>(&mut self, bus: &mut B, reg: Reg8) {
        let value = self.read_reg8(bus, reg);
        let result = self.alu_inc8(value);
        self.write_reg8(bus, reg, result);
    }

    pub(super) fn exec_dec8<B: Bus>(&mut self, bus: &mut B, reg: Reg8) {
        let value = self.read_reg8(bus, reg);
        let result = self.alu_dec8(value);
        self.write_reg8(bus, reg, result);
    }

    /// 16-bit increments leave the flags alone.
    pub(super) fn exec_inc16(&mut self, reg: Reg16) {
        let value = self.read_reg16(reg).wrapping_add(1);
        self.write_reg16(reg, value);
    }

    pub(super) fn exec_dec16(&mut self, reg: Reg16) {
        let value = self.read_reg16(reg).wrapping_sub(1);
        self.write_reg16(reg, value);
    }
}
