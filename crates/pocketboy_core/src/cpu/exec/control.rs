use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(super) fn exec_rst<B: Bus>(&mut self, bus: &mut B, vector: u8) {
        debug_assert!(vector & !0x38 == 0, "bad restart vector {vector:#04x}");
        let ret = self.regs.pc;
        self.push_u16(bus, ret);
        self.regs.pc = vector as u16;
    }

    pub(super) fn exec_reti<B: Bus>(&mut self, bus: &mut B) {
        self.regs.pc = self.pop_u16(bus);
        self.ime = true;
    }
}
