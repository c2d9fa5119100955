use crate::cpu::boot::BOOT_OFF_ADDR;
use crate::cpu::instruction::{Indirect, Reg8};
use crate::cpu::{Bus, Cpu, LY_ADDR, LY_SPOOF_VALUE};

impl Cpu {
    pub(super) fn exec_ld<B: Bus>(&mut self, bus: &mut B, dst: Reg8, src: Reg8) {
        let value = self.read_reg8(bus, src);
        self.write_reg8(bus, dst, value);
    }

    pub(super) fn exec_store_a<B: Bus>(&mut self, bus: &mut B, dst: Indirect) {
        let addr = self.indirect_address(dst);
        bus.write8(addr, self.regs.a);
    }

    pub(super) fn exec_load_a<B: Bus>(&mut self, bus: &mut B, src: Indirect) {
        let addr = self.indirect_address(src);
        self.regs.a = bus.read8(addr);
    }

    /// `LDH (a8),A`.
    ///
    /// A write to 0xFF50 while the boot overlay is active first puts the
    /// cartridge bytes back under 0x0000–0x00FF. Only this immediate form
    /// retires the overlay.
    pub(super) fn exec_ldh_store<B: Bus>(&mut self, bus: &mut B, offset: u8) {
        if 0xFF00 | offset as u16 == BOOT_OFF_ADDR {
            self.retire_boot_overlay(bus);
        }
        self.store_io(bus, offset);
    }

    /// `LD (C),A`.
    pub(super) fn exec_ldh_store_c<B: Bus>(&mut self, bus: &mut B) {
        self.store_io(bus, self.regs.c);
    }

    fn store_io<B: Bus>(&self, bus: &mut B, offset: u8) {
        bus.write8(0xFF00 | offset as u16, self.regs.a);
    }

    /// `LDH A,(a8)`. LY reads are answered with a constant when the shim is
    /// enabled, so boot code waiting for vertical blank can proceed without
    /// a display.
    pub(super) fn exec_ldh_load<B: Bus>(&mut self, bus: &mut B, offset: u8) {
        let addr = 0xFF00 | offset as u16;
        self.regs.a = if addr == LY_ADDR && self.config.spoof_ly {
            LY_SPOOF_VALUE
        } else {
            bus.read8(addr)
        };
    }

    pub(super) fn exec_ld_hl_sp_offset(&mut self, offset: u8) {
        let value = self.alu_add16_signed(self.regs.sp, offset);
        self.regs.set_hl(value);
    }
}
