use super::instruction::{Cond, Indirect, Reg16, Reg8, StackPair};
use super::{Bus, Cpu, Flag};

impl Cpu {
    /// Read an 8-bit register, or memory at HL for `(HL)`.
    #[inline]
    pub(super) fn read_reg8<B: Bus>(&mut self, bus: &mut B, reg: Reg8) -> u8 {
        match reg {
            Reg8::B => self.regs.b,
            Reg8::C => self.regs.c,
            Reg8::D => self.regs.d,
            Reg8::E => self.regs.e,
            Reg8::H => self.regs.h,
            Reg8::L => self.regs.l,
            Reg8::HlInd => bus.read8(self.regs.hl()),
            Reg8::A => self.regs.a,
        }
    }

    /// Write an 8-bit register, or memory at HL for `(HL)`.
    #[inline]
    pub(super) fn write_reg8<B: Bus>(&mut self, bus: &mut B, reg: Reg8, value: u8) {
        match reg {
            Reg8::B => self.regs.b = value,
            Reg8::C => self.regs.c = value,
            Reg8::D => self.regs.d = value,
            Reg8::E => self.regs.e = value,
            Reg8::H => self.regs.h = value,
            Reg8::L => self.regs.l = value,
            Reg8::HlInd => bus.write8(self.regs.hl(), value),
            Reg8::A => self.regs.a = value,
        }
    }

    #[inline]
    pub(super) fn read_reg16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::Bc => self.regs.bc(),
            Reg16::De => self.regs.de(),
            Reg16::Hl => self.regs.hl(),
            Reg16::Sp => self.regs.sp,
        }
    }

    #[inline]
    pub(super) fn write_reg16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::Bc => self.regs.set_bc(value),
            Reg16::De => self.regs.set_de(value),
            Reg16::Hl => self.regs.set_hl(value),
            Reg16::Sp => self.regs.sp = value,
        }
    }

    #[inline]
    pub(super) fn read_stack_pair(&self, pair: StackPair) -> u16 {
        match pair {
            StackPair::Bc => self.regs.bc(),
            StackPair::De => self.regs.de(),
            StackPair::Hl => self.regs.hl(),
            StackPair::Af => self.regs.af(),
        }
    }

    #[inline]
    pub(super) fn write_stack_pair(&mut self, pair: StackPair, value: u16) {
        match pair {
            StackPair::Bc => self.regs.set_bc(value),
            StackPair::De => self.regs.set_de(value),
            StackPair::Hl => self.regs.set_hl(value),
            StackPair::Af => self.regs.set_af(value),
        }
    }

    /// Address for an `(rr)` operand. `(HL+)`/`(HL-)` adjust HL afterwards.
    #[inline]
    pub(super) fn indirect_address(&mut self, ptr: Indirect) -> u16 {
        match ptr {
            Indirect::Bc => self.regs.bc(),
            Indirect::De => self.regs.de(),
            Indirect::HlInc => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            Indirect::HlDec => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }

    #[inline]
    pub(super) fn condition(&self, cond: Cond) -> bool {
        match cond {
            Cond::Nz => !self.get_flag(Flag::Z),
            Cond::Z => self.get_flag(Flag::Z),
            Cond::Nc => !self.get_flag(Flag::C),
            Cond::C => self.get_flag(Flag::C),
        }
    }

    #[inline]
    pub(super) fn push_u16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        // Stack grows downward: memory[SP] = low, memory[SP+1] = high.
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo);
    }

    #[inline]
    pub(super) fn pop_u16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read8(self.regs.sp);
        let hi = bus.read8(self.regs.sp.wrapping_add(1));
        self.regs.sp = self.regs.sp.wrapping_add(2);
        u16::from_le_bytes([lo, hi])
    }

    /// Relative jump helper used by JR/JR cc.
    ///
    /// PC already points past the displacement byte.
    pub(super) fn jr(&mut self, offset: u8, cond: bool) -> bool {
        if cond {
            self.regs.pc = self.regs.pc.wrapping_add(offset as i8 as u16);
        }
        cond
    }

    /// Absolute jump helper used by JP a16 and JP cc,a16.
    pub(super) fn jp(&mut self, addr: u16, cond: bool) -> bool {
        if cond {
            self.regs.pc = addr;
        }
        cond
    }

    /// Call helper used by CALL a16 and CALL cc,a16. Pushes the address of
    /// the next instruction.
    pub(super) fn call<B: Bus>(&mut self, bus: &mut B, addr: u16, cond: bool) -> bool {
        if cond {
            let ret = self.regs.pc;
            self.push_u16(bus, ret);
            self.regs.pc = addr;
        }
        cond
    }

    /// Return helper used by RET and RET cc.
    pub(super) fn ret<B: Bus>(&mut self, bus: &mut B, cond: bool) -> bool {
        if cond {
            self.regs.pc = self.pop_u16(bus);
        }
        cond
    }
}
