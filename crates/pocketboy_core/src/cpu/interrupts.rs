use bitflags::bitflags;

use super::{Bus, Cpu};

/// Interrupt enable register.
pub const IE_ADDR: u16 = 0xFFFF;
/// Interrupt request register.
pub const IF_ADDR: u16 = 0xFF0F;
/// Machine cycles spent entering an interrupt handler.
pub const INTERRUPT_DISPATCH_CYCLES: u32 = 5;

bitflags! {
    /// Interrupt sources as they appear in IE and IF. Lower bits win.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Interrupts: u8 {
        const VBLANK = 1 << 0;
        const LCD_STAT = 1 << 1;
        const TIMER = 1 << 2;
        const SERIAL = 1 << 3;
        const JOYPAD = 1 << 4;
    }
}

impl Interrupts {
    /// Highest-priority source in the set.
    pub fn highest(self) -> Option<Interrupts> {
        if self.is_empty() {
            return None;
        }
        Some(Interrupts::from_bits_retain(1 << self.bits().trailing_zeros()))
    }

    /// Handler address of a single source: 0x40 + 8 * bit index.
    pub fn vector(self) -> u16 {
        0x0040 + (self.bits().trailing_zeros() as u16) * 8
    }
}

impl Cpu {
    /// Sources that are both requested and enabled, regardless of IME.
    pub fn pending_interrupts<B: Bus>(&mut self, bus: &mut B) -> Interrupts {
        let ie = Interrupts::from_bits_truncate(bus.read8(IE_ADDR));
        let iflags = Interrupts::from_bits_truncate(bus.read8(IF_ADDR));
        ie & iflags
    }

    /// Leave HALT if any enabled source is requested. IME does not matter.
    pub fn wake_if_pending<B: Bus>(&mut self, bus: &mut B) -> bool {
        if self.halted && !self.pending_interrupts(bus).is_empty() {
            self.halted = false;
            return true;
        }
        false
    }

    /// Enter the handler for the highest-priority pending interrupt.
    ///
    /// With IME set and at least one enabled request: clears that IF bit,
    /// clears IME and HALT, pushes PC and jumps to the vector. Returns the
    /// cycles spent, or `None` when nothing was dispatched.
    pub fn service_interrupt<B: Bus>(&mut self, bus: &mut B) -> Option<u32> {
        if !self.ime {
            return None;
        }
        let pending = self.pending_interrupts(bus);
        let source = pending.highest()?;

        let iflags = bus.read8(IF_ADDR);
        bus.write8(IF_ADDR, iflags & !source.bits());
        self.ime = false;
        self.halted = false;

        let pc = self.regs.pc;
        self.push_u16(bus, pc);
        self.regs.pc = source.vector();

        log::debug!(
            "interrupt {:?} (bit {}): vector=0x{:04X} pc=0x{:04X} sp=0x{:04X} pending=0x{:02X} IF=0x{:02X}",
            source,
            source.bits().trailing_zeros(),
            self.regs.pc,
            pc,
            self.regs.sp,
            pending.bits(),
            iflags,
        );
        Some(INTERRUPT_DISPATCH_CYCLES)
    }
}
