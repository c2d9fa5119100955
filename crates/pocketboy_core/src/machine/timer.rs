//! Divider and timer registers (DIV/TIMA/TMA/TAC).
//!
//! The registers live in the shared address space so the CPU reads and
//! writes them like any other byte. The timer keeps the hidden 16-bit
//! divider counter, learns about DIV writes from a write observer and
//! notices TAC changes by comparing against the value it last saw.

use std::cell::Cell;
use std::rc::Rc;

use crate::cpu::{Interrupts, IF_ADDR};
use crate::memory::{AddressSpace, EventKind, DIV_ADDR};

pub const TIMA_ADDR: u16 = 0xFF05;
pub const TMA_ADDR: u16 = 0xFF06;
pub const TAC_ADDR: u16 = 0xFF07;

/// Divider seed that makes DIV read 0xAB when cartridge code starts.
const DMG_DIVIDER_SEED: u16 = 0x2AC0;

pub(super) struct Timer {
    /// Hidden system counter, one tick per machine cycle. DIV exposes bits 13:6.
    internal_counter: u16,
    /// TIMA overflowed on the previous tick; reload and interrupt are due.
    overflow: bool,
    /// Set by the write observers when the CPU stores to DIV.
    div_written: Rc<Cell<bool>>,
    /// TAC value seen on the previous advance.
    last_tac: u8,
}

impl Timer {
    /// Create a timer and hook it to DIV writes on `memory`.
    pub(super) fn new(memory: &mut AddressSpace<'_>) -> Self {
        let div_written = Rc::new(Cell::new(false));
        {
            let div_written = Rc::clone(&div_written);
            memory.add_listener(EventKind::WriteByte, move |event| {
                if event.address == DIV_ADDR {
                    div_written.set(true);
                }
            });
        }
        {
            let div_written = Rc::clone(&div_written);
            memory.add_listener(EventKind::WriteWord, move |event| {
                if event.address == DIV_ADDR || event.address.wrapping_add(1) == DIV_ADDR {
                    div_written.set(true);
                }
            });
        }
        Self {
            internal_counter: 0,
            overflow: false,
            div_written,
            last_tac: 0,
        }
    }

    /// Seed the divider as the DMG boot ROM leaves it and publish DIV.
    pub(super) fn init_dmg(&mut self, memory: &mut AddressSpace<'_>) {
        self.internal_counter = DMG_DIVIDER_SEED;
        self.overflow = false;
        self.div_written.set(false);
        self.last_tac = memory.peek(TAC_ADDR);
        self.publish_div(memory);
    }

    /// Zeroed divider, as at power-on before the boot ROM runs.
    pub(super) fn power_on(&mut self, memory: &mut AddressSpace<'_>) {
        self.internal_counter = 0;
        self.overflow = false;
        self.div_written.set(false);
        self.last_tac = memory.peek(TAC_ADDR);
        self.publish_div(memory);
    }

    /// Return the currently selected timer input bit of the internal
    /// counter based on TAC[1:0]. The mapping is:
    /// - 00 → bit 7 (4096 Hz)
    /// - 01 → bit 1 (262144 Hz)
    /// - 10 → bit 3 (65536 Hz)
    /// - 11 → bit 5 (16384 Hz)
    #[inline]
    fn counter_bit(tac: u8, counter: u16) -> bool {
        let mask = match tac & 0x03 {
            0x00 => 1u16 << 7,
            0x01 => 1u16 << 1,
            0x02 => 1u16 << 3,
            _ => 1u16 << 5,
        };
        tac & 0x04 != 0 && counter & mask != 0
    }

    fn increment_tima(&mut self, memory: &mut AddressSpace<'_>) {
        let (next, overflow) = memory.peek(TIMA_ADDR).overflowing_add(1);
        memory.poke(TIMA_ADDR, next);
        if overflow {
            // TIMA reads 0x00 for one cycle before the reload.
            self.overflow = true;
        }
    }

    /// Advance by `m_cycles` machine cycles.
    pub(super) fn advance(&mut self, memory: &mut AddressSpace<'_>, m_cycles: u32) {
        self.sync_writes(memory);
        for _ in 0..m_cycles {
            self.tick_mcycle(memory);
        }
        self.publish_div(memory);
    }

    /// Apply side effects of CPU writes to DIV and TAC since the last advance.
    fn sync_writes(&mut self, memory: &mut AddressSpace<'_>) {
        let tac = memory.peek(TAC_ADDR);
        if self.div_written.replace(false) {
            // Resetting the counter can drop the selected bit from 1 to 0.
            if Self::counter_bit(tac, self.internal_counter) {
                self.increment_tima(memory);
            }
            self.internal_counter = 0;
        }
        if tac != self.last_tac {
            let old_bit = Self::counter_bit(self.last_tac, self.internal_counter);
            let new_bit = Self::counter_bit(tac, self.internal_counter);
            if old_bit && !new_bit {
                self.increment_tima(memory);
            }
            self.last_tac = tac;
        }
    }

    fn tick_mcycle(&mut self, memory: &mut AddressSpace<'_>) {
        let tac = memory.peek(TAC_ADDR);
        if self.overflow {
            self.internal_counter = self.internal_counter.wrapping_add(1);
            memory.poke(TIMA_ADDR, memory.peek(TMA_ADDR));
            let iflags = memory.peek(IF_ADDR);
            memory.poke(IF_ADDR, iflags | Interrupts::TIMER.bits());
            self.overflow = false;
            return;
        }

        let old_bit = Self::counter_bit(tac, self.internal_counter);
        self.internal_counter = self.internal_counter.wrapping_add(1);
        if old_bit && !Self::counter_bit(tac, self.internal_counter) {
            self.increment_tima(memory);
        }
    }

    fn publish_div(&self, memory: &mut AddressSpace<'_>) {
        memory.poke(DIV_ADDR, (self.internal_counter >> 6) as u8);
    }
}
