use crate::cpu::instruction::StackPair;
use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(super) fn exec_push<B: Bus>(&mut self, bus: &mut B, pair: StackPair) {
        let value = self.read_stack_pair(pair);
        self.push_u16(bus, value);
    }

    /// `POP AF` drops the low nibble of F.
    pub(super) fn exec_pop<B: Bus>(&mut self, bus: &mut B, pair: StackPair) {
        let value = self.pop_u16(bus);
        self.write_stack_pair(pair, value);
    }
}
