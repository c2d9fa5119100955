use crate::cpu::Cpu;

impl Cpu {
    /// Treated as HALT since there is no joypad to wake on. Whether the
    /// padding byte is skipped depends on [`crate::cpu::StopLength`].
    pub(super) fn exec_stop(&mut self) {
        self.halted = true;
    }

    pub(super) fn exec_halt(&mut self) {
        self.halted = true;
    }

    pub(super) fn exec_di(&mut self) {
        self.ime = false;
    }

    /// IME takes effect immediately.
    pub(super) fn exec_ei(&mut self) {
        self.ime = true;
    }
}
