//! Step-and-compare interface for external CPU conformance testers.
//!
//! The tester hands over a read-only instruction buffer, sets a register
//! snapshot, steps once and reads the snapshot back together with every
//! write the instruction attempted.

use crate::cpu::{Cpu, CpuConfig, Flags};
use crate::error::CpuError;
use crate::memory::{AddressSpace, MemAccess, ACCESS_LOG_CAPACITY};

/// Register snapshot exchanged with a tester.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuState {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
    pub halted: bool,
    pub interrupts_master_enabled: bool,
    pub num_mem_accesses: usize,
    pub mem_accesses: [MemAccess; ACCESS_LOG_CAPACITY],
}

/// A CPU bound to a borrowed instruction buffer with writes logged.
pub struct TesterSession<'m> {
    cpu: Cpu,
    memory: AddressSpace<'m>,
}

impl<'m> TesterSession<'m> {
    /// Bind to the first `memory_size` bytes of `instruction_mem`.
    pub fn init(memory_size: usize, instruction_mem: &'m [u8]) -> Self {
        Self::with_config(memory_size, instruction_mem, CpuConfig::default())
    }

    pub fn with_config(memory_size: usize, instruction_mem: &'m [u8], config: CpuConfig) -> Self {
        let mut cpu = Cpu::with_config(config);
        cpu.power_on();
        Self {
            cpu,
            memory: AddressSpace::borrowed(memory_size, instruction_mem),
        }
    }

    /// Load registers and replay a captured access log. The log count
    /// starts from zero again.
    pub fn set_state(&mut self, state: &CpuState) {
        let regs = &mut self.cpu.regs;
        regs.a = state.a;
        regs.f = Flags::from_byte(state.f);
        regs.b = state.b;
        regs.c = state.c;
        regs.d = state.d;
        regs.e = state.e;
        regs.h = state.h;
        regs.l = state.l;
        regs.sp = state.sp;
        regs.pc = state.pc;
        self.cpu.halted = state.halted;
        self.cpu.ime = state.interrupts_master_enabled;
        self.memory.access_log_mut().restore(&state.mem_accesses);
    }

    pub fn get_state(&self) -> CpuState {
        let regs = &self.cpu.regs;
        let log = self.memory.access_log();
        CpuState {
            a: regs.a,
            f: regs.f.to_byte(),
            b: regs.b,
            c: regs.c,
            d: regs.d,
            e: regs.e,
            h: regs.h,
            l: regs.l,
            sp: regs.sp,
            pc: regs.pc,
            halted: self.cpu.halted,
            interrupts_master_enabled: self.cpu.ime,
            num_mem_accesses: log.len(),
            mem_accesses: *log.slots(),
        }
    }

    /// Execute one instruction and return its cost in machine cycles.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        self.cpu.step(&mut self.memory)
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }
}
