use crate::cpu::{Cpu, Interrupts, BOOT_OVERLAY_LEN, IE_ADDR};
use crate::error::CpuError;
use crate::memory::{AddressSpace, EventKind, MemoryEvent};

use super::timer::Timer;
use super::{MachineConfig, FLAT_ROM_LIMIT, HALT_IDLE_CYCLES};

/// Why [`GameBoy::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// PC reached the configured endpoint.
    Endpoint,
    /// The step budget ran out.
    StepLimit,
    /// HALT with no interrupt source enabled; nothing can wake the CPU.
    Deadlocked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub steps: u64,
    pub cycles: u64,
}

/// CPU, flat address space and timer driven in lockstep.
pub struct GameBoy {
    pub cpu: Cpu,
    pub memory: AddressSpace<'static>,
    timer: Timer,
    config: MachineConfig,
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}

impl GameBoy {
    pub fn new(config: MachineConfig) -> Self {
        let mut memory = AddressSpace::new();
        let mut timer = Timer::new(&mut memory);
        timer.init_dmg(&mut memory);
        Self {
            cpu: Cpu::with_config(config.cpu),
            memory,
            timer,
            config,
        }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Map a cartridge image at 0x0000 and prepare the CPU to run it.
    ///
    /// With a boot ROM configured the first 256 cartridge bytes are saved,
    /// the boot ROM is mapped over them and execution starts at 0x0000.
    pub fn load_rom(&mut self, rom: &[u8]) {
        if rom.len() > FLAT_ROM_LIMIT {
            log::warn!(
                "ROM is {} bytes; banking is not supported, bytes past 0x{:04X} overlay RAM",
                rom.len(),
                FLAT_ROM_LIMIT
            );
        }
        self.memory.load(0, rom);

        match &self.config.boot_rom {
            Some(boot) => {
                let len = boot.len().min(BOOT_OVERLAY_LEN);
                self.cpu.power_on();
                self.cpu.arm_boot_overlay(rom);
                self.memory.load(0, &boot[..len]);
                self.timer.power_on(&mut self.memory);
                log::info!("boot ROM mapped ({len} bytes), starting at 0x0000");
            }
            None => {
                self.cpu.reset();
                self.timer.init_dmg(&mut self.memory);
                log::info!("no boot ROM, starting at 0x{:04X}", self.cpu.regs.pc);
            }
        }
    }

    /// Register a memory observer on the machine's address space.
    pub fn add_listener<F>(&mut self, kind: EventKind, listener: F)
    where
        F: FnMut(&MemoryEvent<'_>) + 'static,
    {
        self.memory.add_listener(kind, listener);
    }

    /// Run one instruction (or one idle cycle while halted), advance the
    /// timer, then enter an interrupt handler if one is due.
    ///
    /// Returns the machine cycles consumed.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        let cycles = if self.cpu.halted && !self.cpu.wake_if_pending(&mut self.memory) {
            HALT_IDLE_CYCLES
        } else {
            self.cpu.step(&mut self.memory)?
        };
        self.timer.advance(&mut self.memory, cycles);

        let dispatch = self.cpu.service_interrupt(&mut self.memory).unwrap_or(0);
        self.timer.advance(&mut self.memory, dispatch);

        Ok(cycles + dispatch)
    }

    /// Step until the endpoint is reached, `max_steps` have run or the CPU
    /// can no longer make progress.
    pub fn run(&mut self, max_steps: Option<u64>) -> Result<RunSummary, CpuError> {
        let mut steps = 0u64;
        let mut cycles = 0u64;
        let outcome = loop {
            if Some(self.cpu.regs.pc) == self.config.endpoint {
                break RunOutcome::Endpoint;
            }
            if max_steps.is_some_and(|max| steps >= max) {
                break RunOutcome::StepLimit;
            }
            if self.is_deadlocked() {
                break RunOutcome::Deadlocked;
            }
            cycles += u64::from(self.step()?);
            steps += 1;
        };

        log::info!("run stopped: {outcome:?} after {steps} steps ({cycles} cycles)");
        Ok(RunSummary {
            outcome,
            steps,
            cycles,
        })
    }

    fn is_deadlocked(&self) -> bool {
        self.cpu.halted && Interrupts::from_bits_truncate(self.memory.peek(IE_ADDR)).is_empty()
    }
}
