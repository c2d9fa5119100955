use super::{Cpu, CpuConfig, Flags, Registers};

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// CPU in the state the DMG boot ROM leaves behind.
    pub fn new() -> Self {
        Self::with_config(CpuConfig::default())
    }

    pub fn with_config(config: CpuConfig) -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            ime: false,
            halted: false,
            config,
            boot_overlay: None,
            cycles: 0,
        };
        cpu.apply_dmg_boot_state();
        cpu
    }

    /// Reset to the post-boot state, dropping any armed boot overlay.
    pub fn reset(&mut self) {
        self.regs = Registers::default();
        self.halted = false;
        self.boot_overlay = None;
        self.cycles = 0;
        self.apply_dmg_boot_state();
    }

    /// Zero every register and start at 0x0000, where a boot ROM begins.
    pub fn power_on(&mut self) {
        self.regs = Registers::default();
        self.ime = false;
        self.halted = false;
        self.cycles = 0;
    }

    /// Initialize registers to match the DMG boot ROM's state after it
    /// hands control to cartridge code.
    ///
    /// Values follow Pan Docs' "Power Up Sequence".
    pub fn apply_dmg_boot_state(&mut self) {
        self.regs.a = 0x01;
        self.regs.f = Flags::from_byte(0xB0); // Z=1 N=0 H=1 C=1
        self.regs.b = 0x00;
        self.regs.c = 0x13;
        self.regs.d = 0x00;
        self.regs.e = 0xD8;
        self.regs.h = 0x01;
        self.regs.l = 0x4D;
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;

        // The cartridge enables interrupts itself via EI/RETI.
        self.ime = false;
    }
}
