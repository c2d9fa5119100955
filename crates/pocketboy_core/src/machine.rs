mod gameboy;
mod timer;

pub use gameboy::{GameBoy, RunOutcome, RunSummary};
pub use timer::{TAC_ADDR, TIMA_ADDR, TMA_ADDR};

use typed_builder::TypedBuilder;

use crate::cpu::CpuConfig;

/// Serial transfer data register.
pub const SERIAL_DATA_ADDR: u16 = 0xFF01;
/// Serial transfer control register. Writing 0x81 starts a transfer.
pub const SERIAL_CONTROL_ADDR: u16 = 0xFF02;
/// Control value that starts a transfer on the internal clock.
pub const SERIAL_START_INTERNAL: u8 = 0x81;

/// Largest cartridge image that fits the flat map without overlapping RAM.
pub const FLAT_ROM_LIMIT: usize = 0x8000;
/// Cycles a halted CPU idles per machine step.
pub const HALT_IDLE_CYCLES: u32 = 1;

/// How a [`GameBoy`] is assembled.
#[derive(Clone, Debug, Default, TypedBuilder)]
pub struct MachineConfig {
    #[builder(default)]
    pub cpu: CpuConfig,
    /// Boot ROM mapped over 0x0000–0x00FF until it writes 0xFF50. Without
    /// one the CPU starts at 0x0100 in the post-boot state.
    #[builder(default, setter(strip_option))]
    pub boot_rom: Option<Vec<u8>>,
    /// Stop [`GameBoy::run`] when PC reaches this address.
    #[builder(default, setter(strip_option))]
    pub endpoint: Option<u16>,
}
