use super::{Bus, Cpu};

/// Writing here unmaps the boot overlay.
pub const BOOT_OFF_ADDR: u16 = 0xFF50;
/// Bytes of cartridge space hidden by the boot ROM: 0x0000..0x0100.
pub const BOOT_OVERLAY_LEN: usize = 0x100;

/// Cartridge bytes saved before the boot ROM was mapped over them.
#[derive(Clone, Debug)]
pub(super) struct BootOverlay {
    saved: Box<[u8; BOOT_OVERLAY_LEN]>,
}

impl BootOverlay {
    fn new(cartridge: &[u8]) -> Self {
        let mut saved = Box::new([0u8; BOOT_OVERLAY_LEN]);
        let len = cartridge.len().min(BOOT_OVERLAY_LEN);
        saved[..len].copy_from_slice(&cartridge[..len]);
        Self { saved }
    }
}

impl Cpu {
    /// Remember the first 256 bytes of `cartridge` so they can be put back
    /// when the boot ROM disables itself. The caller maps the boot ROM.
    pub fn arm_boot_overlay(&mut self, cartridge: &[u8]) {
        self.boot_overlay = Some(BootOverlay::new(cartridge));
    }

    /// True until the boot ROM writes to 0xFF50.
    pub fn boot_overlay_active(&self) -> bool {
        self.boot_overlay.is_some()
    }

    /// Copy the saved cartridge bytes back through the bus. Runs at most
    /// once per armed overlay.
    pub(super) fn retire_boot_overlay<B: Bus>(&mut self, bus: &mut B) {
        let Some(overlay) = self.boot_overlay.take() else {
            return;
        };
        for (addr, &byte) in overlay.saved.iter().enumerate() {
            bus.write8(addr as u16, byte);
        }
        log::info!(
            "boot ROM unmapped at PC=0x{:04X}, restored {} cartridge bytes",
            self.regs.pc,
            BOOT_OVERLAY_LEN
        );
    }
}
