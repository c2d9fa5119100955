/// Abstraction over the memory the CPU talks to.
///
/// Only byte accesses are required. Word accesses default to two byte
/// accesses (low byte first on read, high byte first on write); stores
/// that observe word-sized traffic override them.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    fn read16(&mut self, addr: u16) -> u16 {
        let lo = self.read8(addr);
        let hi = self.read8(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn write16(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write8(addr.wrapping_add(1), hi);
        self.write8(addr, lo);
    }
}
