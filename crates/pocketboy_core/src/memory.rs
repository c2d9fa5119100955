//! Flat 64 KiB address space shared by the CPU and the machine.
//!
//! The store can either own its bytes (a running machine) or borrow a
//! read-only buffer from a test harness. In the borrowed configuration
//! writes are never applied; they are appended to a small access log so
//! the harness can compare them against a reference.

mod events;

pub use events::{EventKind, MemoryEvent};

use crate::cpu::Bus;
use events::Listeners;

/// Size of the full address space.
pub const MEMORY_SIZE: usize = 0x1_0000;
/// Value returned for reads beyond the configured size.
pub const OPEN_BUS: u8 = 0xAA;
/// Divider register. Any write stores zero.
pub const DIV_ADDR: u16 = 0xFF04;
/// Maximum number of logged accesses per step.
pub const ACCESS_LOG_CAPACITY: usize = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AccessKind {
    #[default]
    Read,
    Write,
}

/// One entry of the access log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MemAccess {
    pub kind: AccessKind,
    pub address: u16,
    pub value: u8,
}

/// Bounded log of accesses captured while writes are suppressed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessLog {
    entries: [MemAccess; ACCESS_LOG_CAPACITY],
    len: usize,
}

impl AccessLog {
    fn record(&mut self, access: MemAccess) {
        if self.len == ACCESS_LOG_CAPACITY {
            log::warn!(
                "access log full, dropping {:?} 0x{:04X}=0x{:02X}",
                access.kind,
                access.address,
                access.value
            );
            return;
        }
        self.entries[self.len] = access;
        self.len += 1;
    }

    /// Replace every slot with `entries` and reset the count to zero.
    ///
    /// New accesses overwrite the replayed slots from index 0.
    pub fn restore(&mut self, entries: &[MemAccess; ACCESS_LOG_CAPACITY]) {
        self.entries = *entries;
        self.len = 0;
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Only the recorded prefix.
    pub fn recorded(&self) -> &[MemAccess] {
        &self.entries[..self.len]
    }

    /// All slots including stale ones past `len`.
    pub fn slots(&self) -> &[MemAccess; ACCESS_LOG_CAPACITY] {
        &self.entries
    }
}

enum Store<'m> {
    Owned(Box<[u8]>),
    Borrowed(&'m [u8]),
}

impl Store<'_> {
    #[inline]
    fn as_slice(&self) -> &[u8] {
        match self {
            Store::Owned(bytes) => bytes,
            Store::Borrowed(bytes) => bytes,
        }
    }
}

/// Byte-addressable memory with observers and an optional write log.
pub struct AddressSpace<'m> {
    store: Store<'m>,
    size: usize,
    log_writes: bool,
    access_log: AccessLog,
    listeners: Listeners<'m>,
}

impl Default for AddressSpace<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'m> AddressSpace<'m> {
    /// Zero-filled, writable 64 KiB store.
    pub fn new() -> Self {
        Self {
            store: Store::Owned(vec![0; MEMORY_SIZE].into_boxed_slice()),
            size: MEMORY_SIZE,
            log_writes: false,
            access_log: AccessLog::default(),
            listeners: Listeners::default(),
        }
    }

    /// Read-only view over a harness-provided buffer.
    ///
    /// Reads at or past `size` return [`OPEN_BUS`]. Writes are logged and
    /// never reach the buffer.
    pub fn borrowed(size: usize, bytes: &'m [u8]) -> Self {
        Self {
            store: Store::Borrowed(bytes),
            size: size.min(bytes.len()),
            log_writes: true,
            access_log: AccessLog::default(),
            listeners: Listeners::default(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether writes go to the access log instead of the store.
    pub fn log_writes(&self) -> bool {
        self.log_writes
    }

    /// Toggle write logging. A borrowed store always logs.
    pub fn set_log_writes(&mut self, enabled: bool) {
        self.log_writes = enabled || matches!(self.store, Store::Borrowed(_));
    }

    pub fn access_log(&self) -> &AccessLog {
        &self.access_log
    }

    pub fn access_log_mut(&mut self) -> &mut AccessLog {
        &mut self.access_log
    }

    /// Register an observer. Observers of one kind fire in registration order.
    pub fn add_listener<F>(&mut self, kind: EventKind, listener: F)
    where
        F: FnMut(&MemoryEvent<'_>) + 'm,
    {
        self.listeners.push(kind, Box::new(listener));
    }

    /// Whole backing store.
    pub fn bytes(&self) -> &[u8] {
        self.store.as_slice()
    }

    /// Read a byte without bounds sentinel or observers. Out-of-range is `OPEN_BUS`.
    #[inline]
    pub fn peek(&self, address: u16) -> u8 {
        let index = address as usize;
        if index >= self.size {
            return OPEN_BUS;
        }
        self.store.as_slice()[index]
    }

    /// Write a byte bypassing DIV semantics, observers and logging.
    ///
    /// Used by on-chip peripherals. Has no effect on a borrowed store.
    #[inline]
    pub fn poke(&mut self, address: u16, value: u8) {
        if let Store::Owned(bytes) = &mut self.store {
            bytes[address as usize] = value;
        }
    }

    /// Copy `data` into the store starting at `base`, clipped to the end.
    pub fn load(&mut self, base: u16, data: &[u8]) {
        if let Store::Owned(bytes) = &mut self.store {
            let start = base as usize;
            let len = data.len().min(MEMORY_SIZE - start);
            bytes[start..start + len].copy_from_slice(&data[..len]);
        }
    }

    pub fn read_byte(&mut self, address: u16) -> u8 {
        let value = self.peek(address);
        if !self.log_writes {
            self.notify(EventKind::ReadByte, address, value, 0);
        }
        value
    }

    /// Little-endian word built from two byte reads.
    pub fn read_word(&mut self, address: u16) -> u16 {
        let lo = self.read_byte(address);
        let hi = self.read_byte(address.wrapping_add(1));
        let value = u16::from_le_bytes([lo, hi]);
        if !self.log_writes {
            self.notify(EventKind::ReadWord, address, 0, value);
        }
        value
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        self.store_byte(address, value, true);
    }

    /// Fires word observers once, then stores the high byte at
    /// `address + 1` followed by the low byte at `address`.
    pub fn write_word(&mut self, address: u16, value: u16) {
        if !self.log_writes {
            self.notify(EventKind::WriteWord, address, 0, value);
        }
        let [lo, hi] = value.to_le_bytes();
        self.store_byte(address.wrapping_add(1), hi, false);
        self.store_byte(address, lo, false);
    }

    fn store_byte(&mut self, address: u16, value: u8, notify: bool) {
        let value = if address == DIV_ADDR { 0 } else { value };

        if self.log_writes {
            self.access_log.record(MemAccess {
                kind: AccessKind::Write,
                address,
                value,
            });
            return;
        }

        if notify {
            self.notify(EventKind::WriteByte, address, value, 0);
        }
        self.poke(address, value);
    }

    fn notify(&mut self, kind: EventKind, address: u16, value8: u8, value16: u16) {
        let event = MemoryEvent {
            kind,
            address,
            value8,
            value16,
            memory: self.store.as_slice(),
        };
        self.listeners.dispatch(&event);
    }
}

impl Bus for AddressSpace<'_> {
    #[inline]
    fn read8(&mut self, addr: u16) -> u8 {
        self.read_byte(addr)
    }

    #[inline]
    fn write8(&mut self, addr: u16, value: u8) {
        self.write_byte(addr, value)
    }

    #[inline]
    fn read16(&mut self, addr: u16) -> u16 {
        self.read_word(addr)
    }

    #[inline]
    fn write16(&mut self, addr: u16, value: u16) {
        self.write_word(addr, value)
    }
}
