/// Kinds of memory access that observers can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    ReadByte,
    ReadWord,
    WriteByte,
    WriteWord,
}

impl EventKind {
    const COUNT: usize = 4;

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// Payload handed to observers.
///
/// Only one of `value8`/`value16` is meaningful depending on `kind`; the
/// other is zero. `memory` is the backing store as it was before the
/// access took effect.
#[derive(Clone, Copy, Debug)]
pub struct MemoryEvent<'a> {
    pub kind: EventKind,
    pub address: u16,
    pub value8: u8,
    pub value16: u16,
    pub memory: &'a [u8],
}

pub(super) type Listener<'m> = Box<dyn FnMut(&MemoryEvent<'_>) + 'm>;

#[derive(Default)]
pub(super) struct Listeners<'m> {
    slots: [Vec<Listener<'m>>; EventKind::COUNT],
}

impl<'m> Listeners<'m> {
    pub(super) fn push(&mut self, kind: EventKind, listener: Listener<'m>) {
        self.slots[kind.slot()].push(listener);
    }

    pub(super) fn dispatch(&mut self, event: &MemoryEvent<'_>) {
        for listener in self.slots[event.kind.slot()].iter_mut() {
            listener(event);
        }
    }
}
