use alloc::boxed::Box;

use crate::key::Key;
use crate::key::KeyRef;

/// A single stored key/value pair.
///
/// The key bytes are owned by the entry. The value is a borrowed view: the
/// table records where the caller's bytes live and how many there are, but
/// never copies or frees them.
#[derive(Debug)]
pub(crate) struct Entry<'a> {
    key: Key,
    value: &'a [u8],
}

impl<'a> Entry<'a> {
    /// Allocates an entry on the heap, copying string key bytes.
    pub(crate) fn boxed(key: KeyRef<'_>, value: &'a [u8]) -> Box<Self> {
        Box::new(Entry {
            key: key.to_key(),
            value,
        })
    }

    #[inline]
    pub(crate) fn key(&self) -> KeyRef<'_> {
        self.key.as_key_ref()
    }

    #[inline]
    pub(crate) fn value(&self) -> &'a [u8] {
        self.value
    }

    /// Swaps in a new value view and hands back the old one.
    #[inline]
    pub(crate) fn replace_value(&mut self, value: &'a [u8]) -> &'a [u8] {
        core::mem::replace(&mut self.value, value)
    }
}

/// State of one position in the slot array.
#[derive(Debug, Default)]
pub(crate) enum Slot<'a> {
    /// Never occupied since the last rehash; terminates a probe.
    #[default]
    Empty,
    /// Previously occupied; a probe skips it, and insert may reclaim it.
    Deleted,
    Occupied(Box<Entry<'a>>),
}

impl<'a> Slot<'a> {
    #[cfg(any(test, feature = "stats"))]
    #[inline]
    pub(crate) fn entry(&self) -> Option<&Entry<'a>> {
        match self {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Allocates `capacity` empty slots.
pub(crate) fn empty_slots<'a>(capacity: usize) -> alloc::vec::Vec<Slot<'a>> {
    let mut slots = alloc::vec::Vec::with_capacity(capacity);
    slots.resize_with(capacity, Slot::default);
    slots
}
