//! Miss Status Holding Registers.
//!
//! A fixed-capacity arena of outstanding misses. Each entry remembers the request that
//! missed and the line slot its fill will land in. Slots are recycled through a free
//! list, so allocation and release never touch the heap after construction (the store
//! payload of a pending write is the only owned buffer).
//!
//! The table itself does not decide acceptance; the controller compares
//! [`MshrTable::occupancy`] with [`MshrTable::capacity`] after every allocation and
//! release to drive its blocked flag.

use crate::common::data::RequestId;

/// One outstanding miss.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MshrEntry {
    /// Processor request to complete when the fill returns.
    pub request_id: RequestId,
    /// Full address of the original request (not block-aligned).
    pub address: u64,
    /// Size of the original request in bytes.
    pub size: usize,
    /// Bytes to merge into the line after the fill, for stores.
    pub store: Option<Vec<u8>>,
    /// Line slot reserved for the fill.
    pub line: usize,
}

/// Fixed-capacity table of outstanding misses.
#[derive(Clone, Debug)]
pub struct MshrTable {
    slots: Vec<Option<MshrEntry>>,
    free: Vec<usize>,
}

impl MshrTable {
    /// Creates an empty table with `capacity` slots.
    ///
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "MSHR table needs at least one entry");
        Self {
            slots: vec![None; capacity],
            // Popped from the back, so the lowest slot is handed out first.
            free: (0..capacity).rev().collect(),
        }
    }

    /// Configured number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn occupancy(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Returns `true` once every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Returns `true` if no miss is outstanding.
    pub fn is_empty(&self) -> bool {
        self.free.len() == self.slots.len()
    }

    /// Records a new outstanding miss and returns its slot.
    ///
    /// # Panics
    ///
    /// If the table is full; the controller must reject the request before this point.
    pub fn allocate(&mut self, entry: MshrEntry) -> usize {
        let Some(slot) = self.free.pop() else {
            panic!(
                "MSHR table overflow: {} entries outstanding",
                self.slots.len()
            );
        };
        debug_assert!(self.slots[slot].is_none());
        self.slots[slot] = Some(entry);
        slot
    }

    /// Returns the slot of the entry for `id`, if one is outstanding.
    pub fn find(&self, id: RequestId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|e| e.request_id == id))
    }

    /// Returns the entry in `slot`, if occupied.
    pub fn get(&self, slot: usize) -> Option<&MshrEntry> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Frees `slot` and returns the entry it held.
    ///
    /// # Panics
    ///
    /// If the slot is not occupied.
    pub fn release(&mut self, slot: usize) -> MshrEntry {
        let Some(entry) = self.slots[slot].take() else {
            panic!("MSHR slot {slot} released while empty");
        };
        self.free.push(slot);
        entry
    }

    /// Returns whether an outstanding miss has reserved line slot `line`.
    pub fn reserves_line(&self, line: usize) -> bool {
        self.entries().any(|e| e.line == line)
    }

    /// Returns whether an outstanding miss covers the block containing `block_addr`.
    ///
    /// `block_mask` clears the offset bits of an address.
    pub fn covers_block(&self, block_addr: u64, block_mask: u64) -> bool {
        self.entries().any(|e| e.address & block_mask == block_addr)
    }

    /// Iterates over outstanding entries in slot order.
    pub fn entries(&self) -> impl Iterator<Item = &MshrEntry> {
        self.slots.iter().flatten()
    }
}
