//! Set Lookup.
//!
//! Scans the ways of the set an address maps to. It answers the two questions the
//! request path asks on every access:
//! 1. **Hit detection:** Is the block present (`Valid` or `Dirty` with a matching tag)?
//! 2. **Clean victim search:** Is there a way that can be reused without a writeback?

use super::decoder::AddressDecoder;
use super::storage::{LineState, TagArray};

/// Outcome of classifying an address against its set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// The block is present in this line slot.
    Hit(usize),
    /// The block is not present.
    Miss,
}

/// View of the ways of one set.
#[derive(Clone, Copy, Debug)]
pub struct SetLookup<'a> {
    tags: &'a TagArray,
    set: usize,
    base: usize,
    ways: usize,
    tag: u64,
}

impl<'a> SetLookup<'a> {
    /// Selects the set that `addr` maps to.
    pub const fn new(decoder: &AddressDecoder, tags: &'a TagArray, addr: u64) -> Self {
        let set = decoder.index(addr);
        Self {
            tags,
            set,
            base: decoder.line_index(set, 0),
            ways: decoder.ways(),
            tag: decoder.tag(addr),
        }
    }

    /// Set index being scanned.
    pub const fn set(&self) -> usize {
        self.set
    }

    /// Slot numbers of every way in the set, in way order.
    pub const fn lines(&self) -> std::ops::Range<usize> {
        self.base..self.base + self.ways
    }

    /// Classifies the address; first matching way wins.
    pub fn classify(&self) -> Lookup {
        self.lines()
            .find(|&line| self.tags.state(line).is_present() && self.tags.tag(line) == self.tag)
            .map_or(Lookup::Miss, Lookup::Hit)
    }

    /// Returns the first way that is not dirty and not reserved.
    ///
    /// `reserved` marks slots that already belong to an outstanding miss.
    pub fn find_clean_victim(&self, reserved: impl Fn(usize) -> bool) -> Option<usize> {
        self.lines()
            .find(|&line| self.tags.state(line) != LineState::Dirty && !reserved(line))
    }

    /// Returns every way that is not reserved, in way order.
    pub fn unreserved(&self, reserved: impl Fn(usize) -> bool) -> Vec<usize> {
        self.lines().filter(|&line| !reserved(line)).collect()
    }
}
