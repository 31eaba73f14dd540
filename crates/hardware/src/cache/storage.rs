//! Cache Storage Arrays.
//!
//! This module provides the plain storage behind a cache:
//! 1. **TagArray:** Per-line coherence state and stored tag.
//! 2. **SramArray:** Per-line data bytes, co-indexed with the tag array.
//! 3. **Footprint Accounting:** Process-wide byte counters for tag and data storage,
//!    accumulated across every array built during the run.
//!
//! The arrays do no address arithmetic; callers index them by line slot.

use std::sync::atomic::{AtomicU64, Ordering};

static TAG_STORAGE_BYTES: AtomicU64 = AtomicU64::new(0);
static DATA_STORAGE_BYTES: AtomicU64 = AtomicU64::new(0);

/// State of one line slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineState {
    /// Slot holds nothing (or is reserved for a pending fill).
    #[default]
    Invalid,
    /// Slot holds a clean copy of memory.
    Valid,
    /// Slot holds data newer than memory. Dirty implies valid.
    Dirty,
}

impl LineState {
    /// Returns whether the slot holds usable data.
    #[inline]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Valid | Self::Dirty)
    }
}

/// Per-line state and tag storage.
#[derive(Clone, Debug)]
pub struct TagArray {
    states: Vec<LineState>,
    tags: Vec<u64>,
}

impl TagArray {
    /// Creates a tag array of `lines` slots, all `Invalid` with tag 0.
    ///
    /// `state_bits + tag_bits` is the modeled width of one entry; it only feeds the
    /// storage footprint counter.
    pub fn new(lines: usize, state_bits: u32, tag_bits: u32) -> Self {
        let bits = lines as u64 * u64::from(state_bits + tag_bits);
        let _ = TAG_STORAGE_BYTES.fetch_add(bits.div_ceil(8), Ordering::Relaxed);
        Self {
            states: vec![LineState::Invalid; lines],
            tags: vec![0; lines],
        }
    }

    /// Returns the number of line slots.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if the array has no slots.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the state of `line`.
    #[inline]
    pub fn state(&self, line: usize) -> LineState {
        self.states[line]
    }

    /// Sets the state of `line`.
    #[inline]
    pub fn set_state(&mut self, line: usize, state: LineState) {
        self.states[line] = state;
    }

    /// Returns the stored tag of `line`.
    #[inline]
    pub fn tag(&self, line: usize) -> u64 {
        self.tags[line]
    }

    /// Sets the stored tag of `line`.
    #[inline]
    pub fn set_tag(&mut self, line: usize, tag: u64) {
        self.tags[line] = tag;
    }

    /// Total tag storage, in bytes, of every tag array built in this process.
    pub fn total_size() -> u64 {
        TAG_STORAGE_BYTES.load(Ordering::Relaxed)
    }
}

/// Per-line data storage.
#[derive(Clone, Debug)]
pub struct SramArray {
    bytes: Vec<u8>,
    line_bytes: usize,
}

impl SramArray {
    /// Creates `lines` zeroed lines of `line_bytes` bytes each.
    pub fn new(lines: usize, line_bytes: usize) -> Self {
        let size = lines * line_bytes;
        let _ = DATA_STORAGE_BYTES.fetch_add(size as u64, Ordering::Relaxed);
        Self {
            bytes: vec![0; size],
            line_bytes,
        }
    }

    /// Returns the bytes of `line`.
    #[inline]
    pub fn line(&self, line: usize) -> &[u8] {
        let start = line * self.line_bytes;
        &self.bytes[start..start + self.line_bytes]
    }

    /// Returns the bytes of `line` for writing.
    #[inline]
    pub fn line_mut(&mut self, line: usize) -> &mut [u8] {
        let start = line * self.line_bytes;
        &mut self.bytes[start..start + self.line_bytes]
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Total data storage, in bytes, of every data array built in this process.
    pub fn total_size() -> u64 {
        DATA_STORAGE_BYTES.load(Ordering::Relaxed)
    }
}
