//! Address Decomposition.
//!
//! Splits a physical address into `(tag, set index, block offset)` for a fixed cache
//! geometry, and rebuilds an address from those fields:
//!
//! ```text
//!  addr_bits-1              line_bits+index_bits   line_bits          0
//! +--------------------------+---------------------+-------------------+
//! |           tag            |      set index      |   block offset    |
//! +--------------------------+---------------------+-------------------+
//! ```
//!
//! The decoder is derived once at construction and is immutable afterwards.

/// Construction parameters of a cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheGeometry {
    /// Total data capacity in bytes.
    pub size_bytes: usize,
    /// Line size in bytes (power of two), set by the memory below the cache.
    pub line_bytes: usize,
    /// Associativity.
    pub ways: usize,
    /// Address width in bits, set by the processor above the cache.
    pub addr_bits: u32,
}

impl CacheGeometry {
    /// Total number of line slots.
    pub const fn lines(&self) -> usize {
        self.size_bytes / self.line_bytes
    }

    /// Number of sets.
    pub const fn sets(&self) -> usize {
        self.lines() / self.ways
    }
}

/// Pure address decomposition for one cache geometry.
#[derive(Clone, Debug)]
pub struct AddressDecoder {
    line_bytes: usize,
    line_bits: u32,
    index_bits: u32,
    tag_bits: u32,
    addr_bits: u32,
    index_mask: u64,
    sets: usize,
    ways: usize,
}

impl AddressDecoder {
    /// Derives the decoder for `geometry`.
    ///
    /// # Panics
    ///
    /// On any geometry the cache cannot realize: zero ways, a line size that is not a
    /// power of two, a capacity that is not a whole number of lines, ways that do not
    /// evenly divide the line count, a set count that is not a power of two, or an
    /// address width too narrow for the offset and index fields.
    pub fn new(geometry: &CacheGeometry) -> Self {
        let CacheGeometry {
            size_bytes,
            line_bytes,
            ways,
            addr_bits,
        } = *geometry;

        assert!(ways > 0, "cache needs at least one way");
        assert!(
            line_bytes.is_power_of_two(),
            "line size {line_bytes} is not a power of two"
        );
        assert!(
            size_bytes > 0 && size_bytes % line_bytes == 0,
            "cache size {size_bytes} is not a whole number of {line_bytes}-byte lines"
        );
        let lines = geometry.lines();
        assert!(
            lines % ways == 0,
            "{ways} ways cannot be realized with {lines} lines"
        );
        let sets = geometry.sets();
        assert!(sets.is_power_of_two(), "{sets} sets is not a power of two");
        assert!(
            (1..=64).contains(&addr_bits),
            "address width {addr_bits} is outside 1..=64"
        );

        let line_bits = line_bytes.trailing_zeros();
        let index_bits = sets.trailing_zeros();
        assert!(
            line_bits + index_bits <= addr_bits,
            "{addr_bits}-bit addresses cannot hold {line_bits} offset and {index_bits} index bits"
        );

        Self {
            line_bytes,
            line_bits,
            index_bits,
            tag_bits: addr_bits - index_bits - line_bits,
            addr_bits,
            index_mask: (sets as u64) - 1,
            sets,
            ways,
        }
    }

    /// Returns the set index of `addr`.
    #[inline]
    pub const fn index(&self, addr: u64) -> usize {
        ((addr >> self.line_bits) & self.index_mask) as usize
    }

    /// Returns the byte offset of `addr` within its line.
    #[inline]
    pub const fn offset(&self, addr: u64) -> usize {
        (addr & (self.line_bytes as u64 - 1)) as usize
    }

    /// Returns the tag of `addr`.
    #[inline]
    pub const fn tag(&self, addr: u64) -> u64 {
        match addr.checked_shr(self.tag_shift()) {
            Some(tag) => tag,
            None => 0,
        }
    }

    /// Rebuilds an address from its fields; the inverse of `tag`/`index`/`offset`.
    #[inline]
    pub const fn compose(&self, tag: u64, index: usize, offset: usize) -> u64 {
        let tag_part = match tag.checked_shl(self.tag_shift()) {
            Some(part) => part,
            None => 0,
        };
        tag_part | ((index as u64) << self.line_bits) | offset as u64
    }

    /// Returns `addr` with its block offset cleared.
    #[inline]
    pub const fn block_address(&self, addr: u64) -> u64 {
        addr & !(self.line_bytes as u64 - 1)
    }

    /// Returns the slot number of `way` within `set`.
    #[inline]
    pub const fn line_index(&self, set: usize, way: usize) -> usize {
        set * self.ways + way
    }

    /// Returns whether `addr` fits in the configured address width.
    #[inline]
    pub const fn in_range(&self, addr: u64) -> bool {
        match addr.checked_shr(self.addr_bits) {
            Some(high) => high == 0,
            None => true,
        }
    }

    const fn tag_shift(&self) -> u32 {
        self.addr_bits - self.tag_bits
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Number of offset bits.
    pub const fn line_bits(&self) -> u32 {
        self.line_bits
    }

    /// Number of index bits.
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Number of tag bits.
    pub const fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// Address width in bits.
    pub const fn addr_bits(&self) -> u32 {
        self.addr_bits
    }

    /// Number of sets.
    pub const fn sets(&self) -> usize {
        self.sets
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.ways
    }
}
