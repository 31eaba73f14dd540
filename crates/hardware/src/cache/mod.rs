//! Non-blocking Set-Associative Cache Controller.
//!
//! This module implements the cache between a trace-driven processor and a backing
//! memory. It provides:
//! 1. **Decomposition:** Tag/index/offset extraction for the configured geometry.
//! 2. **Lookup:** Hit detection and clean-victim search within a set.
//! 3. **Eviction:** Seeded random victim choice and writeback of dirty victims.
//! 4. **MSHRs:** A fixed table of outstanding misses that gates new requests.
//! 5. **Completion:** Installing fills and completing the request that missed.
//!
//! The blocking and non-blocking variants are the same controller with a one-entry or
//! an N-entry MSHR table; a direct-mapped cache is the one-way case.
//!
//! # Protocol
//!
//! `receive_request` either completes a hit synchronously, starts a miss and returns
//! `true`, or returns `false` (backpressure) without changing any state. A started miss
//! completes later through `receive_mem_response`.
//!
//! Contract violations by the caller (oversized, misaligned, or out-of-range accesses,
//! replies for unknown ids, wrongly sized fills) panic.

mod completion;
/// Address decomposition and cache geometry.
pub mod decoder;
mod evict;
/// Set scanning for hits and clean victims.
pub mod lookup;
/// Outstanding-miss table.
pub mod mshr;
/// Victim selection strategies.
pub mod policies;
/// Outbound processor and memory interfaces.
pub mod ports;
/// Tag and data arrays with footprint accounting.
pub mod storage;

use tracing::debug;

use self::decoder::{AddressDecoder, CacheGeometry};
use self::lookup::{Lookup, SetLookup};
use self::mshr::{MshrEntry, MshrTable};
use self::policies::{RandomPolicy, VictimPolicy};
use self::ports::{MemoryPort, ProcessorPort};
use self::storage::{LineState, SramArray, TagArray};
use crate::common::data::CpuRequest;
use crate::config::{CacheKind, Config};

/// Width of the modeled state field of a tag entry (valid + dirty).
const STATE_BITS: u32 = 2;

/// Set-associative cache with a table of outstanding misses.
pub struct CacheController {
    kind: CacheKind,
    decoder: AddressDecoder,
    tags: TagArray,
    data: SramArray,
    mshrs: MshrTable,
    policy: Box<dyn VictimPolicy>,
    blocked: bool,
}

impl std::fmt::Debug for CacheController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheController")
            .field("kind", &self.kind)
            .field("decoder", &self.decoder)
            .field("outstanding", &self.mshrs.occupancy())
            .field("blocked", &self.blocked)
            .finish_non_exhaustive()
    }
}

impl CacheController {
    /// Creates a cache controller.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Capacity, line size, ways, and address width.
    /// * `kind` - Blocking (one MSHR) or non-blocking.
    /// * `mshrs` - MSHR capacity for the non-blocking variant; ignored when blocking.
    /// * `policy` - Victim choice used when every eligible way is dirty.
    ///
    /// # Panics
    ///
    /// If the geometry cannot be realized (see [`AddressDecoder::new`]) or if a
    /// non-blocking cache is given zero MSHRs.
    pub fn new(
        geometry: &CacheGeometry,
        kind: CacheKind,
        mshrs: usize,
        policy: Box<dyn VictimPolicy>,
    ) -> Self {
        let decoder = AddressDecoder::new(geometry);
        let lines = geometry.lines();
        let capacity = match kind {
            CacheKind::Blocking => 1,
            CacheKind::NonBlocking => mshrs,
        };
        Self {
            kind,
            tags: TagArray::new(lines, STATE_BITS, decoder.tag_bits()),
            data: SramArray::new(lines, geometry.line_bytes),
            mshrs: MshrTable::new(capacity),
            decoder,
            policy,
            blocked: false,
        }
    }

    /// Creates a blocking cache: at most one miss outstanding.
    pub fn blocking(geometry: &CacheGeometry, policy: Box<dyn VictimPolicy>) -> Self {
        Self::new(geometry, CacheKind::Blocking, 1, policy)
    }

    /// Creates a non-blocking cache with `mshrs` outstanding misses.
    pub fn non_blocking(
        geometry: &CacheGeometry,
        mshrs: usize,
        policy: Box<dyn VictimPolicy>,
    ) -> Self {
        Self::new(geometry, CacheKind::NonBlocking, mshrs, policy)
    }

    /// Creates the cache described by `config`, with a seeded random victim policy.
    ///
    /// Call [`Config::validate`] first to turn geometry errors into a `ConfigError`
    /// instead of a panic.
    pub fn from_config(config: &Config) -> Self {
        let geometry = CacheGeometry {
            size_bytes: config.cache.size_bytes,
            line_bytes: config.memory.line_bytes,
            ways: config.cache.ways,
            addr_bits: config.processor.addr_bits,
        };
        Self::new(
            &geometry,
            config.cache.kind,
            config.cache.mshrs,
            Box::new(RandomPolicy::new(config.cache.seed)),
        )
    }

    /// Accepts, completes, or rejects a processor request.
    ///
    /// # Returns
    ///
    /// `true` if the request was completed (hit) or accepted as a miss; `false` if the
    /// cache cannot take it now and the caller must retry the identical request later.
    ///
    /// # Panics
    ///
    /// If the request is empty, larger than a line, not a power-of-two size, not
    /// naturally aligned, outside the address width, or carries a store payload whose
    /// length differs from `size`.
    pub fn receive_request(
        &mut self,
        req: &CpuRequest<'_>,
        memory: &mut dyn MemoryPort,
        processor: &mut dyn ProcessorPort,
    ) -> bool {
        self.check_request(req);

        if self.blocked {
            debug!(id = %req.id, "cache is blocked");
            return false;
        }

        match SetLookup::new(&self.decoder, &self.tags, req.address).classify() {
            Lookup::Hit(line) => {
                debug!(id = %req.id, address = req.address, line, "hit in cache");
                self.complete_hit(line, req, processor);
                true
            }
            Lookup::Miss => self.start_miss(req, memory),
        }
    }

    fn check_request(&self, req: &CpuRequest<'_>) {
        let line_bytes = self.decoder.line_bytes();
        assert!(
            req.size > 0 && req.size <= line_bytes,
            "request {} of {} bytes does not fit a {line_bytes}-byte line",
            req.id,
            req.size
        );
        assert!(
            req.size.is_power_of_two() && req.address % req.size as u64 == 0,
            "request {} at {:#x} is not naturally aligned to {} bytes",
            req.id,
            req.address,
            req.size
        );
        assert!(
            self.decoder.in_range(req.address),
            "request {} at {:#x} exceeds the {}-bit address space",
            req.id,
            req.address,
            self.decoder.addr_bits()
        );
        if let Some(data) = req.store {
            assert_eq!(
                data.len(),
                req.size,
                "store payload of request {} does not match its size",
                req.id
            );
        }
    }

    fn complete_hit(
        &mut self,
        line: usize,
        req: &CpuRequest<'_>,
        processor: &mut dyn ProcessorPort,
    ) {
        let range = self.access_range(req.address, req.size);
        match req.store {
            Some(data) => {
                self.data.line_mut(line)[range].copy_from_slice(data);
                self.tags.set_state(line, LineState::Dirty);
                processor.send_response(req.id, None);
            }
            None => processor.send_response(req.id, Some(&self.data.line(line)[range])),
        }
    }

    fn start_miss(&mut self, req: &CpuRequest<'_>, memory: &mut dyn MemoryPort) -> bool {
        let block = self.decoder.block_address(req.address);
        let block_mask = !(self.decoder.line_bytes() as u64 - 1);

        // A second fill for the same block would install its tag twice in one set.
        if self.mshrs.covers_block(block, block_mask) {
            debug!(id = %req.id, block, "block already has a fill in flight");
            return false;
        }

        let Some(line) = self.claim_victim(req.id, req.address, memory) else {
            debug!(id = %req.id, block, "every way of the set awaits a fill");
            return false;
        };

        debug!(id = %req.id, address = req.address, line, "miss in cache");
        memory.send_mem_request(block, self.decoder.line_bytes(), None, req.id);

        let slot = self.mshrs.allocate(MshrEntry {
            request_id: req.id,
            address: req.address,
            size: req.size,
            store: req.store.map(<[u8]>::to_vec),
            line,
        });
        self.blocked = self.mshrs.is_full();
        debug!(id = %req.id, slot, blocked = self.blocked, "MSHR allocated");
        true
    }

    fn access_range(&self, address: u64, size: usize) -> std::ops::Range<usize> {
        let offset = self.decoder.offset(address);
        offset..offset + size
    }

    /// Returns the state of the line holding `addr`'s block, if it is present.
    pub fn probe(&self, addr: u64) -> Option<LineState> {
        match SetLookup::new(&self.decoder, &self.tags, addr).classify() {
            Lookup::Hit(line) => Some(self.tags.state(line)),
            Lookup::Miss => None,
        }
    }

    /// Returns `true` while new requests are refused.
    pub const fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Variant this controller was built as.
    pub const fn kind(&self) -> CacheKind {
        self.kind
    }

    /// Address decoder for this geometry.
    pub const fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }

    /// Tag array.
    pub const fn tags(&self) -> &TagArray {
        &self.tags
    }

    /// Data array.
    pub const fn data(&self) -> &SramArray {
        &self.data
    }

    /// Outstanding misses.
    pub const fn mshrs(&self) -> &MshrTable {
        &self.mshrs
    }
}
