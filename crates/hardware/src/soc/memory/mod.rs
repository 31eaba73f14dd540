//! Backing Memory Model.
//!
//! This module implements the memory below the cache. It provides:
//! 1. **Storage:** A sparse, line-granular backing store with a deterministic initial
//!    byte pattern, so untouched memory is still checkable.
//! 2. **Requests:** Stores (writebacks) are applied immediately and never answered;
//!    fills are answered after a controller-chosen latency.
//! 3. **Controller:** Latency modeling (simple or DRAM row-buffer) for timing simulation.

/// Memory controller implementations for access latency modeling.
pub mod controller;

use std::collections::HashMap;

use tracing::trace;

use self::controller::MemoryController;
use crate::cache::ports::MemoryPort;
use crate::common::data::RequestId;
use crate::config::MemoryConfig;

/// Value of a byte that has never been written.
///
/// Shared with the processor model so that loads of untouched memory can be verified.
pub const fn initial_byte(addr: u64) -> u8 {
    (addr ^ (addr >> 8) ^ (addr >> 16) ^ (addr >> 24) ^ 0x5A) as u8
}

/// A completed fill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemResponse {
    /// Correlation id given with the fill request.
    pub id: RequestId,
    /// One line of data.
    pub data: Box<[u8]>,
}

#[derive(Debug)]
struct PendingFill {
    ready_at: u64,
    seq: u64,
    response: MemResponse,
}

/// Line-granular backing memory with latency-modeled fills.
pub struct MemoryModel {
    line_bytes: usize,
    lines: HashMap<u64, Box<[u8]>>,
    controller: Box<dyn MemoryController>,
    pending: Vec<PendingFill>,
    now: u64,
    seq: u64,
}

impl std::fmt::Debug for MemoryModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryModel")
            .field("line_bytes", &self.line_bytes)
            .field("resident_lines", &self.lines.len())
            .field("pending", &self.pending.len())
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl MemoryModel {
    /// Creates a memory with `line_bytes`-byte lines and the given latency model.
    ///
    /// # Panics
    ///
    /// If `line_bytes` is not a power of two.
    pub fn new(line_bytes: usize, controller: Box<dyn MemoryController>) -> Self {
        assert!(
            line_bytes.is_power_of_two(),
            "line size {line_bytes} is not a power of two"
        );
        Self {
            line_bytes,
            lines: HashMap::new(),
            controller,
            pending: Vec::new(),
            now: 0,
            seq: 0,
        }
    }

    /// Creates the memory described by `config`.
    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(config.line_bytes, controller::from_config(config))
    }

    /// Advances time by one tick and returns the fills that are due, in issue order
    /// among fills due on the same tick.
    pub fn tick(&mut self) -> Vec<MemResponse> {
        self.now += 1;
        let now = self.now;
        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|fill| fill.ready_at <= now);
        self.pending = waiting;
        due.sort_by_key(|fill| (fill.ready_at, fill.seq));
        for fill in &due {
            trace!(id = %fill.response.id, now, "fill due");
        }
        due.into_iter().map(|fill| fill.response).collect()
    }

    /// Returns a copy of the line containing `addr`.
    pub fn read_line(&self, addr: u64) -> Box<[u8]> {
        let base = addr & !(self.line_bytes as u64 - 1);
        self.lines.get(&base).cloned().unwrap_or_else(|| {
            (0..self.line_bytes as u64)
                .map(|i| initial_byte(base + i))
                .collect()
        })
    }

    /// Returns `len` bytes starting at `addr`, which must lie within one line.
    pub fn read(&self, addr: u64, len: usize) -> Vec<u8> {
        let offset = (addr & (self.line_bytes as u64 - 1)) as usize;
        self.read_line(addr)[offset..offset + len].to_vec()
    }

    /// Number of fills not yet delivered.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Current tick.
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> usize {
        self.line_bytes
    }
}

impl MemoryPort for MemoryModel {
    fn send_mem_request(&mut self, address: u64, size: usize, data: Option<&[u8]>, id: RequestId) {
        assert_eq!(
            size, self.line_bytes,
            "memory request {id} is not one line long"
        );
        assert_eq!(
            address & (self.line_bytes as u64 - 1),
            0,
            "memory request {id} at {address:#x} is not line-aligned"
        );

        match data {
            Some(bytes) => {
                trace!(%id, address, "store");
                let _ = self.lines.insert(address, bytes.into());
            }
            None => {
                let latency = self.controller.access_latency(address).max(1);
                trace!(%id, address, latency, "fill");
                self.pending.push(PendingFill {
                    ready_at: self.now + latency,
                    seq: self.seq,
                    response: MemResponse {
                        id,
                        data: self.read_line(address),
                    },
                });
                self.seq += 1;
            }
        }
    }
}
