//! Processor Request Types.
//!
//! This module defines the values exchanged between the processor and the cache:
//! 1. **Identification:** `RequestId` correlates a completion with the request that caused it.
//! 2. **Classification:** `AccessType` distinguishes loads from stores.
//! 3. **Requests:** `CpuRequest` carries address, size, and an optional store payload.

use std::fmt;

/// Identifier of a processor request.
///
/// The processor chooses ids; ids of requests outstanding at the same time must be
/// unique. The cache reuses the id as the correlation id of the fill it issues, so the
/// memory reply carries it back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Returns the raw id value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type of processor access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Load: the completion returns `size` bytes.
    Read,

    /// Store: the completion carries no data.
    Write,
}

/// A single processor access as seen by the cache.
///
/// The store payload is borrowed for the duration of `receive_request` only; the cache
/// copies it if the store has to wait for a fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuRequest<'a> {
    /// Identifier used when completing this request.
    pub id: RequestId,
    /// Physical address of the first byte accessed.
    pub address: u64,
    /// Access size in bytes; the address must be naturally aligned to it.
    pub size: usize,
    /// Bytes to store, or `None` for a load.
    pub store: Option<&'a [u8]>,
}

impl<'a> CpuRequest<'a> {
    /// Creates a load of `size` bytes at `address`.
    pub const fn load(id: RequestId, address: u64, size: usize) -> Self {
        Self {
            id,
            address,
            size,
            store: None,
        }
    }

    /// Creates a store of `data` at `address`; the size is `data.len()`.
    pub const fn store(id: RequestId, address: u64, data: &'a [u8]) -> Self {
        Self {
            id,
            address,
            size: data.len(),
            store: Some(data),
        }
    }

    /// Returns whether this request reads or writes.
    pub const fn kind(&self) -> AccessType {
        if self.store.is_some() {
            AccessType::Write
        } else {
            AccessType::Read
        }
    }
}
