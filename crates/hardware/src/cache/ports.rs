//! Outbound interfaces of the cache.
//!
//! The cache talks to its neighbours only through these two traits. They are passed
//! into each protocol entry point rather than stored, so the simulator can own the
//! processor, the memory, and the cache side by side.

use crate::common::data::RequestId;

/// The memory below the cache.
pub trait MemoryPort {
    /// Issues a memory request.
    ///
    /// # Arguments
    ///
    /// * `address` - Block-aligned address of the line.
    /// * `size` - Number of bytes; always one full line.
    /// * `data` - `Some` for a store (writeback), `None` for a fill.
    /// * `id` - Correlation id echoed back by `receive_mem_response` for fills.
    ///   Stores are never answered.
    fn send_mem_request(&mut self, address: u64, size: usize, data: Option<&[u8]>, id: RequestId);
}

/// The processor above the cache.
pub trait ProcessorPort {
    /// Completes a previously accepted request.
    ///
    /// `data` holds the loaded bytes for a load and is `None` for a store. The slice
    /// is only valid for the duration of the call.
    fn send_response(&mut self, id: RequestId, data: Option<&[u8]>);
}
