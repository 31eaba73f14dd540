//! System components around the cache.
//!
//! This module holds the behavioral model of the memory the cache fills from and
//! writes back to.

/// Backing memory model and latency controllers.
pub mod memory;

pub use memory::MemoryModel;
