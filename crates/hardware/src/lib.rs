//! Trace-driven cache simulator library.
//!
//! This crate models a CPU-side cache between a processor replaying a recorded access
//! trace and a backing memory:
//! 1. **Cache:** Non-blocking set-associative controller with MSHRs, dirty writeback,
//!    and backpressure; the blocking and direct-mapped caches are special cases.
//! 2. **Memory:** Line-granular backing store with simple or DRAM-style fill latency.
//! 3. **Simulation:** Trace loader, verifying processor model, and the tick loop.
//! 4. **Configuration:** JSON-deserializable geometry and timing parameters.
//! 5. **Reporting:** Aggregate tag and data storage footprint.

/// Cache controller, address decoding, MSHRs, and storage arrays.
pub mod cache;
/// Common types (request ids, access types, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Trace loading, processor model, and the tick loop.
pub mod sim;
/// Memory model below the cache.
pub mod soc;
/// Storage footprint reporting.
pub mod stats;

/// Main cache type; drive it with `receive_request` and `receive_mem_response`.
pub use crate::cache::CacheController;
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Tick loop over processor, cache, and memory.
pub use crate::sim::Simulator;
