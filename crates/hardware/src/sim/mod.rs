//! Trace-driven simulation.
//!
//! This module provides the pieces around the cache that make a runnable simulator:
//! 1. **Loader:** Parses the text trace format into records.
//! 2. **Processor:** Replays records, retries on backpressure, and verifies loads.
//! 3. **Simulator:** The tick loop that wires processor, cache, and memory together.

/// Trace file parsing.
pub mod loader;

/// Trace-replaying processor model.
pub mod processor;

/// Tick loop.
pub mod simulator;

pub use loader::{TraceRecord, load_trace, parse_trace};
pub use processor::TraceProcessor;
pub use simulator::{SimSummary, Simulator};
