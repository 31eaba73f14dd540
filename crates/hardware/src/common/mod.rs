//! Common types shared by the cache, the behavioral models, and the simulator.
//!
//! This module provides:
//! 1. **Requests:** Request identifiers and the processor-side access descriptor.
//! 2. **Access Types:** Read/Write classification of processor accesses.
//! 3. **Error Handling:** Typed errors for configuration, trace loading, and simulation.

/// Request identifiers, access types, and processor requests.
pub mod data;

/// Error types for configuration, trace loading, and simulation.
pub mod error;

pub use data::{AccessType, CpuRequest, RequestId};
pub use error::{ConfigError, SimError, TraceError};
