//! Error definitions.
//!
//! This module defines the recoverable failures of the simulator. It provides:
//! 1. **Configuration Errors:** Unreadable JSON and cache geometry that cannot be built.
//! 2. **Trace Errors:** I/O failures and malformed trace lines (with line numbers).
//! 3. **Simulation Errors:** Invalid records, tick-limit exhaustion, and correctness faults
//!    detected by the processor model.
//!
//! Contract violations inside the cache protocol are not represented here: they indicate a
//! malformed caller and abort the run with a panic.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::data::RequestId;

/// Configuration could not be loaded or describes an impossible cache.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read config '{path}': {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration text is not valid JSON for [`Config`](crate::config::Config).
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A field has a value the cache cannot be constructed with.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field, e.g. `cache.ways`.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A trace file could not be read or parsed.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be read.
    #[error("could not read trace '{path}': {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A line of the trace is malformed.
    #[error("trace line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
}

/// A simulation could not be set up or did not complete correctly.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Trace could not be loaded.
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// A trace record cannot legally be presented to the configured cache.
    #[error("record {index} ({address:#x}, {size} bytes): {reason}")]
    InvalidRecord {
        /// 0-based record index.
        index: usize,
        /// Address of the record.
        address: u64,
        /// Size of the record.
        size: usize,
        /// Violated constraint.
        reason: &'static str,
    },

    /// The run did not finish within the configured number of ticks.
    #[error("simulation did not finish within {0} ticks")]
    TickLimit(u64),

    /// The processor received a completion it was not waiting for.
    #[error("unexpected response for request {0}")]
    UnexpectedResponse(RequestId),

    /// A load returned data that differs from the processor's shadow memory.
    #[error("request {id} at {address:#x}: expected {expected:02x?}, got {actual:02x?}")]
    DataMismatch {
        /// Request whose data was wrong.
        id: RequestId,
        /// Address of the load.
        address: u64,
        /// Bytes the shadow memory holds.
        expected: Vec<u8>,
        /// Bytes the cache returned.
        actual: Vec<u8>,
    },
}
