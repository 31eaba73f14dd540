//! Storage footprint reporting.
//!
//! Every tag and data array adds its size to a process-wide counter when it is built.
//! This module snapshots those counters for the end-of-run report.

use std::fmt;

use crate::cache::storage::{SramArray, TagArray};

/// Aggregate cache storage built during this run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StorageFootprint {
    /// Bytes of data storage across all caches.
    pub data_bytes: u64,
    /// Bytes of tag (state + tag) storage across all caches.
    pub tag_bytes: u64,
}

impl StorageFootprint {
    /// Reads the current counters.
    pub fn snapshot() -> Self {
        Self {
            data_bytes: SramArray::total_size(),
            tag_bytes: TagArray::total_size(),
        }
    }

    /// Data storage in KiB.
    pub fn data_kib(&self) -> f64 {
        self.data_bytes as f64 / 1024.0
    }

    /// Tag storage in KiB.
    pub fn tag_kib(&self) -> f64 {
        self.tag_bytes as f64 / 1024.0
    }
}

impl fmt::Display for StorageFootprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Data size: {}KB", self.data_kib())?;
        write!(f, "Tag size: {}KB", self.tag_kib())
    }
}
