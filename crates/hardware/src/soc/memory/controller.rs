//! Memory controller implementations for fill latency modeling.
//!
//! This module provides:
//! 1. **SimpleController:** Fixed latency per fill (no row-buffer modeling).
//! 2. **DramController:** Row-buffer-aware latency (CAS, RAS, precharge) for DRAM-style timing.
//!
//! With the DRAM controller, a fill to the open row can overtake an earlier fill that
//! had to open a new row, so the cache sees replies out of issue order.

use crate::config::{MemoryConfig, MemoryController as ControllerKind};

/// Trait for memory controller implementations that report access latency in ticks.
pub trait MemoryController: Send {
    /// Returns the number of ticks required for an access to the given address.
    ///
    /// # Arguments
    ///
    /// * `addr` - Block-aligned address being filled (may be used for row-buffer modeling).
    ///
    /// # Returns
    ///
    /// Latency in simulation ticks.
    fn access_latency(&mut self, addr: u64) -> u64;
}

/// Builds the controller selected by `config`.
pub fn from_config(config: &MemoryConfig) -> Box<dyn MemoryController> {
    match config.controller {
        ControllerKind::Simple => Box::new(SimpleController::new(config.latency)),
        ControllerKind::Dram => Box::new(DramController::new(
            config.t_cas,
            config.t_ras,
            config.t_pre,
        )),
    }
}

/// Fixed-latency memory controller; every access takes the same number of ticks.
#[derive(Clone, Debug)]
pub struct SimpleController {
    latency: u64,
}

impl SimpleController {
    /// Creates a simple controller with the given fixed latency in ticks.
    pub const fn new(latency: u64) -> Self {
        Self { latency }
    }
}

impl MemoryController for SimpleController {
    fn access_latency(&mut self, _addr: u64) -> u64 {
        self.latency
    }
}

/// DRAM-style controller with row buffer; models CAS, RAS, and precharge latencies.
#[derive(Clone, Debug)]
pub struct DramController {
    last_row: Option<u64>,
    t_cas: u64,
    t_ras: u64,
    t_pre: u64,
    row_mask: u64,
}

impl DramController {
    /// Creates a DRAM controller with the given timing parameters (in ticks).
    ///
    /// # Arguments
    ///
    /// * `t_cas` - Column access strobe latency.
    /// * `t_ras` - Row access strobe latency.
    /// * `t_pre` - Precharge latency.
    ///
    /// # Returns
    ///
    /// A new `DramController` with no row currently open.
    pub const fn new(t_cas: u64, t_ras: u64, t_pre: u64) -> Self {
        Self {
            last_row: None,
            t_cas,
            t_ras,
            t_pre,
            row_mask: !2047,
        }
    }
}

impl MemoryController for DramController {
    fn access_latency(&mut self, addr: u64) -> u64 {
        let row = addr & self.row_mask;
        match self.last_row {
            Some(open_row) if open_row == row => self.t_cas,
            Some(_) => {
                self.last_row = Some(row);
                self.t_pre + self.t_ras + self.t_cas
            }
            None => {
                self.last_row = Some(row);
                self.t_ras + self.t_cas
            }
        }
    }
}
