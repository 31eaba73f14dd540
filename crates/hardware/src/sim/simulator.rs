//! Simulator: owns the processor, the cache, and the memory side by side.
//!
//! Each tick runs the participants in a fixed order:
//! 1. Memory delivers every fill that is due; the cache completes the matching requests.
//! 2. The processor offers its next record to the cache (or retries a rejected one).
//!
//! Because the three are separate fields, the cache can be handed `&mut` views of the
//! other two for the duration of each call without any shared ownership.

use tracing::{debug, info};

use super::loader::TraceRecord;
use super::processor::TraceProcessor;
use crate::cache::CacheController;
use crate::cache::decoder::AddressDecoder;
use crate::common::data::{AccessType, CpuRequest};
use crate::common::error::SimError;
use crate::config::Config;
use crate::soc::memory::MemoryModel;

/// Outcome of a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimSummary {
    /// Ticks simulated.
    pub ticks: u64,
    /// Requests completed.
    pub requests: usize,
}

/// Top-level simulator: processor, cache, and memory.
#[derive(Debug)]
pub struct Simulator {
    /// The cache under test.
    pub cache: CacheController,
    /// Backing memory.
    pub memory: MemoryModel,
    /// Trace-replaying processor.
    pub processor: TraceProcessor,
    ticks: u64,
    max_ticks: u64,
}

impl Simulator {
    /// Builds a simulator for `records` under `config`.
    ///
    /// Rejects configurations the cache cannot be built with and records it would
    /// treat as contract violations.
    pub fn new(config: &Config, records: Vec<TraceRecord>) -> Result<Self, SimError> {
        config.validate()?;
        let cache = CacheController::from_config(config);
        for (index, record) in records.iter().enumerate() {
            check_record(cache.decoder(), index, record)?;
        }
        Ok(Self {
            cache,
            memory: MemoryModel::from_config(&config.memory),
            processor: TraceProcessor::new(records, config.general.verify),
            ticks: 0,
            max_ticks: config.general.max_ticks,
        })
    }

    /// Advances the simulation by one tick.
    pub fn tick(&mut self) -> Result<(), SimError> {
        self.ticks += 1;

        for response in self.memory.tick() {
            self.cache
                .receive_mem_response(response.id, &response.data, &mut self.processor);
        }

        if let Some((id, record)) = self.processor.prepare() {
            let req = match record.kind {
                AccessType::Read => CpuRequest::load(id, record.address, record.size),
                AccessType::Write => CpuRequest::store(id, record.address, &record.data),
            };
            if self
                .cache
                .receive_request(&req, &mut self.memory, &mut self.processor)
            {
                self.processor.accept(id);
            } else {
                self.processor.reject(id);
            }
        }

        self.processor.take_fault().map_or(Ok(()), Err)
    }

    /// Ticks until every record has completed.
    pub fn run(&mut self) -> Result<SimSummary, SimError> {
        info!(kind = ?self.cache.kind(), "running simulation");
        while !self.is_done() {
            if self.ticks >= self.max_ticks {
                return Err(SimError::TickLimit(self.max_ticks));
            }
            self.tick()?;
            if self.ticks % 100_000 == 0 {
                debug!(
                    ticks = self.ticks,
                    issued = self.processor.issued(),
                    in_flight = self.processor.in_flight(),
                    "progress"
                );
            }
        }
        let summary = SimSummary {
            ticks: self.ticks,
            requests: self.processor.completed(),
        };
        info!(ticks = summary.ticks, requests = summary.requests, "simulation done");
        Ok(summary)
    }

    /// Returns `true` once every record completed and memory is idle.
    pub fn is_done(&self) -> bool {
        self.processor.is_done() && self.memory.pending() == 0
    }

    /// Ticks simulated so far.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn check_record(
    decoder: &AddressDecoder,
    index: usize,
    record: &TraceRecord,
) -> Result<(), SimError> {
    let reason = if record.size == 0
        || record.size > decoder.line_bytes()
        || !record.size.is_power_of_two()
    {
        Some("size must be a power of two no larger than a line")
    } else if record.address % record.size as u64 != 0 {
        Some("address is not naturally aligned")
    } else if !decoder.in_range(record.address) {
        Some("address is outside the processor address space")
    } else if record.kind == AccessType::Write && record.data.len() != record.size {
        Some("store data length differs from size")
    } else {
        None
    };

    reason.map_or(Ok(()), |reason| {
        Err(SimError::InvalidRecord {
            index,
            address: record.address,
            size: record.size,
            reason,
        })
    })
}
