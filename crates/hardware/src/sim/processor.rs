//! Trace-replaying processor model.
//!
//! Issues trace records to the cache in order, one attempt per tick, retrying a
//! rejected record identically until it is accepted. Every request gets a unique id
//! (its record index). A byte-granular shadow memory, updated in acceptance order,
//! supplies the expected value of each load so that completions can be checked.

use std::collections::HashMap;

use tracing::trace;

use super::loader::TraceRecord;
use crate::cache::ports::ProcessorPort;
use crate::common::data::{AccessType, RequestId};
use crate::common::error::SimError;
use crate::soc::memory::initial_byte;

#[derive(Debug)]
struct Pending {
    address: u64,
    /// Expected load data; `None` for stores.
    expected: Option<Vec<u8>>,
}

/// Processor that replays a recorded access sequence.
#[derive(Debug)]
pub struct TraceProcessor {
    records: Vec<TraceRecord>,
    cursor: usize,
    outstanding: HashMap<RequestId, Pending>,
    shadow: HashMap<u64, u8>,
    verify: bool,
    completed: usize,
    fault: Option<SimError>,
}

impl TraceProcessor {
    /// Creates a processor for `records`; `verify` enables load checking.
    pub fn new(records: Vec<TraceRecord>, verify: bool) -> Self {
        Self {
            records,
            cursor: 0,
            outstanding: HashMap::new(),
            shadow: HashMap::new(),
            verify,
            completed: 0,
            fault: None,
        }
    }

    /// Registers the next record as in flight and returns it with its id.
    ///
    /// Must be followed by exactly one of [`accept`](Self::accept) or
    /// [`reject`](Self::reject) once the cache has answered.
    pub fn prepare(&mut self) -> Option<(RequestId, TraceRecord)> {
        let record = self.records.get(self.cursor)?.clone();
        let id = RequestId(self.cursor as u64);
        let expected = match record.kind {
            AccessType::Read => Some(self.shadow_read(record.address, record.size)),
            AccessType::Write => None,
        };
        let _ = self.outstanding.insert(
            id,
            Pending {
                address: record.address,
                expected,
            },
        );
        Some((id, record))
    }

    /// The cache accepted request `id`; stores take effect in the shadow now.
    pub fn accept(&mut self, id: RequestId) {
        let record = &self.records[self.cursor];
        debug_assert_eq!(id.val(), self.cursor as u64);
        if record.kind == AccessType::Write {
            for (addr, byte) in (record.address..).zip(&record.data) {
                let _ = self.shadow.insert(addr, *byte);
            }
        }
        self.cursor += 1;
    }

    /// The cache rejected request `id`; it will be offered again next tick.
    pub fn reject(&mut self, id: RequestId) {
        trace!(%id, "request rejected, retrying");
        let _ = self.outstanding.remove(&id);
    }

    fn shadow_read(&self, address: u64, size: usize) -> Vec<u8> {
        (address..address + size as u64)
            .map(|addr| self.shadow.get(&addr).copied().unwrap_or_else(|| initial_byte(addr)))
            .collect()
    }

    fn record_fault(&mut self, fault: SimError) {
        if self.fault.is_none() {
            self.fault = Some(fault);
        }
    }

    /// Takes the first correctness fault observed, if any.
    pub fn take_fault(&mut self) -> Option<SimError> {
        self.fault.take()
    }

    /// Returns `true` once every record was accepted and completed.
    pub fn is_done(&self) -> bool {
        self.cursor == self.records.len() && self.outstanding.is_empty()
    }

    /// Number of completed requests.
    pub const fn completed(&self) -> usize {
        self.completed
    }

    /// Number of records accepted so far.
    pub const fn issued(&self) -> usize {
        self.cursor
    }

    /// Number of accepted requests still waiting for completion.
    pub fn in_flight(&self) -> usize {
        self.outstanding.len()
    }
}

impl ProcessorPort for TraceProcessor {
    fn send_response(&mut self, id: RequestId, data: Option<&[u8]>) {
        let Some(pending) = self.outstanding.remove(&id) else {
            self.record_fault(SimError::UnexpectedResponse(id));
            return;
        };
        self.completed += 1;
        trace!(%id, "request complete");

        if let (true, Some(expected)) = (self.verify, pending.expected) {
            let actual = data.unwrap_or_default();
            if actual != expected.as_slice() {
                self.record_fault(SimError::DataMismatch {
                    id,
                    address: pending.address,
                    expected,
                    actual: actual.to_vec(),
                });
            }
        }
    }
}
