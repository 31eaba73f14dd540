//! Victim selection and writeback.
//!
//! A miss needs a line slot in its set. A clean way is reused directly; if every
//! eligible way is dirty, the victim policy picks one and its contents are written to
//! memory before the slot is invalidated. Slots reserved by outstanding misses are
//! never eligible.

use tracing::debug;

use super::CacheController;
use super::lookup::SetLookup;
use super::ports::MemoryPort;
use super::storage::LineState;
use crate::common::data::RequestId;

impl CacheController {
    /// Frees a line slot in the set of `address` and returns it, now `Invalid`.
    ///
    /// Returns `None`, with no state changed, if every way is reserved.
    pub(super) fn claim_victim(
        &mut self,
        id: RequestId,
        address: u64,
        memory: &mut dyn MemoryPort,
    ) -> Option<usize> {
        let set = SetLookup::new(&self.decoder, &self.tags, address);
        let mshrs = &self.mshrs;
        let reserved = |line: usize| mshrs.reserves_line(line);

        let line = if let Some(line) = set.find_clean_victim(reserved) {
            line
        } else {
            let candidates = set.unreserved(reserved);
            if candidates.is_empty() {
                return None;
            }
            let pick = self.policy.pick_victim(candidates.len());
            assert!(
                pick < candidates.len(),
                "victim policy picked {pick} of {} candidates",
                candidates.len()
            );
            let line = candidates[pick];
            self.write_back(line, set.set(), id, memory);
            line
        };

        self.tags.set_state(line, LineState::Invalid);
        Some(line)
    }

    /// Sends the full contents of dirty `line` to memory.
    fn write_back(&self, line: usize, set: usize, id: RequestId, memory: &mut dyn MemoryPort) {
        let address = self.decoder.compose(self.tags.tag(line), set, 0);
        debug!(%id, line, address, "dirty, writing back");
        memory.send_mem_request(
            address,
            self.decoder.line_bytes(),
            Some(self.data.line(line)),
            id,
        );
    }
}
