//! Fill completion.
//!
//! Matches a memory reply to its MSHR entry, installs the line, completes the request
//! that missed as if it had hit, and frees the entry.

use tracing::debug;

use super::CacheController;
use super::ports::ProcessorPort;
use super::storage::LineState;
use crate::common::data::RequestId;

impl CacheController {
    /// Handles a line fill returned by memory.
    ///
    /// `data` is a view of exactly one line that is only valid during the call; it is
    /// copied into the data array.
    ///
    /// # Panics
    ///
    /// If `data` is not one line long or no outstanding miss carries `id`.
    pub fn receive_mem_response(
        &mut self,
        id: RequestId,
        data: &[u8],
        processor: &mut dyn ProcessorPort,
    ) {
        assert_eq!(
            data.len(),
            self.decoder.line_bytes(),
            "fill for request {id} is not one line long"
        );
        let Some(slot) = self.mshrs.find(id) else {
            panic!("memory response for request {id} matches no outstanding miss");
        };
        let entry = self.mshrs.release(slot);
        let line = entry.line;
        debug_assert_eq!(self.tags.state(line), LineState::Invalid);

        self.data.line_mut(line).copy_from_slice(data);
        self.tags.set_state(line, LineState::Valid);
        self.tags.set_tag(line, self.decoder.tag(entry.address));

        let range = self.access_range(entry.address, entry.size);
        match entry.store {
            Some(bytes) => {
                self.data.line_mut(line)[range].copy_from_slice(&bytes);
                self.tags.set_state(line, LineState::Dirty);
                processor.send_response(entry.request_id, None);
            }
            None => processor.send_response(entry.request_id, Some(&self.data.line(line)[range])),
        }

        self.blocked = self.mshrs.is_full();
        debug!(%id, slot, line, blocked = self.blocked, "fill complete");
    }
}
