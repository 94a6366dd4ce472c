//! The lifecycle tick: the engine's single notion of elapsed time.
//!
//! The host invokes [`PostEngine::tick`] once per logical time step with a
//! non-decreasing `now`. The tick range-scans the active-poll queue up to
//! `now` and tallies each due poll in queue order; it never reads a clock
//! and schedules nothing, which is what keeps replays deterministic.

use crate::domain::entities::Timestamp;
use crate::domain::errors::EngineError;
use crate::domain::keys;
use crate::events::EventSink;
use crate::service::PostEngine;
use agora_store::ContentStore;
use tracing::{debug, warn};

impl<S: ContentStore, E: EventSink> PostEngine<S, E> {
    /// Close every poll whose end time has passed, in nondecreasing
    /// end-time order (ties broken by tenant, then post, then poll id -
    /// guaranteed by the queue key encoding). Returns the number of polls
    /// closed.
    ///
    /// A single poll with bad or missing data is logged and skipped so the
    /// remaining due polls still close; a storage failure aborts the tick.
    pub fn tick(&mut self, now: Timestamp) -> Result<u64, EngineError> {
        // Bounded scan: cost is the number of due entries, not queue size.
        let due = self.store().range_scan(
            &keys::active_poll_queue_prefix(),
            &keys::active_polls_due_end(now),
        )?;

        let mut closed = 0u64;
        for (key, _) in due {
            let (end_time, tenant, post_id, poll_id) = match keys::split_active_poll_key(&key) {
                Ok(parts) => parts,
                Err(err) => {
                    warn!(key = %hex::encode(&key), %err, "skipping malformed queue entry");
                    continue;
                }
            };
            debug_assert!(end_time <= now);

            match self.tally_poll(tenant, post_id, poll_id, now) {
                Ok(()) => closed += 1,
                Err(err) if err.is_store_error() => return Err(err),
                Err(err) => {
                    // Queue entry without usable poll data: index corruption
                    // scoped to this poll. The rest of the tick proceeds.
                    warn!(
                        tenant = tenant.0,
                        post = post_id.0,
                        poll = poll_id.0,
                        %err,
                        "failed to tally due poll"
                    );
                }
            }
        }

        if closed > 0 {
            debug!(now = now.0, closed, "lifecycle tick complete");
        }
        Ok(closed)
    }
}
