//! Service-side table correlating sequence numbers to pending requests.
//!
//! Draining the FIFO and answering are decoupled on purpose: the transport
//! allows many requests in flight per service, and answers may be produced
//! in any order (e.g. across an application-level async boundary). A
//! request taken off the FIFO parks here, keyed by its sequence number,
//! until the application sends the matching response.

use crate::domain::records::QueryRecord;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;

/// Map from sequence number to the pending request awaiting an answer.
pub struct CorrelationTable {
    entries: Mutex<HashMap<i64, QueryRecord>>,
}

impl CorrelationTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Park `query` under `sequence_number`.
    ///
    /// Sequence numbers are transport-unique per service, but the table
    /// defends against duplicates: if the key is already present nothing
    /// is mutated and the rejected record is handed back to the caller,
    /// who still owns it.
    pub fn register(&self, sequence_number: i64, query: QueryRecord) -> Result<(), QueryRecord> {
        let mut entries = self.lock_entries();
        match entries.entry(sequence_number) {
            Entry::Occupied(_) => Err(query),
            Entry::Vacant(slot) => {
                slot.insert(query);
                Ok(())
            }
        }
    }

    /// Detach and return the request parked under `sequence_number`.
    ///
    /// An absent key (already answered, or never registered) yields the
    /// empty result; the two cases are indistinguishable and neither is
    /// an error.
    pub fn claim(&self, sequence_number: i64) -> Option<QueryRecord> {
        self.lock_entries().remove(&sequence_number)
    }

    /// Number of requests currently awaiting an answer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// Whether no requests are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<i64, QueryRecord>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new()
    }
}
