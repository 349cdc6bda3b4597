//! Per-request lifecycle records.

use std::collections::BTreeMap;
use vrfbroker_types::{BlockHeight, InternalRequestId, RandomValue, RequestStatus, Timestamp};

/// Stored lifecycle state of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestRecord {
    /// Height after which the confirmation window has elapsed.
    pub lock_block: BlockHeight,
    /// Delivered value and time, once fulfilled.
    pub fulfillment: Option<Fulfillment>,
}

/// Value delivered for a request and when it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fulfillment {
    pub value: RandomValue,
    pub completed_at: Timestamp,
}

impl RequestRecord {
    fn status(&self) -> RequestStatus {
        match self.fulfillment {
            None => RequestStatus::Pending {
                lock_block: self.lock_block,
            },
            Some(Fulfillment {
                value,
                completed_at,
            }) => RequestStatus::Completed {
                lock_block: self.lock_block,
                value,
                completed_at,
            },
        }
    }
}

/// Outcome of [`RequestStore::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The record moved from pending to completed.
    Applied,
    /// The record was already completed; nothing changed.
    AlreadyCompleted,
    /// No record exists for the id; nothing changed.
    Missing,
}

/// Append-only log of request records, indexed by internal id.
///
/// Records are created pending, completed at most once, and never removed.
#[derive(Debug, Default)]
pub struct RequestStore {
    records: BTreeMap<InternalRequestId, RequestRecord>,
    completed: usize,
}

impl RequestStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending record.
    ///
    /// Returns false and changes nothing if a record already exists for `id`.
    pub fn init_pending(&mut self, id: InternalRequestId, lock_block: BlockHeight) -> bool {
        if self.records.contains_key(&id) {
            return false;
        }
        self.records.insert(
            id,
            RequestRecord {
                lock_block,
                fulfillment: None,
            },
        );
        true
    }

    /// Move a pending record to completed.
    pub fn complete(
        &mut self,
        id: InternalRequestId,
        value: RandomValue,
        completed_at: Timestamp,
    ) -> Completion {
        let Some(record) = self.records.get_mut(&id) else {
            return Completion::Missing;
        };

        if record.fulfillment.is_some() {
            return Completion::AlreadyCompleted;
        }

        record.fulfillment = Some(Fulfillment {
            value,
            completed_at,
        });
        self.completed += 1;
        Completion::Applied
    }

    /// Lifecycle state of `id`; `Unknown` if never created.
    pub fn query(&self, id: InternalRequestId) -> RequestStatus {
        self.records
            .get(&id)
            .map_or(RequestStatus::Unknown, RequestRecord::status)
    }

    /// Number of records still awaiting fulfillment.
    pub fn pending_count(&self) -> usize {
        self.records.len() - self.completed
    }

    /// Number of fulfilled records.
    pub fn completed_count(&self) -> usize {
        self.completed
    }

    /// Get the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
