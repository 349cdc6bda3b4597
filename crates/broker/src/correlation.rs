//! External-to-internal request correlation.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use vrfbroker_types::{ExternalRequestId, InternalRequestId};

/// Write-once map from oracle-assigned ids to broker-assigned ids.
///
/// An entry is created exactly once, at submission, and read when the oracle
/// calls back. Entries are never removed or reassigned, so a late or repeated
/// callback always resolves to the same request.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    entries: HashMap<ExternalRequestId, InternalRequestId>,
}

impl CorrelationTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `external` belongs to `internal`.
    ///
    /// Returns false and leaves the existing entry untouched if `external`
    /// is already present. The broker checks [`contains`](Self::contains)
    /// first, so this never happens in practice.
    pub fn insert(&mut self, external: ExternalRequestId, internal: InternalRequestId) -> bool {
        match self.entries.entry(external) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(internal);
                true
            }
        }
    }

    /// Look up the internal id for an external id.
    pub fn resolve(&self, external: &ExternalRequestId) -> Option<InternalRequestId> {
        self.entries.get(external).copied()
    }

    /// Check if an external id is already correlated.
    pub fn contains(&self, external: &ExternalRequestId) -> bool {
        self.entries.contains_key(external)
    }

    /// Get the number of correlations recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
