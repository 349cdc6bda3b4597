//! Sequential request identifier allocation.

use vrfbroker_types::InternalRequestId;

/// Hands out internal request ids 1, 2, 3, ...
///
/// Id 0 is never returned; it stays reserved as "no request".
#[derive(Debug, Default)]
pub struct IdentifierAllocator {
    last: InternalRequestId,
}

impl IdentifierAllocator {
    /// Create an allocator whose first id will be 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> InternalRequestId {
        self.last = self.last.next();
        self.last
    }

    /// Number of ids handed out so far, which is also the last id allocated.
    pub fn last(&self) -> u64 {
        self.last.as_u64()
    }
}
