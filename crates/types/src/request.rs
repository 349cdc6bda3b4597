//! Request lifecycle and pricing types shared across crates.

use crate::{AccountId, BlockHeight, ExternalRequestId, InternalRequestId, Timestamp, Word};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Random output delivered by the oracle network.
///
/// Zero is a legitimate value; completion is tracked by [`RequestStatus`],
/// never by inspecting the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RandomValue(pub Word);

impl From<u64> for RandomValue {
    fn from(value: u64) -> Self {
        RandomValue(Word::from_u64(value))
    }
}

impl fmt::Display for RandomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fee amount in the smallest unit of the fee token.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FeeAmount(pub u128);

impl fmt::Display for FeeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price of one request, in a given fee token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    /// Token the fee is denominated in.
    pub token: AccountId,
    /// Amount charged for one request at the current callback limit.
    pub amount: FeeAmount,
}

/// Parameters handed to the oracle network for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Resource limit for the fulfillment callback.
    pub callback_limit: u32,
    /// Confirmations the oracle must wait before fulfilling.
    pub confirmations: u16,
    /// Number of random words requested.
    pub num_words: u32,
}

/// What the caller gets back from a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Broker-assigned identifier for the new request.
    pub request_id: InternalRequestId,
    /// Identifier the oracle assigned to the same request.
    pub external_id: ExternalRequestId,
    /// Height after which the confirmation window has elapsed (advisory).
    pub lock_block: BlockHeight,
}

/// Lifecycle state of a request as seen through the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// No request was ever allocated with this identifier.
    Unknown,

    /// Submitted, awaiting fulfillment.
    Pending {
        /// Advisory confirmation height.
        lock_block: BlockHeight,
    },

    /// Fulfilled by the oracle.
    Completed {
        /// Advisory confirmation height recorded at submission.
        lock_block: BlockHeight,
        /// Delivered random value.
        value: RandomValue,
        /// Chain time at which the value arrived.
        completed_at: Timestamp,
    },
}

impl RequestStatus {
    /// Whether the request has been fulfilled.
    pub fn is_complete(&self) -> bool {
        matches!(self, RequestStatus::Completed { .. })
    }

    /// Delivered value, if fulfilled.
    pub fn value(&self) -> Option<RandomValue> {
        match self {
            RequestStatus::Completed { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Completion time, if fulfilled.
    pub fn completed_at(&self) -> Option<Timestamp> {
        match self {
            RequestStatus::Completed { completed_at, .. } => Some(*completed_at),
            _ => None,
        }
    }

    /// Lock block, if the request exists.
    pub fn lock_block(&self) -> Option<BlockHeight> {
        match self {
            RequestStatus::Unknown => None,
            RequestStatus::Pending { lock_block } | RequestStatus::Completed { lock_block, .. } => {
                Some(*lock_block)
            }
        }
    }
}

/// Current tip of the chain as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChainHead {
    /// Height of the latest block.
    pub height: BlockHeight,
    /// Timestamp of the latest block.
    pub timestamp: Timestamp,
}

impl ChainHead {
    /// Create a chain head.
    pub fn new(height: BlockHeight, timestamp: Timestamp) -> Self {
        Self { height, timestamp }
    }

    /// Head of the next block, `interval_secs` later.
    pub fn advance(self, interval_secs: u64) -> Self {
        Self {
            height: self.height.next(),
            timestamp: Timestamp(self.timestamp.0.saturating_add(interval_secs)),
        }
    }
}
