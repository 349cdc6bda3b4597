//! Domain-specific identifier types.

use crate::Word;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broker-assigned request identifier.
///
/// Allocated sequentially starting at 1. The value 0 is reserved and never
/// handed out, so it can never name a real request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct InternalRequestId(pub u64);

impl InternalRequestId {
    /// Reserved identifier, never assigned.
    pub const RESERVED: Self = InternalRequestId(0);

    /// Get the next identifier in sequence.
    pub fn next(self) -> Self {
        InternalRequestId(self.0 + 1)
    }

    /// Whether this is the reserved identifier.
    pub fn is_reserved(self) -> bool {
        self == Self::RESERVED
    }

    /// Get the raw value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InternalRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request({})", self.0)
    }
}

/// Oracle-assigned request identifier.
///
/// Opaque to the broker: no ordering or density is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalRequestId(pub Word);

impl From<u64> for ExternalRequestId {
    fn from(value: u64) -> Self {
        ExternalRequestId(Word::from_u64(value))
    }
}

impl fmt::Display for ExternalRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "External({})", self.0)
    }
}

/// Block height.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    /// Genesis block height.
    pub const GENESIS: Self = BlockHeight(0);

    /// Get the next block height.
    pub fn next(self) -> Self {
        BlockHeight(self.0 + 1)
    }

    /// Height `blocks` past this one, clamped at `u64::MAX`.
    pub fn saturating_add(self, blocks: u64) -> Self {
        BlockHeight(self.0.saturating_add(blocks))
    }

    /// Number of blocks from `earlier` to this height (zero if `earlier` is ahead).
    pub fn blocks_since(self, earlier: BlockHeight) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.0)
    }
}

/// Chain timestamp in seconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Get the raw value.
    pub fn as_secs(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// 20-byte account address.
///
/// Used for requesters, the privileged owner, the oracle, and the fee token.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// The zero address, treated as "absent".
    pub const ZERO: Self = AccountId([0u8; 20]);

    /// Build an address whose last bytes hold `n`. Handy for fixtures and simulation.
    pub fn from_index(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        AccountId(bytes)
    }

    /// Whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Get the bytes as a slice.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}..", hex::encode(&self.0[..4]))
    }
}
