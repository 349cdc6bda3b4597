//! 256-bit opaque word used for oracle identifiers and random outputs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte big-endian word.
///
/// The oracle network speaks in 256-bit integers: both the identifiers it
/// hands out and the random values it delivers fit this shape. The broker
/// never does arithmetic on them, it only stores and compares.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word([u8; 32]);

impl Word {
    /// Size of a word in bytes.
    pub const BYTES: usize = 32;

    /// Zero word (all bytes are 0x00).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Max word (all bytes are 0xFF).
    pub const MAX: Self = Self([0xFFu8; 32]);

    /// Create a word from raw big-endian bytes.
    pub const fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a word holding a small integer.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Create a word holding a 128-bit integer.
    pub fn from_u128(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Convert to a hex string (no prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get bytes as slice reference.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to bytes array.
    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0
    }

    /// The low 64 bits, if the word fits in a u64.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0[..24].iter().any(|&b| b != 0) {
            return None;
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&self.0[24..]);
        Some(u64::from_be_bytes(low))
    }

    /// Check if this is the zero word.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<[u8; 32]> for Word {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_u64() {
            Some(small) => write!(f, "Word({})", small),
            None => {
                let hex = self.to_hex();
                write!(f, "Word(0x{}..{})", &hex[..8], &hex[56..])
            }
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_u64() {
            Some(small) => write!(f, "{}", small),
            None => write!(f, "0x{}", self.to_hex()),
        }
    }
}
