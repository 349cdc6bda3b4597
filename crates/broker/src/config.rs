//! Tunable broker parameters.

use std::num::{NonZeroU16, NonZeroU32};
use vrfbroker_core::ConfigError;

/// Default resource limit for the fulfillment callback.
pub const DEFAULT_CALLBACK_LIMIT: u32 = 100_000;

/// Default number of confirmations the oracle waits before fulfilling.
pub const DEFAULT_CONFIRMATIONS: u16 = 3;

/// Callback limit and confirmation depth.
///
/// Both values are stored as non-zero integers: a zero is rejected at the
/// setter and the previous value stays in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Resource limit the oracle may spend on the fulfillment callback.
    callback_limit: NonZeroU32,

    /// Confirmations the oracle waits before fulfilling.
    ///
    /// Also sets the advisory lock block of each new request.
    confirmations: NonZeroU16,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            callback_limit: NonZeroU32::MIN.saturating_add(DEFAULT_CALLBACK_LIMIT - 1),
            confirmations: NonZeroU16::MIN.saturating_add(DEFAULT_CONFIRMATIONS - 1),
        }
    }
}

impl BrokerConfig {
    /// Create a config, rejecting zero values.
    pub fn new(callback_limit: u32, confirmations: u16) -> Result<Self, ConfigError> {
        Ok(Self {
            callback_limit: NonZeroU32::new(callback_limit).ok_or(ConfigError::ZeroCallbackLimit)?,
            confirmations: NonZeroU16::new(confirmations).ok_or(ConfigError::ZeroConfirmations)?,
        })
    }

    /// Current callback limit.
    pub fn callback_limit(&self) -> u32 {
        self.callback_limit.get()
    }

    /// Current confirmation depth.
    pub fn confirmations(&self) -> u16 {
        self.confirmations.get()
    }

    /// Replace the callback limit. Zero is rejected and leaves the old value.
    pub fn set_callback_limit(&mut self, callback_limit: u32) -> Result<(), ConfigError> {
        self.callback_limit =
            NonZeroU32::new(callback_limit).ok_or(ConfigError::ZeroCallbackLimit)?;
        Ok(())
    }

    /// Replace the confirmation depth. Zero is rejected and leaves the old value.
    pub fn set_confirmations(&mut self, confirmations: u16) -> Result<(), ConfigError> {
        self.confirmations =
            NonZeroU16::new(confirmations).ok_or(ConfigError::ZeroConfirmations)?;
        Ok(())
    }
}
