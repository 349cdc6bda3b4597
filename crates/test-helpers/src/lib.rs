//! Test helpers for the randomness broker.
//!
//! Provides a scriptable oracle and well-known accounts so unit and
//! integration tests across crates build fixtures the same way.

use vrfbroker_core::{DispatchError, OracleDispatch};
use vrfbroker_types::{AccountId, DispatchRequest, ExternalRequestId, FeeAmount, Word};

/// Offset applied to mock external ids so they never look like internal ids.
pub const EXTERNAL_ID_BASE: u128 = 0xA5A5_0000_0000_0000_0000_0000_0000_0000;

/// Default flat fee charged by the mock oracle.
pub const DEFAULT_BASE_FEE: u128 = 1_000;

/// Default per-unit fee charged by the mock oracle.
pub const DEFAULT_FEE_PER_UNIT: u128 = 2;

/// Account that owns the broker configuration.
pub fn owner() -> AccountId {
    AccountId::from_index(0x0001)
}

/// Account the oracle network calls back from.
pub fn oracle_account() -> AccountId {
    AccountId::from_index(0x0002)
}

/// Fee token address.
pub fn fee_token() -> AccountId {
    AccountId::from_index(0x0003)
}

/// The n-th ordinary requester.
pub fn requester(n: u64) -> AccountId {
    AccountId::from_index(0x1000 + n)
}

/// External id the oracle would assign to its n-th dispatch (0-based).
pub fn mock_external_id(n: u64) -> ExternalRequestId {
    ExternalRequestId(Word::from_u128(EXTERNAL_ID_BASE + n as u128))
}

/// Scriptable in-memory oracle.
///
/// Assigns external ids deterministically, records every dispatch, and can be
/// told to fail or to misbehave on its next call.
#[derive(Debug, Clone)]
pub struct MockOracle {
    dispatched: Vec<(ExternalRequestId, DispatchRequest)>,
    next_index: u64,
    fail_next: Option<DispatchError>,
    repeat_next: bool,
    base_fee: u128,
    fee_per_unit: u128,
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOracle {
    /// Create a mock oracle with default pricing.
    pub fn new() -> Self {
        Self {
            dispatched: Vec::new(),
            next_index: 0,
            fail_next: None,
            repeat_next: false,
            base_fee: DEFAULT_BASE_FEE,
            fee_per_unit: DEFAULT_FEE_PER_UNIT,
        }
    }

    /// Create a mock oracle with custom pricing.
    pub fn with_pricing(base_fee: u128, fee_per_unit: u128) -> Self {
        Self {
            base_fee,
            fee_per_unit,
            ..Self::new()
        }
    }

    /// Make the next dispatch fail with `error`.
    pub fn fail_next(&mut self, error: DispatchError) {
        self.fail_next = Some(error);
    }

    /// Make the next dispatch hand back the previous external id again.
    pub fn repeat_next(&mut self) {
        self.repeat_next = true;
    }

    /// All successful dispatches, in order.
    pub fn dispatched(&self) -> &[(ExternalRequestId, DispatchRequest)] {
        &self.dispatched
    }

    /// External id of the most recent successful dispatch.
    pub fn last_external_id(&self) -> Option<ExternalRequestId> {
        self.dispatched.last().map(|(id, _)| *id)
    }

    /// Parameters of the most recent successful dispatch.
    pub fn last_request(&self) -> Option<DispatchRequest> {
        self.dispatched.last().map(|(_, req)| *req)
    }
}

impl OracleDispatch for MockOracle {
    fn dispatch(&mut self, request: DispatchRequest) -> Result<ExternalRequestId, DispatchError> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }

        let external_id = match (self.repeat_next, self.last_external_id()) {
            (true, Some(previous)) => {
                self.repeat_next = false;
                previous
            }
            _ => {
                let id = mock_external_id(self.next_index);
                self.next_index += 1;
                id
            }
        };

        self.dispatched.push((external_id, request));
        Ok(external_id)
    }

    fn price_for(&self, callback_limit: u32) -> FeeAmount {
        FeeAmount(self.base_fee + self.fee_per_unit * callback_limit as u128)
    }
}
