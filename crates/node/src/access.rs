//! Caller authorization for privileged and oracle-only events.

use vrfbroker_core::Rejection;
use vrfbroker_types::AccountId;

/// Who may do what.
///
/// The runner authenticates callers; this policy only decides whether an
/// authenticated caller may perform a given operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Account allowed to change configuration.
    pub owner: AccountId,
    /// Account the oracle network calls back from.
    pub oracle: AccountId,
}

impl AccessPolicy {
    /// Create a policy.
    pub fn new(owner: AccountId, oracle: AccountId) -> Self {
        Self { owner, oracle }
    }

    /// Allow only the owner.
    pub fn require_owner(
        &self,
        caller: AccountId,
        operation: &'static str,
    ) -> Result<(), Rejection> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(Rejection::Unauthorized { caller, operation })
        }
    }

    /// Allow only the oracle.
    pub fn require_oracle(
        &self,
        caller: AccountId,
        operation: &'static str,
    ) -> Result<(), Rejection> {
        if caller == self.oracle {
            Ok(())
        } else {
            Err(Rejection::Unauthorized { caller, operation })
        }
    }
}
