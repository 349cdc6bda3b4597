//! Observable broker events.

use crate::{AccountId, BlockHeight, ExternalRequestId, InternalRequestId, RandomValue};
use serde::{Deserialize, Serialize};

/// Events the broker reports to observers.
///
/// Emitted only after the state change they describe has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrokerEvent {
    /// A request was accepted by the oracle and recorded as pending.
    RequestSubmitted {
        request_id: InternalRequestId,
        requester: AccountId,
        external_id: ExternalRequestId,
        lock_block: BlockHeight,
    },

    /// A pending request received its random value.
    RequestCompleted {
        request_id: InternalRequestId,
        value: RandomValue,
    },

    /// The callback resource limit changed.
    CallbackLimitChanged { callback_limit: u32 },

    /// The confirmation depth changed.
    ConfirmationsChanged { confirmations: u16 },
}

impl BrokerEvent {
    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            BrokerEvent::RequestSubmitted { .. } => "RequestSubmitted",
            BrokerEvent::RequestCompleted { .. } => "RequestCompleted",
            BrokerEvent::CallbackLimitChanged { .. } => "CallbackLimitChanged",
            BrokerEvent::ConfirmationsChanged { .. } => "ConfirmationsChanged",
        }
    }
}
