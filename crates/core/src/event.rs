//! Inbound events processed by the node state machine.

use crate::CallId;
use vrfbroker_types::{AccountId, ExternalRequestId, InternalRequestId, RandomValue};

/// Events delivered to the node by its runner.
///
/// Every event carries the `CallId` its response will be tagged with.
/// Events that need an authenticated identity carry the `caller` the runner
/// has already authenticated; the node only checks what that caller may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // ═══════════════════════════════════════════════════════════════════════
    // Request lifecycle
    // ═══════════════════════════════════════════════════════════════════════
    /// Ask for a new random value on behalf of `requester`.
    SubmitRequest { call: CallId, requester: AccountId },

    /// Oracle callback delivering the value for `external_id`.
    FulfillRandomness {
        call: CallId,
        caller: AccountId,
        external_id: ExternalRequestId,
        value: RandomValue,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Configuration (owner only)
    // ═══════════════════════════════════════════════════════════════════════
    /// Change the callback resource limit.
    SetCallbackLimit {
        call: CallId,
        caller: AccountId,
        callback_limit: u32,
    },

    /// Change the confirmation depth.
    SetConfirmations {
        call: CallId,
        caller: AccountId,
        confirmations: u16,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════
    /// Price of one request at the current callback limit.
    QueryFee { call: CallId },

    /// Lifecycle state of one request.
    QueryRequest {
        call: CallId,
        request_id: InternalRequestId,
    },

    /// Most recently allocated request id.
    QueryLastRequestId { call: CallId },
}

impl Event {
    /// The call this event's response belongs to.
    pub fn call(&self) -> CallId {
        match self {
            Event::SubmitRequest { call, .. }
            | Event::FulfillRandomness { call, .. }
            | Event::SetCallbackLimit { call, .. }
            | Event::SetConfirmations { call, .. }
            | Event::QueryFee { call }
            | Event::QueryRequest { call, .. }
            | Event::QueryLastRequestId { call } => *call,
        }
    }

    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::SubmitRequest { .. } => "SubmitRequest",
            Event::FulfillRandomness { .. } => "FulfillRandomness",
            Event::SetCallbackLimit { .. } => "SetCallbackLimit",
            Event::SetConfirmations { .. } => "SetConfirmations",
            Event::QueryFee { .. } => "QueryFee",
            Event::QueryRequest { .. } => "QueryRequest",
            Event::QueryLastRequestId { .. } => "QueryLastRequestId",
        }
    }

    /// Check if this event only reads state.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Event::QueryFee { .. } | Event::QueryRequest { .. } | Event::QueryLastRequestId { .. }
        )
    }
}
