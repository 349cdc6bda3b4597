//! Outbound actions produced by the node state machine.

use crate::{CallId, Rejection};
use vrfbroker_types::{BrokerEvent, FeeQuote, InternalRequestId, RequestStatus, SubmissionReceipt};

/// Successful outcome of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// A request was submitted.
    Submitted(SubmissionReceipt),

    /// A fulfillment was applied to the given request.
    Fulfilled(InternalRequestId),

    /// A configuration change was applied.
    ConfigUpdated,

    /// Current price of one request.
    Fee(FeeQuote),

    /// Lifecycle state of a request.
    Status(RequestStatus),

    /// Last allocated request id; zero before the first submission.
    LastRequestId(u64),
}

/// Result delivered back to the caller of an event.
pub type Response = Result<Reply, Rejection>;

/// Actions for the runner to perform.
///
/// The runner handles the actual delivery; the state machine never does I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Deliver the outcome of a call to whoever issued it.
    Respond { call: CallId, response: Response },

    /// Publish a broker event to observers.
    Emit(BrokerEvent),
}

impl Action {
    /// Get a human-readable name for this action type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Respond { response: Ok(_), .. } => "Respond(Ok)",
            Action::Respond { response: Err(_), .. } => "Respond(Err)",
            Action::Emit(event) => event.type_name(),
        }
    }

    /// Check if this action publishes a broker event.
    pub fn is_emit(&self) -> bool {
        matches!(self, Action::Emit(_))
    }
}
