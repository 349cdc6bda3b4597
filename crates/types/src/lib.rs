//! Core types for the randomness request broker.
//!
//! Identifiers, values, and lifecycle types shared by the broker, the node
//! state machine, and the simulation.

mod event;
mod identifiers;
mod request;
mod word;

pub use event::BrokerEvent;
pub use identifiers::{AccountId, BlockHeight, ExternalRequestId, InternalRequestId, Timestamp};
pub use request::{
    ChainHead, DispatchRequest, FeeAmount, FeeQuote, RandomValue, RequestStatus,
    SubmissionReceipt,
};
pub use word::Word;
