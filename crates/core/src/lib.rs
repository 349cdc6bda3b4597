//! Core types for the broker: Event, Action, and the StateMachine trait.
//!
//! Also defines the collaborator seams ([`OracleDispatch`], [`ChainClock`])
//! and the error types every layer above shares.

mod action;
mod error;
mod event;
mod request;
mod traits;

pub use action::{Action, Reply, Response};
pub use error::{BrokerError, ConfigError, DispatchError, Rejection};
pub use event::Event;
pub use request::CallId;
pub use traits::{ChainClock, OracleDispatch, StateMachine};
