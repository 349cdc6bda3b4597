//! Broker node state machine.
//!
//! This crate puts the [`vrfbroker_broker::Broker`] behind the
//! [`StateMachine`](vrfbroker_core::StateMachine) interface and enforces who
//! may fulfill requests and change configuration.

mod access;
mod state;

pub use access::AccessPolicy;
pub use state::BrokerNode;
