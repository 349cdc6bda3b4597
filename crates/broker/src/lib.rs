//! Randomness request broker.
//!
//! This crate provides the [`Broker`], which submits randomness requests to an
//! oracle network, gives each one a sequential internal id, and correlates
//! the oracle's later callback back to that id.
//!
//! # Architecture
//!
//! ```text
//! Caller
//!     │
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Broker.submit_request(requester, clock)                     │
//! │                                                             │
//! │   1. OracleDispatch.dispatch(limit, confirmations, 1)       │
//! │      → ExternalRequestId (failure: nothing recorded)        │
//! │   2. IdentifierAllocator.allocate() → InternalRequestId     │
//! │   3. CorrelationTable.insert(external → internal)           │
//! │   4. RequestStore.init_pending(internal, height + confs)    │
//! │   5. emit RequestSubmitted                                  │
//! └─────────────────────────────────────────────────────────────┘
//!                     │
//!                     ▼
//!         Oracle waits for confirmations
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Broker.fulfill(external, value, timestamp)                  │
//! │                                                             │
//! │   1. CorrelationTable.resolve(external)                     │
//! │      → unknown: CorrelationNotFound                         │
//! │   2. RequestStore.complete(internal, value, timestamp)      │
//! │      → already completed: AlreadyFulfilled                  │
//! │   3. emit RequestCompleted                                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`Broker`] - Orchestrates submission, fulfillment, and queries
//! - [`IdentifierAllocator`] - Sequential internal ids starting at 1
//! - [`CorrelationTable`] - Write-once external → internal map
//! - [`RequestStore`] - Pending/completed record per internal id
//! - [`BrokerConfig`] - Callback limit and confirmation depth, never zero

mod allocator;
mod config;
mod correlation;
mod state;
mod store;

pub use allocator::IdentifierAllocator;
pub use config::{BrokerConfig, DEFAULT_CALLBACK_LIMIT, DEFAULT_CONFIRMATIONS};
pub use correlation::CorrelationTable;
pub use state::{Broker, BrokerBuilder, NUM_WORDS};
pub use store::{Completion, Fulfillment, RequestRecord, RequestStore};
