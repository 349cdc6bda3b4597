//! Error types for broker operations.

use thiserror::Error;
use vrfbroker_types::{AccountId, ExternalRequestId, InternalRequestId};

/// Rejected configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Callback resource limit must be strictly positive.
    #[error("Callback limit must be greater than zero")]
    ZeroCallbackLimit,

    /// Confirmation depth must be strictly positive.
    #[error("Confirmation depth must be greater than zero")]
    ZeroConfirmations,
}

/// Failures reported by the oracle dispatch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The oracle refused the request.
    #[error("Oracle rejected request: {0}")]
    Rejected(String),

    /// The oracle could not be reached.
    #[error("Oracle unavailable")]
    Unavailable,
}

/// Errors returned by the broker core.
///
/// Every variant is returned before any state has been mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// A required collaborator was not supplied at construction.
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// A configuration value was rejected.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The oracle failed to accept the request.
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// The oracle returned an external id that is already correlated.
    #[error("Oracle reused {0}")]
    DuplicateExternalId(ExternalRequestId),

    /// Fulfillment for an external id no submission produced.
    #[error("No request correlated with {0}")]
    CorrelationNotFound(ExternalRequestId),

    /// Fulfillment for a request that already has a value.
    #[error("{0} already fulfilled")]
    AlreadyFulfilled(InternalRequestId),
}

/// Why a node refused to serve an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The caller is not allowed to perform the operation.
    #[error("{caller} is not authorized to {operation}")]
    Unauthorized {
        caller: AccountId,
        operation: &'static str,
    },

    /// The broker rejected the operation.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}
