//! Core traits for the broker and its collaborators.

use crate::{Action, DispatchError, Event};
use vrfbroker_types::{
    BlockHeight, ChainHead, DispatchRequest, ExternalRequestId, FeeAmount, Timestamp,
};

/// A state machine that processes events.
///
/// The node is implemented as a state machine that is:
///
/// - **Synchronous**: No async, no `.await`
/// - **Deterministic**: Same state + event = same actions
/// - **Pure-ish**: Mutates self, but performs no I/O beyond its collaborators
///
/// # Example
///
/// ```ignore
/// impl StateMachine for BrokerNode<O> {
///     fn handle(&mut self, event: Event) -> Vec<Action> {
///         match event {
///             Event::SubmitRequest { call, requester } => self.on_submit(call, requester),
///             // ... etc
///         }
///     }
///
///     fn set_chain_head(&mut self, head: ChainHead) {
///         self.head = head;
///     }
/// }
/// ```
pub trait StateMachine {
    /// Process an event, returning actions to perform.
    ///
    /// # Guarantees
    ///
    /// - **Synchronous**: This method never blocks or awaits
    /// - **Atomic**: A rejected event leaves no partial state behind
    /// - **No I/O**: Responses and notifications go out via the returned actions
    fn handle(&mut self, event: Event) -> Vec<Action>;

    /// Set the current chain head.
    ///
    /// Called by the runner before each `handle()` call so the state machine
    /// sees the block height and timestamp the event belongs to.
    fn set_chain_head(&mut self, head: ChainHead);

    /// Get the chain head last set via `set_chain_head()`.
    fn chain_head(&self) -> ChainHead;
}

/// Source of the current block height and timestamp.
pub trait ChainClock {
    /// Height of the latest block.
    fn block_height(&self) -> BlockHeight;

    /// Timestamp of the latest block.
    fn timestamp(&self) -> Timestamp;
}

impl ChainClock for ChainHead {
    fn block_height(&self) -> BlockHeight {
        self.height
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// The oracle network, as seen from the broker.
///
/// The oracle generates and proves the randomness; the broker only registers
/// requests with it and later receives its callback.
pub trait OracleDispatch {
    /// Register a request with the oracle and return the id it assigned.
    fn dispatch(&mut self, request: DispatchRequest) -> Result<ExternalRequestId, DispatchError>;

    /// Price of one request at the given callback limit.
    fn price_for(&self, callback_limit: u32) -> FeeAmount;
}

impl<O: OracleDispatch + ?Sized> OracleDispatch for Box<O> {
    fn dispatch(&mut self, request: DispatchRequest) -> Result<ExternalRequestId, DispatchError> {
        (**self).dispatch(request)
    }

    fn price_for(&self, callback_limit: u32) -> FeeAmount {
        (**self).price_for(callback_limit)
    }
}
