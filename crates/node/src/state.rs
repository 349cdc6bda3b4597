//! Node state machine wrapping the broker.

use crate::AccessPolicy;
use tracing::{debug, trace, warn};
use vrfbroker_broker::Broker;
use vrfbroker_core::{
    Action, CallId, Event, OracleDispatch, Rejection, Reply, Response, StateMachine,
};
use vrfbroker_types::ChainHead;

/// Deterministic node that serves broker events.
///
/// Checks the caller against the [`AccessPolicy`], runs the broker
/// operation, and returns the response followed by any broker events.
/// Rejected events produce only a response.
pub struct BrokerNode<O> {
    broker: Broker<O>,
    access: AccessPolicy,
    head: ChainHead,
}

impl<O: OracleDispatch> BrokerNode<O> {
    /// Create a node around an already constructed broker.
    pub fn new(broker: Broker<O>, access: AccessPolicy) -> Self {
        Self {
            broker,
            access,
            head: ChainHead::default(),
        }
    }

    /// The wrapped broker, for read-only queries.
    pub fn broker(&self) -> &Broker<O> {
        &self.broker
    }

    /// Mutable access to the wrapped broker.
    ///
    /// Bypasses the access policy; meant for runners that need to reach the
    /// oracle collaborator.
    pub fn broker_mut(&mut self) -> &mut Broker<O> {
        &mut self.broker
    }

    /// The access policy in force.
    pub fn access(&self) -> &AccessPolicy {
        &self.access
    }

    fn serve(&mut self, event: Event) -> Response {
        match event {
            Event::SubmitRequest { requester, .. } => {
                let receipt = self.broker.submit_request(requester, &self.head)?;
                Ok(Reply::Submitted(receipt))
            }
            Event::FulfillRandomness {
                caller,
                external_id,
                value,
                ..
            } => {
                self.access.require_oracle(caller, "fulfill randomness")?;
                let request_id = self
                    .broker
                    .fulfill(external_id, value, self.head.timestamp)?;
                Ok(Reply::Fulfilled(request_id))
            }
            Event::SetCallbackLimit {
                caller,
                callback_limit,
                ..
            } => {
                self.access.require_owner(caller, "set callback limit")?;
                self.broker.set_callback_limit(callback_limit)?;
                Ok(Reply::ConfigUpdated)
            }
            Event::SetConfirmations {
                caller,
                confirmations,
                ..
            } => {
                self.access.require_owner(caller, "set confirmations")?;
                self.broker.set_confirmations(confirmations)?;
                Ok(Reply::ConfigUpdated)
            }
            Event::QueryFee { .. } => Ok(Reply::Fee(self.broker.request_fee())),
            Event::QueryRequest { request_id, .. } => {
                Ok(Reply::Status(self.broker.request_status(request_id)))
            }
            Event::QueryLastRequestId { .. } => {
                Ok(Reply::LastRequestId(self.broker.last_request_id()))
            }
        }
    }

    fn respond(&mut self, call: CallId, response: Response) -> Vec<Action> {
        let mut actions = vec![Action::Respond { call, response }];
        actions.extend(self.broker.drain_events().into_iter().map(Action::Emit));
        actions
    }
}

impl<O: OracleDispatch> StateMachine for BrokerNode<O> {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        let call = event.call();
        let kind = event.type_name();
        let query = event.is_query();

        let response = self.serve(event);
        match &response {
            Ok(_) if query => trace!(%call, kind, "Query served"),
            Ok(_) => debug!(%call, kind, height = self.head.height.0, "Event served"),
            Err(Rejection::Unauthorized { caller, operation }) => {
                warn!(%call, %caller, operation, "Unauthorized event rejected")
            }
            Err(Rejection::Broker(e)) => debug!(%call, kind, error = %e, "Event rejected"),
        }

        self.respond(call, response)
    }

    fn set_chain_head(&mut self, head: ChainHead) {
        self.head = head;
    }

    fn chain_head(&self) -> ChainHead {
        self.head
    }
}
