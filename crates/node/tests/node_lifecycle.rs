//! End-to-end request lifecycle through the node state machine.

use tracing_test::traced_test;
use vrfbroker_broker::{Broker, BrokerConfig};
use vrfbroker_core::{
    Action, BrokerError, CallId, ConfigError, DispatchError, Event, Rejection, Reply,
    StateMachine,
};
use vrfbroker_node::{AccessPolicy, BrokerNode};
use vrfbroker_test_helpers::{fee_token, oracle_account, owner, requester, MockOracle};
use vrfbroker_types::{
    BlockHeight, BrokerEvent, ChainHead, ExternalRequestId, FeeAmount, InternalRequestId,
    RandomValue, RequestStatus, SubmissionReceipt, Timestamp,
};

fn make_node() -> BrokerNode<MockOracle> {
    let broker = Broker::new(
        MockOracle::with_pricing(1_000, 2),
        fee_token(),
        BrokerConfig::new(100_000, 3).unwrap(),
    )
    .unwrap();
    let mut node = BrokerNode::new(broker, AccessPolicy::new(owner(), oracle_account()));
    node.set_chain_head(ChainHead::new(BlockHeight(100), Timestamp(1_200)));
    node
}

fn reply(actions: &[Action], call: CallId) -> Reply {
    match actions.first() {
        Some(Action::Respond {
            call: c,
            response: Ok(reply),
        }) if *c == call => *reply,
        other => panic!("expected Ok response for {call}, got {other:?}"),
    }
}

fn rejection(actions: &[Action], call: CallId) -> Rejection {
    match actions.first() {
        Some(Action::Respond {
            call: c,
            response: Err(rejection),
        }) if *c == call => rejection.clone(),
        other => panic!("expected Err response for {call}, got {other:?}"),
    }
}

fn submit(node: &mut BrokerNode<MockOracle>, call: u64) -> SubmissionReceipt {
    let actions = node.handle(Event::SubmitRequest {
        call: CallId(call),
        requester: requester(call),
    });
    match reply(&actions, CallId(call)) {
        Reply::Submitted(receipt) => receipt,
        other => panic!("expected Submitted, got {other:?}"),
    }
}

fn fulfill(
    node: &mut BrokerNode<MockOracle>,
    call: u64,
    external_id: ExternalRequestId,
    value: u64,
) -> Vec<Action> {
    node.handle(Event::FulfillRandomness {
        call: CallId(call),
        caller: oracle_account(),
        external_id,
        value: RandomValue::from(value),
    })
}

#[traced_test]
#[test]
fn test_submit_then_fulfill() {
    let mut node = make_node();

    let receipt = submit(&mut node, 1);
    assert_eq!(receipt.request_id, InternalRequestId(1));
    assert_eq!(receipt.lock_block, BlockHeight(103));

    node.set_chain_head(ChainHead::new(BlockHeight(103), Timestamp(1_000)));
    let actions = fulfill(&mut node, 2, receipt.external_id, 42);
    assert_eq!(
        reply(&actions, CallId(2)),
        Reply::Fulfilled(InternalRequestId(1))
    );
    assert_eq!(
        actions[1],
        Action::Emit(BrokerEvent::RequestCompleted {
            request_id: InternalRequestId(1),
            value: RandomValue::from(42),
        })
    );

    let broker = node.broker();
    assert_eq!(
        broker.random_value(InternalRequestId(1)),
        Some(RandomValue::from(42))
    );
    assert_eq!(
        broker.completed_at(InternalRequestId(1)),
        Some(Timestamp(1_000))
    );
    assert!(broker.is_request_complete(InternalRequestId(1)));
}

#[traced_test]
#[test]
fn test_submission_emits_event_after_response() {
    let mut node = make_node();
    let actions = node.handle(Event::SubmitRequest {
        call: CallId(9),
        requester: requester(4),
    });

    assert_eq!(actions.len(), 2);
    assert!(!actions[0].is_emit());
    match actions[1] {
        Action::Emit(BrokerEvent::RequestSubmitted {
            request_id,
            requester: who,
            ..
        }) => {
            assert_eq!(request_id, InternalRequestId(1));
            assert_eq!(who, requester(4));
        }
        ref other => panic!("expected RequestSubmitted, got {other:?}"),
    }
}

#[traced_test]
#[test]
fn test_only_second_request_fulfilled() {
    let mut node = make_node();
    let first = submit(&mut node, 1);
    let second = submit(&mut node, 2);
    assert_eq!(first.request_id, InternalRequestId(1));
    assert_eq!(second.request_id, InternalRequestId(2));
    assert_ne!(first.external_id, second.external_id);

    fulfill(&mut node, 3, second.external_id, 5);

    let actions = node.handle(Event::QueryRequest {
        call: CallId(4),
        request_id: first.request_id,
    });
    assert_eq!(
        reply(&actions, CallId(4)),
        Reply::Status(RequestStatus::Pending {
            lock_block: BlockHeight(103)
        })
    );
    assert!(node.broker().is_request_complete(second.request_id));
}

#[traced_test]
#[test]
fn test_fulfillment_requires_oracle() {
    let mut node = make_node();
    let receipt = submit(&mut node, 1);

    let actions = node.handle(Event::FulfillRandomness {
        call: CallId(2),
        caller: requester(1),
        external_id: receipt.external_id,
        value: RandomValue::from(1),
    });

    assert_eq!(
        rejection(&actions, CallId(2)),
        Rejection::Unauthorized {
            caller: requester(1),
            operation: "fulfill randomness",
        }
    );
    assert_eq!(actions.len(), 1);
    assert!(!node.broker().is_request_complete(receipt.request_id));
}

#[traced_test]
#[test]
fn test_stray_fulfillment_rejected() {
    let mut node = make_node();
    submit(&mut node, 1);

    let stray = ExternalRequestId::from(12345);
    let actions = fulfill(&mut node, 2, stray, 1);

    assert_eq!(
        rejection(&actions, CallId(2)),
        Rejection::Broker(BrokerError::CorrelationNotFound(stray))
    );
    assert_eq!(node.broker().completed_count(), 0);
    assert_eq!(node.broker().last_request_id(), 1);
}

#[traced_test]
#[test]
fn test_config_requires_owner() {
    let mut node = make_node();

    let actions = node.handle(Event::SetCallbackLimit {
        call: CallId(1),
        caller: requester(0),
        callback_limit: 5,
    });
    assert!(matches!(
        rejection(&actions, CallId(1)),
        Rejection::Unauthorized { .. }
    ));

    let actions = node.handle(Event::SetConfirmations {
        call: CallId(2),
        caller: oracle_account(),
        confirmations: 5,
    });
    assert!(matches!(
        rejection(&actions, CallId(2)),
        Rejection::Unauthorized { .. }
    ));

    assert_eq!(node.broker().config().callback_limit(), 100_000);
    assert_eq!(node.broker().config().confirmations(), 3);
}

#[traced_test]
#[test]
fn test_owner_config_changes() {
    let mut node = make_node();

    let actions = node.handle(Event::SetConfirmations {
        call: CallId(1),
        caller: owner(),
        confirmations: 10,
    });
    assert_eq!(reply(&actions, CallId(1)), Reply::ConfigUpdated);
    assert_eq!(
        actions[1],
        Action::Emit(BrokerEvent::ConfirmationsChanged { confirmations: 10 })
    );

    let actions = node.handle(Event::SetCallbackLimit {
        call: CallId(2),
        caller: owner(),
        callback_limit: 0,
    });
    assert_eq!(
        rejection(&actions, CallId(2)),
        Rejection::Broker(BrokerError::Config(ConfigError::ZeroCallbackLimit))
    );

    let actions = node.handle(Event::QueryFee { call: CallId(3) });
    match reply(&actions, CallId(3)) {
        Reply::Fee(quote) => {
            assert_eq!(quote.token, fee_token());
            assert_eq!(quote.amount, FeeAmount(1_000 + 2 * 100_000));
        }
        other => panic!("expected Fee, got {other:?}"),
    }

    let receipt = submit(&mut node, 4);
    assert_eq!(receipt.lock_block, BlockHeight(110));
}

#[traced_test]
#[test]
fn test_query_unknown_request() {
    let mut node = make_node();
    let actions = node.handle(Event::QueryRequest {
        call: CallId(1),
        request_id: InternalRequestId(77),
    });
    assert_eq!(
        reply(&actions, CallId(1)),
        Reply::Status(RequestStatus::Unknown)
    );
}

#[traced_test]
#[test]
fn test_last_request_id_counts_successes() {
    let mut node = make_node();
    for call in 1..=3 {
        submit(&mut node, call);
    }
    node.broker_mut()
        .oracle_mut()
        .fail_next(DispatchError::Unavailable);

    let actions = node.handle(Event::SubmitRequest {
        call: CallId(4),
        requester: requester(4),
    });
    assert!(matches!(
        rejection(&actions, CallId(4)),
        Rejection::Broker(BrokerError::Dispatch(_))
    ));
    assert_eq!(node.broker().last_request_id(), 3);

    let actions = node.handle(Event::QueryLastRequestId { call: CallId(5) });
    assert_eq!(reply(&actions, CallId(5)), Reply::LastRequestId(3));
    assert_eq!(actions.len(), 1);
}

#[traced_test]
#[test]
fn test_last_request_id_query_before_any_submission() {
    let mut node = make_node();
    let actions = node.handle(Event::QueryLastRequestId { call: CallId(1) });
    assert_eq!(reply(&actions, CallId(1)), Reply::LastRequestId(0));
}
