//! Broker state: submission, fulfillment, configuration, and queries.

use crate::{BrokerConfig, Completion, CorrelationTable, IdentifierAllocator, RequestStore};
use tracing::{debug, error, info, warn};
use vrfbroker_core::{BrokerError, ChainClock, OracleDispatch};
use vrfbroker_types::{
    AccountId, BrokerEvent, DispatchRequest, ExternalRequestId, FeeQuote, InternalRequestId,
    RandomValue, RequestStatus, SubmissionReceipt, Timestamp,
};

/// Number of random words requested per submission.
pub const NUM_WORDS: u32 = 1;

/// Randomness request broker.
///
/// Owns every piece of mutable state (id counter, correlation table, request
/// records, configuration) and exposes it only through the operations below.
/// Each operation either completes fully or returns an error having changed
/// nothing.
///
/// Observable events are buffered and handed to the host by
/// [`drain_events`](Self::drain_events).
pub struct Broker<O> {
    /// Oracle network collaborator.
    oracle: O,

    /// Token fees are quoted in.
    fee_token: AccountId,

    /// Callback limit and confirmation depth.
    config: BrokerConfig,

    /// Internal id counter.
    allocator: IdentifierAllocator,

    /// external id -> internal id
    correlations: CorrelationTable,

    /// internal id -> lifecycle record
    requests: RequestStore,

    /// Events not yet drained by the host.
    events: Vec<BrokerEvent>,
}

/// Builder for [`Broker`]. Every collaborator must be supplied.
pub struct BrokerBuilder<O> {
    oracle: Option<O>,
    fee_token: Option<AccountId>,
    config: BrokerConfig,
}

impl<O> Default for BrokerBuilder<O> {
    fn default() -> Self {
        Self {
            oracle: None,
            fee_token: None,
            config: BrokerConfig::default(),
        }
    }
}

impl<O: OracleDispatch> BrokerBuilder<O> {
    /// Set the oracle collaborator.
    pub fn oracle(mut self, oracle: O) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Set the fee token address.
    pub fn fee_token(mut self, fee_token: AccountId) -> Self {
        self.fee_token = Some(fee_token);
        self
    }

    /// Set the initial configuration.
    pub fn config(mut self, config: BrokerConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the broker.
    ///
    /// Fails with [`BrokerError::MissingCollaborator`] if the oracle or the
    /// fee token is absent. The zero address counts as absent.
    pub fn build(self) -> Result<Broker<O>, BrokerError> {
        let oracle = self
            .oracle
            .ok_or(BrokerError::MissingCollaborator("oracle"))?;
        let fee_token = self
            .fee_token
            .filter(|token| !token.is_zero())
            .ok_or(BrokerError::MissingCollaborator("fee token"))?;

        info!(
            fee_token = %fee_token,
            callback_limit = self.config.callback_limit(),
            confirmations = self.config.confirmations(),
            "Broker initialized"
        );

        Ok(Broker {
            oracle,
            fee_token,
            config: self.config,
            allocator: IdentifierAllocator::new(),
            correlations: CorrelationTable::new(),
            requests: RequestStore::new(),
            events: Vec::new(),
        })
    }
}

impl<O: OracleDispatch> Broker<O> {
    /// Start building a broker.
    pub fn builder() -> BrokerBuilder<O> {
        BrokerBuilder::default()
    }

    /// Create a broker directly from its collaborators.
    pub fn new(oracle: O, fee_token: AccountId, config: BrokerConfig) -> Result<Self, BrokerError> {
        Self::builder()
            .oracle(oracle)
            .fee_token(fee_token)
            .config(config)
            .build()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Request lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Submit a new randomness request on behalf of `requester`.
    ///
    /// The oracle is asked first; if it fails or hands back an id that is
    /// already correlated, no id is allocated and nothing is recorded.
    pub fn submit_request(
        &mut self,
        requester: AccountId,
        clock: &impl ChainClock,
    ) -> Result<SubmissionReceipt, BrokerError> {
        let request = DispatchRequest {
            callback_limit: self.config.callback_limit(),
            confirmations: self.config.confirmations(),
            num_words: NUM_WORDS,
        };

        let external_id = self.oracle.dispatch(request).map_err(|e| {
            warn!(requester = %requester, error = %e, "Oracle dispatch failed");
            BrokerError::from(e)
        })?;

        if self.correlations.contains(&external_id) {
            warn!(external_id = %external_id, "Oracle returned an already correlated id");
            return Err(BrokerError::DuplicateExternalId(external_id));
        }

        let request_id = self.allocator.allocate();
        let inserted = self.correlations.insert(external_id, request_id);
        debug_assert!(inserted, "correlation checked above");

        let lock_block = clock
            .block_height()
            .saturating_add(u64::from(self.config.confirmations()));
        let created = self.requests.init_pending(request_id, lock_block);
        debug_assert!(created, "fresh id cannot have a record");

        debug!(
            request_id = request_id.0,
            external_id = %external_id,
            lock_block = lock_block.0,
            "Request submitted"
        );

        self.events.push(BrokerEvent::RequestSubmitted {
            request_id,
            requester,
            external_id,
            lock_block,
        });

        Ok(SubmissionReceipt {
            request_id,
            external_id,
            lock_block,
        })
    }

    /// Apply the oracle's callback for `external_id`.
    ///
    /// The caller must already have checked that the callback comes from the
    /// oracle. Unknown ids and repeated callbacks are rejected without
    /// touching the stored record.
    pub fn fulfill(
        &mut self,
        external_id: ExternalRequestId,
        value: RandomValue,
        timestamp: Timestamp,
    ) -> Result<InternalRequestId, BrokerError> {
        let Some(request_id) = self.correlations.resolve(&external_id) else {
            warn!(external_id = %external_id, "Fulfillment for unknown request");
            return Err(BrokerError::CorrelationNotFound(external_id));
        };

        match self.requests.complete(request_id, value, timestamp) {
            Completion::Applied => {}
            Completion::AlreadyCompleted => {
                warn!(
                    request_id = request_id.0,
                    external_id = %external_id,
                    "Repeated fulfillment rejected"
                );
                return Err(BrokerError::AlreadyFulfilled(request_id));
            }
            Completion::Missing => {
                // Correlations and records are created together at submission.
                error!(
                    request_id = request_id.0,
                    external_id = %external_id,
                    "Correlated request has no record"
                );
                return Err(BrokerError::CorrelationNotFound(external_id));
            }
        }

        debug!(
            request_id = request_id.0,
            value = %value,
            completed_at = timestamp.0,
            "Request completed"
        );

        self.events
            .push(BrokerEvent::RequestCompleted { request_id, value });

        Ok(request_id)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Configuration
    // ═══════════════════════════════════════════════════════════════════════

    /// Change the callback resource limit. Zero is rejected.
    pub fn set_callback_limit(&mut self, callback_limit: u32) -> Result<(), BrokerError> {
        self.config.set_callback_limit(callback_limit)?;
        info!(callback_limit, "Callback limit changed");
        self.events
            .push(BrokerEvent::CallbackLimitChanged { callback_limit });
        Ok(())
    }

    /// Change the confirmation depth. Zero is rejected.
    pub fn set_confirmations(&mut self, confirmations: u16) -> Result<(), BrokerError> {
        self.config.set_confirmations(confirmations)?;
        info!(confirmations, "Confirmation depth changed");
        self.events
            .push(BrokerEvent::ConfirmationsChanged { confirmations });
        Ok(())
    }

    /// Current configuration.
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// Price of one request at the current callback limit.
    pub fn request_fee(&self) -> FeeQuote {
        FeeQuote {
            token: self.fee_token,
            amount: self.oracle.price_for(self.config.callback_limit()),
        }
    }

    /// Whether `request_id` has been fulfilled. False for unknown ids.
    pub fn is_request_complete(&self, request_id: InternalRequestId) -> bool {
        self.requests.query(request_id).is_complete()
    }

    /// Delivered value, absent while pending or for unknown ids.
    pub fn random_value(&self, request_id: InternalRequestId) -> Option<RandomValue> {
        self.requests.query(request_id).value()
    }

    /// Completion time, absent while pending or for unknown ids.
    pub fn completed_at(&self, request_id: InternalRequestId) -> Option<Timestamp> {
        self.requests.query(request_id).completed_at()
    }

    /// Full lifecycle state, distinguishing unknown ids from pending ones.
    pub fn request_status(&self, request_id: InternalRequestId) -> RequestStatus {
        self.requests.query(request_id)
    }

    /// Last id allocated; equals the number of successful submissions.
    pub fn last_request_id(&self) -> u64 {
        self.allocator.last()
    }

    /// Internal id correlated with `external_id`, if any.
    pub fn resolve(&self, external_id: &ExternalRequestId) -> Option<InternalRequestId> {
        self.correlations.resolve(external_id)
    }

    /// Number of requests awaiting fulfillment.
    pub fn pending_count(&self) -> usize {
        self.requests.pending_count()
    }

    /// Number of fulfilled requests.
    pub fn completed_count(&self) -> usize {
        self.requests.completed_count()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Host access
    // ═══════════════════════════════════════════════════════════════════════

    /// Take all events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<BrokerEvent> {
        std::mem::take(&mut self.events)
    }

    /// The oracle collaborator.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Mutable access to the oracle collaborator.
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;
    use vrfbroker_core::{ConfigError, DispatchError};
    use vrfbroker_test_helpers::{fee_token, mock_external_id, requester, MockOracle};
    use vrfbroker_types::{BlockHeight, ChainHead, FeeAmount};

    fn make_broker() -> Broker<MockOracle> {
        Broker::new(MockOracle::new(), fee_token(), BrokerConfig::default()).unwrap()
    }

    fn head(height: u64) -> ChainHead {
        ChainHead::new(BlockHeight(height), Timestamp(height * 12))
    }

    #[traced_test]
    #[test]
    fn test_missing_collaborators() {
        let no_oracle = Broker::<MockOracle>::builder().fee_token(fee_token()).build();
        assert_eq!(
            no_oracle.err(),
            Some(BrokerError::MissingCollaborator("oracle"))
        );

        let no_token = Broker::builder().oracle(MockOracle::new()).build();
        assert_eq!(
            no_token.err(),
            Some(BrokerError::MissingCollaborator("fee token"))
        );

        let zero_token = Broker::new(MockOracle::new(), AccountId::ZERO, BrokerConfig::default());
        assert_eq!(
            zero_token.err(),
            Some(BrokerError::MissingCollaborator("fee token"))
        );
    }

    #[traced_test]
    #[test]
    fn test_ids_are_sequential() {
        let mut broker = make_broker();

        for expected in 1..=10 {
            let receipt = broker.submit_request(requester(0), &head(100)).unwrap();
            assert_eq!(receipt.request_id, InternalRequestId(expected));
            assert_eq!(broker.last_request_id(), expected);
        }
    }

    #[traced_test]
    #[test]
    fn test_submission_is_pending_with_lock_block() {
        let mut broker = make_broker();
        broker.set_confirmations(5).unwrap();

        let receipt = broker.submit_request(requester(0), &head(100)).unwrap();

        assert_eq!(receipt.lock_block, BlockHeight(105));
        assert!(!broker.is_request_complete(receipt.request_id));
        assert_eq!(broker.random_value(receipt.request_id), None);
        assert_eq!(broker.completed_at(receipt.request_id), None);
        assert_eq!(
            broker.request_status(receipt.request_id),
            RequestStatus::Pending {
                lock_block: BlockHeight(105)
            }
        );
        assert_eq!(broker.pending_count(), 1);
    }

    #[traced_test]
    #[test]
    fn test_dispatch_carries_current_config() {
        let mut broker = make_broker();
        broker.set_callback_limit(250_000).unwrap();
        broker.set_confirmations(10).unwrap();

        broker.submit_request(requester(0), &head(1)).unwrap();

        assert_eq!(
            broker.oracle().last_request(),
            Some(DispatchRequest {
                callback_limit: 250_000,
                confirmations: 10,
                num_words: NUM_WORDS,
            })
        );
    }

    #[traced_test]
    #[test]
    fn test_fulfill_completes_request() {
        let mut broker = make_broker();
        let receipt = broker.submit_request(requester(0), &head(1)).unwrap();
        assert_eq!(receipt.request_id, InternalRequestId(1));

        let fulfilled = broker
            .fulfill(receipt.external_id, RandomValue::from(42), Timestamp(1000))
            .unwrap();

        assert_eq!(fulfilled, InternalRequestId(1));
        for _ in 0..3 {
            assert!(broker.is_request_complete(InternalRequestId(1)));
            assert_eq!(
                broker.random_value(InternalRequestId(1)),
                Some(RandomValue::from(42))
            );
            assert_eq!(broker.completed_at(InternalRequestId(1)), Some(Timestamp(1000)));
        }
    }

    #[traced_test]
    #[test]
    fn test_fulfill_only_touches_its_request() {
        let mut broker = make_broker();
        let first = broker.submit_request(requester(0), &head(1)).unwrap();
        let second = broker.submit_request(requester(1), &head(1)).unwrap();
        assert_ne!(first.external_id, second.external_id);

        broker
            .fulfill(second.external_id, RandomValue::from(7), Timestamp(50))
            .unwrap();

        assert!(!broker.is_request_complete(first.request_id));
        assert!(broker.is_request_complete(second.request_id));
        assert_eq!(broker.pending_count(), 1);
        assert_eq!(broker.completed_count(), 1);
    }

    #[traced_test]
    #[test]
    fn test_fulfill_unknown_external_id() {
        let mut broker = make_broker();
        let receipt = broker.submit_request(requester(0), &head(1)).unwrap();
        broker.drain_events();

        let stray = ExternalRequestId::from(0xDEAD);
        assert_eq!(
            broker.fulfill(stray, RandomValue::from(1), Timestamp(5)),
            Err(BrokerError::CorrelationNotFound(stray))
        );

        assert!(!broker.is_request_complete(receipt.request_id));
        assert_eq!(broker.last_request_id(), 1);
        assert!(broker.drain_events().is_empty());
        assert!(logs_contain("Fulfillment for unknown request"));
    }

    #[traced_test]
    #[test]
    fn test_repeated_fulfillment_is_rejected() {
        let mut broker = make_broker();
        let receipt = broker.submit_request(requester(0), &head(1)).unwrap();

        broker
            .fulfill(receipt.external_id, RandomValue::from(1), Timestamp(10))
            .unwrap();
        assert_eq!(
            broker.fulfill(receipt.external_id, RandomValue::from(2), Timestamp(20)),
            Err(BrokerError::AlreadyFulfilled(receipt.request_id))
        );

        assert_eq!(
            broker.random_value(receipt.request_id),
            Some(RandomValue::from(1))
        );
        assert_eq!(broker.completed_at(receipt.request_id), Some(Timestamp(10)));
    }

    #[traced_test]
    #[test]
    fn test_zero_value_is_a_real_completion() {
        let mut broker = make_broker();
        let receipt = broker.submit_request(requester(0), &head(0)).unwrap();

        broker
            .fulfill(receipt.external_id, RandomValue::from(0), Timestamp(0))
            .unwrap();

        assert!(broker.is_request_complete(receipt.request_id));
        assert_eq!(
            broker.random_value(receipt.request_id),
            Some(RandomValue::from(0))
        );
        assert_eq!(broker.completed_at(receipt.request_id), Some(Timestamp(0)));
        assert_eq!(broker.pending_count(), 0);
    }

    #[traced_test]
    #[test]
    fn test_lock_block_fixed_at_submission() {
        let mut broker = make_broker();
        let receipt = broker.submit_request(requester(0), &head(100)).unwrap();
        assert_eq!(receipt.lock_block, BlockHeight(103));

        broker.set_confirmations(20).unwrap();

        assert_eq!(
            broker.request_status(receipt.request_id),
            RequestStatus::Pending {
                lock_block: BlockHeight(103)
            }
        );
        let later = broker.submit_request(requester(1), &head(100)).unwrap();
        assert_eq!(later.lock_block, BlockHeight(120));
    }

    #[traced_test]
    #[test]
    fn test_correlation_without_record_is_rejected() {
        let mut broker = make_broker();
        let orphan = ExternalRequestId::from(0xBEEF);
        assert!(broker.correlations.insert(orphan, InternalRequestId(7)));

        assert_eq!(
            broker.fulfill(orphan, RandomValue::from(1), Timestamp(5)),
            Err(BrokerError::CorrelationNotFound(orphan))
        );
        assert_eq!(broker.completed_count(), 0);
        assert!(broker.drain_events().is_empty());
        assert!(logs_contain("Correlated request has no record"));
    }

    #[traced_test]
    #[test]
    fn test_dispatch_failure_changes_nothing() {
        let mut broker = make_broker();
        broker.oracle_mut().fail_next(DispatchError::Unavailable);

        assert_eq!(
            broker.submit_request(requester(0), &head(1)),
            Err(BrokerError::Dispatch(DispatchError::Unavailable))
        );
        assert_eq!(broker.last_request_id(), 0);
        assert_eq!(broker.pending_count(), 0);
        assert!(broker.drain_events().is_empty());

        // Failed submissions do not consume ids
        let receipt = broker.submit_request(requester(0), &head(1)).unwrap();
        assert_eq!(receipt.request_id, InternalRequestId(1));
    }

    #[traced_test]
    #[test]
    fn test_duplicate_external_id_changes_nothing() {
        let mut broker = make_broker();
        let first = broker.submit_request(requester(0), &head(1)).unwrap();
        broker.oracle_mut().repeat_next();

        assert_eq!(
            broker.submit_request(requester(1), &head(1)),
            Err(BrokerError::DuplicateExternalId(first.external_id))
        );
        assert_eq!(broker.last_request_id(), 1);
        assert_eq!(broker.resolve(&first.external_id), Some(first.request_id));
    }

    #[traced_test]
    #[test]
    fn test_zero_config_rejected() {
        let mut broker = make_broker();
        broker.set_callback_limit(300).unwrap();
        broker.set_confirmations(4).unwrap();
        let fee_before = broker.request_fee();
        broker.drain_events();

        assert_eq!(
            broker.set_callback_limit(0),
            Err(BrokerError::Config(ConfigError::ZeroCallbackLimit))
        );
        assert_eq!(
            broker.set_confirmations(0),
            Err(BrokerError::Config(ConfigError::ZeroConfirmations))
        );

        assert_eq!(broker.request_fee(), fee_before);
        assert!(broker.drain_events().is_empty());

        let receipt = broker.submit_request(requester(0), &head(10)).unwrap();
        assert_eq!(receipt.lock_block, BlockHeight(14));
        assert_eq!(broker.oracle().last_request().unwrap().callback_limit, 300);
    }

    #[traced_test]
    #[test]
    fn test_request_fee_tracks_callback_limit() {
        let mut broker = Broker::new(
            MockOracle::with_pricing(100, 2),
            fee_token(),
            BrokerConfig::new(1_000, 3).unwrap(),
        )
        .unwrap();

        assert_eq!(
            broker.request_fee(),
            FeeQuote {
                token: fee_token(),
                amount: FeeAmount(2_100),
            }
        );

        broker.set_callback_limit(2_000).unwrap();
        assert_eq!(broker.request_fee().amount, FeeAmount(4_100));
    }

    #[traced_test]
    #[test]
    fn test_events_follow_state_changes() {
        let mut broker = make_broker();
        let receipt = broker.submit_request(requester(3), &head(20)).unwrap();
        broker
            .fulfill(receipt.external_id, RandomValue::from(9), Timestamp(300))
            .unwrap();
        broker.set_callback_limit(77).unwrap();
        broker.set_confirmations(8).unwrap();

        assert_eq!(
            broker.drain_events(),
            vec![
                BrokerEvent::RequestSubmitted {
                    request_id: InternalRequestId(1),
                    requester: requester(3),
                    external_id: mock_external_id(0),
                    lock_block: BlockHeight(23),
                },
                BrokerEvent::RequestCompleted {
                    request_id: InternalRequestId(1),
                    value: RandomValue::from(9),
                },
                BrokerEvent::CallbackLimitChanged { callback_limit: 77 },
                BrokerEvent::ConfirmationsChanged { confirmations: 8 },
            ]
        );
        assert!(broker.drain_events().is_empty());
    }

    #[traced_test]
    #[test]
    fn test_unknown_ids_read_as_not_complete() {
        let broker = make_broker();
        let id = InternalRequestId(99);
        assert!(!broker.is_request_complete(id));
        assert_eq!(broker.random_value(id), None);
        assert_eq!(broker.completed_at(id), None);
        assert_eq!(broker.request_status(id), RequestStatus::Unknown);
    }
}
