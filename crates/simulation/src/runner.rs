//! Deterministic block-by-block simulation runner.

use crate::{SimulatedOracle, SimulationConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};
use vrfbroker_broker::{Broker, BrokerConfig};
use vrfbroker_core::{Action, BrokerError, CallId, Event, Rejection, Reply, StateMachine};
use vrfbroker_node::{AccessPolicy, BrokerNode};
use vrfbroker_types::{
    AccountId, BlockHeight, BrokerEvent, ChainHead, ExternalRequestId, InternalRequestId,
    RandomValue, RequestStatus, Timestamp, Word,
};

/// Account that owns the simulated broker.
pub const SIM_OWNER: AccountId = AccountId([0x01; 20]);

/// Account the simulated oracle calls back from.
pub const SIM_ORACLE: AccountId = AccountId([0x02; 20]);

/// Fee token of the simulated broker.
pub const SIM_FEE_TOKEN: AccountId = AccountId([0x03; 20]);

/// Errors from setting up or checking a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The broker could not be constructed from the configuration.
    #[error("Setup failed: {0}")]
    Setup(#[from] BrokerError),

    /// A broker invariant did not hold after the run.
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

/// Counters collected during a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationStats {
    /// Blocks produced.
    pub blocks: u64,
    /// Submissions that returned a receipt.
    pub submitted: u64,
    /// Submissions the oracle refused.
    pub dispatch_failures: u64,
    /// Fulfillments applied.
    pub fulfilled: u64,
    /// Redeliveries rejected as already fulfilled.
    pub duplicate_rejections: u64,
    /// Fulfillments rejected for unknown external ids.
    pub stray_rejections: u64,
    /// Rejections that fit none of the above.
    pub unexpected_rejections: u64,
    /// Broker events observed.
    pub events_emitted: u64,
    /// Sum of submit-to-fulfill latencies, in blocks.
    pub total_latency_blocks: u64,
    /// Smallest submit-to-fulfill latency seen.
    pub min_latency_blocks: Option<u64>,
    /// Largest submit-to-fulfill latency seen.
    pub max_latency_blocks: u64,
}

impl SimulationStats {
    /// Requests submitted but not yet fulfilled.
    pub fn pending(&self) -> u64 {
        self.submitted - self.fulfilled
    }

    /// Mean submit-to-fulfill latency in blocks.
    pub fn mean_latency_blocks(&self) -> f64 {
        if self.fulfilled == 0 {
            return 0.0;
        }
        self.total_latency_blocks as f64 / self.fulfilled as f64
    }

    fn record_latency(&mut self, blocks: u64) {
        self.total_latency_blocks += blocks;
        self.max_latency_blocks = self.max_latency_blocks.max(blocks);
        self.min_latency_blocks = Some(self.min_latency_blocks.map_or(blocks, |m| m.min(blocks)));
    }
}

/// Drives a broker node through simulated blocks.
///
/// Every block the runner advances the chain head, lets the oracle deliver
/// whatever has cleared its confirmation depth, optionally injects faulty
/// callbacks, and submits the configured workload. All randomness comes from
/// the seed, so a run is reproducible.
pub struct SimulationRunner {
    node: BrokerNode<SimulatedOracle>,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    head: ChainHead,
    next_call: u64,
    submitted_at: HashMap<InternalRequestId, BlockHeight>,
    completed_at: HashMap<InternalRequestId, BlockHeight>,
    delivered: Vec<ExternalRequestId>,
    stats: SimulationStats,
}

impl SimulationRunner {
    /// Create a runner from a configuration.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        let broker_config = BrokerConfig::new(config.callback_limit, config.confirmations)
            .map_err(BrokerError::from)?;
        let oracle = SimulatedOracle::new(config.oracle.clone(), config.seed.wrapping_add(1));
        let broker = Broker::builder()
            .oracle(oracle)
            .fee_token(SIM_FEE_TOKEN)
            .config(broker_config)
            .build()?;

        let node = BrokerNode::new(broker, AccessPolicy::new(SIM_OWNER, SIM_ORACLE));

        Ok(Self {
            node,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            head: ChainHead::new(BlockHeight::GENESIS, Timestamp(0)),
            next_call: 0,
            submitted_at: HashMap::new(),
            completed_at: HashMap::new(),
            delivered: Vec::new(),
            stats: SimulationStats::default(),
        })
    }

    /// Produce one block with workload.
    pub fn step(&mut self) {
        self.advance_block(true);
    }

    /// Produce `blocks` blocks with workload.
    pub fn run_blocks(&mut self, blocks: u64) -> &SimulationStats {
        info!(blocks, seed = self.config.seed, "Running simulation");
        for _ in 0..blocks {
            self.step();
        }
        &self.stats
    }

    /// Produce blocks without new submissions until the oracle has delivered
    /// everything, or `max_blocks` have passed. Returns true if nothing is
    /// left in flight.
    pub fn settle(&mut self, max_blocks: u64) -> bool {
        for _ in 0..max_blocks {
            if self.oracle_in_flight() == 0 {
                break;
            }
            self.advance_block(false);
        }
        self.oracle_in_flight() == 0
    }

    /// Change configuration mid-run as the owner would.
    pub fn reconfigure(&mut self, callback_limit: u32, confirmations: u16) -> Vec<Action> {
        let mut actions = self.handle(|call| Event::SetCallbackLimit {
            call,
            caller: SIM_OWNER,
            callback_limit,
        });
        actions.extend(self.handle(|call| Event::SetConfirmations {
            call,
            caller: SIM_OWNER,
            confirmations,
        }));
        actions
    }

    /// Counters so far.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// The simulated node.
    pub fn node(&self) -> &BrokerNode<SimulatedOracle> {
        &self.node
    }

    /// Current chain head.
    pub fn head(&self) -> ChainHead {
        self.head
    }

    /// Check the broker's externally visible invariants against what the
    /// runner observed.
    pub fn check_invariants(&self) -> Result<(), SimulationError> {
        let broker = self.node.broker();

        if broker.last_request_id() != self.stats.submitted {
            return Err(SimulationError::Invariant(format!(
                "last request id {} but {} successful submissions",
                broker.last_request_id(),
                self.stats.submitted
            )));
        }

        if broker.completed_count() as u64 != self.stats.fulfilled
            || broker.pending_count() as u64 != self.stats.pending()
        {
            return Err(SimulationError::Invariant(format!(
                "store has {} completed / {} pending, runner saw {} / {}",
                broker.completed_count(),
                broker.pending_count(),
                self.stats.fulfilled,
                self.stats.pending()
            )));
        }

        for raw in 1..=self.stats.submitted {
            let id = InternalRequestId(raw);
            match broker.request_status(id) {
                RequestStatus::Unknown => {
                    return Err(SimulationError::Invariant(format!("{id} missing")));
                }
                RequestStatus::Pending { .. } => {}
                RequestStatus::Completed { lock_block, .. } => {
                    let at = self.completed_at.get(&id).copied().ok_or_else(|| {
                        SimulationError::Invariant(format!("{id} completed without an event"))
                    })?;
                    // Lock block carries the depth in force at submission.
                    if at < lock_block {
                        return Err(SimulationError::Invariant(format!(
                            "{id} fulfilled at {at} before lock block {lock_block}"
                        )));
                    }
                }
            }
        }

        if self.stats.unexpected_rejections > 0 {
            return Err(SimulationError::Invariant(format!(
                "{} unexpected rejections",
                self.stats.unexpected_rejections
            )));
        }

        Ok(())
    }

    fn oracle_in_flight(&self) -> usize {
        self.node.broker().oracle().in_flight()
    }

    fn advance_block(&mut self, submit: bool) {
        self.head = self.head.advance(self.config.block_interval_secs);
        self.node.set_chain_head(self.head);
        self.node
            .broker_mut()
            .oracle_mut()
            .observe_height(self.head.height);

        let ready = self.node.broker_mut().oracle_mut().take_ready();
        for external_id in ready {
            self.deliver(external_id);
            self.delivered.push(external_id);
        }

        if self.config.duplicate_delivery_rate > 0.0
            && !self.delivered.is_empty()
            && self.rng.gen_bool(self.config.duplicate_delivery_rate.min(1.0))
        {
            let external_id = self.delivered[self.rng.gen_range(0..self.delivered.len())];
            debug!(external_id = %external_id, "Injecting duplicate delivery");
            self.deliver(external_id);
        }

        if self.config.stray_fulfillment_rate > 0.0
            && self.rng.gen_bool(self.config.stray_fulfillment_rate.min(1.0))
        {
            let external_id = ExternalRequestId(Word::from_be_bytes(self.rng.gen()));
            debug!(external_id = %external_id, "Injecting stray fulfillment");
            self.deliver(external_id);
        }

        if submit {
            for _ in 0..self.config.requests_per_block {
                let n = self.rng.gen_range(0..self.config.requesters.max(1));
                let requester = AccountId::from_index(0x1000 + n);
                self.handle(|call| Event::SubmitRequest { call, requester });
            }
        }

        self.stats.blocks += 1;
    }

    fn deliver(&mut self, external_id: ExternalRequestId) {
        let value = RandomValue(self.node.broker_mut().oracle_mut().generate_value());
        self.handle(|call| Event::FulfillRandomness {
            call,
            caller: SIM_ORACLE,
            external_id,
            value,
        });
    }

    fn handle(&mut self, make_event: impl FnOnce(CallId) -> Event) -> Vec<Action> {
        self.next_call += 1;
        let event = make_event(CallId(self.next_call));
        let actions = self.node.handle(event);
        for action in &actions {
            self.observe(action);
        }
        actions
    }

    fn observe(&mut self, action: &Action) {
        match action {
            Action::Respond { response, .. } => match response {
                Ok(Reply::Submitted(_)) => self.stats.submitted += 1,
                Ok(Reply::Fulfilled(_)) => self.stats.fulfilled += 1,
                Ok(_) => {}
                Err(Rejection::Broker(BrokerError::Dispatch(_))) => {
                    self.stats.dispatch_failures += 1
                }
                Err(Rejection::Broker(BrokerError::AlreadyFulfilled(_))) => {
                    self.stats.duplicate_rejections += 1
                }
                Err(Rejection::Broker(BrokerError::CorrelationNotFound(_))) => {
                    self.stats.stray_rejections += 1
                }
                Err(other) => {
                    warn!(error = %other, "Unexpected rejection");
                    self.stats.unexpected_rejections += 1;
                }
            },
            Action::Emit(event) => {
                self.stats.events_emitted += 1;
                match *event {
                    BrokerEvent::RequestSubmitted { request_id, .. } => {
                        self.submitted_at.insert(request_id, self.head.height);
                    }
                    BrokerEvent::RequestCompleted { request_id, .. } => {
                        self.completed_at.insert(request_id, self.head.height);
                        if let Some(&at) = self.submitted_at.get(&request_id) {
                            self.stats
                                .record_latency(self.head.height.blocks_since(at));
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}
