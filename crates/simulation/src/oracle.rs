//! Simulated oracle network.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::trace;
use vrfbroker_core::{DispatchError, OracleDispatch};
use vrfbroker_types::{BlockHeight, DispatchRequest, ExternalRequestId, FeeAmount, Word};

/// Behaviour of the simulated oracle network.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Flat fee per request.
    pub base_fee: u128,

    /// Additional fee per unit of callback limit.
    pub fee_per_unit: u128,

    /// Probability that a dispatch is refused.
    pub dispatch_failure_rate: f64,

    /// Maximum extra blocks the oracle may wait past the confirmation depth.
    ///
    /// The actual delay for each request is drawn uniformly from `0..=max`.
    pub max_extra_delay: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_fee: 250_000,
            fee_per_unit: 3,
            dispatch_failure_rate: 0.0,
            max_extra_delay: 2,
        }
    }
}

/// Oracle network stand-in.
///
/// Assigns random 256-bit external ids, remembers when each request becomes
/// deliverable, and hands those ids back to the runner once the chain is
/// high enough. The runner turns them into fulfillment events.
#[derive(Debug)]
pub struct SimulatedOracle {
    config: OracleConfig,
    rng: ChaCha8Rng,
    height: BlockHeight,
    /// ready_at -> external ids deliverable from that height
    in_flight: BTreeMap<BlockHeight, Vec<ExternalRequestId>>,
    in_flight_count: usize,
}

impl SimulatedOracle {
    /// Create an oracle with its own deterministic randomness.
    pub fn new(config: OracleConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            height: BlockHeight::GENESIS,
            in_flight: BTreeMap::new(),
            in_flight_count: 0,
        }
    }

    /// Tell the oracle the chain has reached `height`.
    pub fn observe_height(&mut self, height: BlockHeight) {
        self.height = height;
    }

    /// Remove and return every request deliverable at the observed height.
    pub fn take_ready(&mut self) -> Vec<ExternalRequestId> {
        let later = self.in_flight.split_off(&self.height.next());
        let ready: Vec<_> = std::mem::replace(&mut self.in_flight, later)
            .into_values()
            .flatten()
            .collect();
        self.in_flight_count -= ready.len();
        ready
    }

    /// Number of dispatched requests not yet handed back.
    pub fn in_flight(&self) -> usize {
        self.in_flight_count
    }

    /// Produce a fresh random value for a fulfillment.
    pub fn generate_value(&mut self) -> Word {
        Word::from_be_bytes(self.rng.gen())
    }

    /// The oracle's configuration.
    pub fn config(&self) -> &OracleConfig {
        &self.config
    }
}

impl OracleDispatch for SimulatedOracle {
    fn dispatch(&mut self, request: DispatchRequest) -> Result<ExternalRequestId, DispatchError> {
        if self.config.dispatch_failure_rate > 0.0
            && self.rng.gen_bool(self.config.dispatch_failure_rate.min(1.0))
        {
            return Err(DispatchError::Rejected("simulated outage".to_string()));
        }

        let external_id = ExternalRequestId(Word::from_be_bytes(self.rng.gen()));
        let delay = self.rng.gen_range(0..=self.config.max_extra_delay);
        let ready_at = self
            .height
            .saturating_add(u64::from(request.confirmations))
            .saturating_add(delay);

        trace!(
            external_id = %external_id,
            ready_at = ready_at.0,
            "Oracle accepted request"
        );

        self.in_flight.entry(ready_at).or_default().push(external_id);
        self.in_flight_count += 1;
        Ok(external_id)
    }

    fn price_for(&self, callback_limit: u32) -> FeeAmount {
        FeeAmount(self.config.base_fee + self.config.fee_per_unit * u128::from(callback_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(confirmations: u16) -> DispatchRequest {
        DispatchRequest {
            callback_limit: 100_000,
            confirmations,
            num_words: 1,
        }
    }

    #[test]
    fn test_requests_wait_for_confirmations() {
        let config = OracleConfig {
            max_extra_delay: 0,
            ..Default::default()
        };
        let mut oracle = SimulatedOracle::new(config, 7);
        oracle.observe_height(BlockHeight(10));
        let id = oracle.dispatch(request(3)).unwrap();

        oracle.observe_height(BlockHeight(12));
        assert!(oracle.take_ready().is_empty());
        assert_eq!(oracle.in_flight(), 1);

        oracle.observe_height(BlockHeight(13));
        assert_eq!(oracle.take_ready(), vec![id]);
        assert_eq!(oracle.in_flight(), 0);
        assert!(oracle.take_ready().is_empty());
    }

    #[test]
    fn test_same_seed_same_ids() {
        let mut a = SimulatedOracle::new(OracleConfig::default(), 99);
        let mut b = SimulatedOracle::new(OracleConfig::default(), 99);
        for _ in 0..5 {
            assert_eq!(a.dispatch(request(1)), b.dispatch(request(1)));
        }
    }

    #[test]
    fn test_full_failure_rate_refuses_everything() {
        let config = OracleConfig {
            dispatch_failure_rate: 1.0,
            ..Default::default()
        };
        let mut oracle = SimulatedOracle::new(config, 1);
        assert!(matches!(
            oracle.dispatch(request(1)),
            Err(DispatchError::Rejected(_))
        ));
        assert_eq!(oracle.in_flight(), 0);
    }

    #[test]
    fn test_price() {
        let oracle = SimulatedOracle::new(
            OracleConfig {
                base_fee: 5,
                fee_per_unit: 2,
                ..Default::default()
            },
            0,
        );
        assert_eq!(oracle.price_for(10), FeeAmount(25));
    }
}
