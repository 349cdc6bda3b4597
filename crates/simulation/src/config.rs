//! Simulation configuration.

use crate::OracleConfig;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Random seed; identical seeds give identical runs.
    pub seed: u64,

    /// Seconds between blocks.
    pub block_interval_secs: u64,

    /// Requests submitted per block.
    pub requests_per_block: u32,

    /// Number of distinct requesters the workload rotates through.
    pub requesters: u64,

    /// Initial callback limit.
    pub callback_limit: u32,

    /// Initial confirmation depth.
    pub confirmations: u16,

    /// Probability, per block, that the oracle redelivers an already
    /// fulfilled request.
    pub duplicate_delivery_rate: f64,

    /// Probability, per block, of a fulfillment for an id nobody submitted.
    pub stray_fulfillment_rate: f64,

    /// Simulated oracle behaviour.
    pub oracle: OracleConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            block_interval_secs: 12,
            requests_per_block: 4,
            requesters: 16,
            callback_limit: 100_000,
            confirmations: 3,
            duplicate_delivery_rate: 0.0,
            stray_fulfillment_rate: 0.0,
            oracle: OracleConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of requests per block.
    pub fn with_requests_per_block(mut self, requests: u32) -> Self {
        self.requests_per_block = requests;
        self
    }

    /// Set the confirmation depth.
    pub fn with_confirmations(mut self, confirmations: u16) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Set the callback limit.
    pub fn with_callback_limit(mut self, callback_limit: u32) -> Self {
        self.callback_limit = callback_limit;
        self
    }

    /// Enable fault injection on the fulfillment path.
    pub fn with_faults(mut self, duplicate_rate: f64, stray_rate: f64) -> Self {
        self.duplicate_delivery_rate = duplicate_rate;
        self.stray_fulfillment_rate = stray_rate;
        self
    }

    /// Set the oracle behaviour.
    pub fn with_oracle(mut self, oracle: OracleConfig) -> Self {
        self.oracle = oracle;
        self
    }
}
