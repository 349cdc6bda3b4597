//! Configuration types for the simulator.
//!
//! Every field has a default, so a config file only needs to name the values
//! it changes:
//!
//! ```toml
//! seed = 7
//! blocks = 500
//!
//! [workload]
//! requests_per_block = 8
//!
//! [faults]
//! stray_fulfillment_rate = 0.05
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use vrfbroker_simulation::{OracleConfig, SimulationConfig};

/// Errors from loading or validating a simulator config.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field} must be a probability in [0, 1], got {value}")]
    InvalidRate { field: &'static str, value: f64 },
}

/// Configuration for a simulator run.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Random seed for deterministic simulation.
    pub seed: u64,

    /// Blocks to produce with workload.
    pub blocks: u64,

    /// Extra blocks allowed for outstanding requests to be delivered.
    pub settle_blocks: u64,

    /// Seconds between blocks.
    pub block_interval_secs: u64,

    /// Broker configuration at genesis.
    pub broker: BrokerSettings,

    /// Workload configuration.
    pub workload: WorkloadConfig,

    /// Oracle network behaviour.
    pub oracle: OracleSettings,

    /// Fault injection.
    pub faults: FaultConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            blocks: 100,
            settle_blocks: 64,
            block_interval_secs: 12,
            broker: BrokerSettings::default(),
            workload: WorkloadConfig::default(),
            oracle: OracleSettings::default(),
            faults: FaultConfig::default(),
        }
    }
}

impl SimulatorConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of blocks to run.
    pub fn with_blocks(mut self, blocks: u64) -> Self {
        self.blocks = blocks;
        self
    }

    /// Set the workload configuration.
    pub fn with_workload(mut self, workload: WorkloadConfig) -> Self {
        self.workload = workload;
        self
    }

    /// Set the fault configuration.
    pub fn with_faults(mut self, faults: FaultConfig) -> Self {
        self.faults = faults;
        self
    }

    /// Check that every rate is a probability.
    ///
    /// Zero callback limits and confirmation depths are left to the broker,
    /// which rejects them when the run is set up.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let rates = [
            ("faults.duplicate_delivery_rate", self.faults.duplicate_delivery_rate),
            ("faults.stray_fulfillment_rate", self.faults.stray_fulfillment_rate),
            ("faults.dispatch_failure_rate", self.faults.dispatch_failure_rate),
        ];
        for (field, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigLoadError::InvalidRate { field, value });
            }
        }
        Ok(())
    }

    /// Convert to the configuration of the underlying simulation.
    pub fn to_simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            seed: self.seed,
            block_interval_secs: self.block_interval_secs,
            requests_per_block: self.workload.requests_per_block,
            requesters: self.workload.requesters,
            callback_limit: self.broker.callback_limit,
            confirmations: self.broker.confirmations,
            duplicate_delivery_rate: self.faults.duplicate_delivery_rate,
            stray_fulfillment_rate: self.faults.stray_fulfillment_rate,
            oracle: OracleConfig {
                base_fee: self.oracle.base_fee,
                fee_per_unit: self.oracle.fee_per_unit,
                dispatch_failure_rate: self.faults.dispatch_failure_rate,
                max_extra_delay: self.oracle.max_extra_delay,
            },
        }
    }
}

/// Broker settings at genesis.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerSettings {
    pub callback_limit: u32,
    pub confirmations: u16,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            callback_limit: 100_000,
            confirmations: 3,
        }
    }
}

/// Workload configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadConfig {
    /// Requests submitted per block.
    pub requests_per_block: u32,

    /// Distinct requester accounts.
    pub requesters: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            requests_per_block: 4,
            requesters: 16,
        }
    }
}

impl WorkloadConfig {
    /// Set the number of requests per block.
    pub fn with_requests_per_block(mut self, requests: u32) -> Self {
        self.requests_per_block = requests;
        self
    }
}

/// Oracle pricing and latency.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OracleSettings {
    pub base_fee: u128,
    pub fee_per_unit: u128,
    /// Extra blocks past the confirmation depth the oracle may wait.
    pub max_extra_delay: u64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        let oracle = OracleConfig::default();
        Self {
            base_fee: oracle.base_fee,
            fee_per_unit: oracle.fee_per_unit,
            max_extra_delay: oracle.max_extra_delay,
        }
    }
}

/// Fault injection rates.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaultConfig {
    /// Per-block chance of redelivering an already fulfilled request.
    pub duplicate_delivery_rate: f64,

    /// Per-block chance of a fulfillment for an unknown external id.
    pub stray_fulfillment_rate: f64,

    /// Per-request chance that the oracle refuses the dispatch.
    pub dispatch_failure_rate: f64,
}
