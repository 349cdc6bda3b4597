//! Deterministic simulation runner.
//!
//! Drives a single broker node through simulated blocks against a seeded
//! oracle network. Given the same seed, a run produces identical results.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SimulationRunner                       │
//! │                                                         │
//! │   per block:                                            │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  advance ChainHead, set_chain_head on the node     │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  SimulatedOracle::take_ready → FulfillRandomness   │ │
//! │  │  (+ injected duplicate / stray deliveries)         │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  workload → SubmitRequest → oracle dispatch        │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  Actions → SimulationStats                         │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod config;
mod oracle;
mod runner;

pub use config::SimulationConfig;
pub use oracle::{OracleConfig, SimulatedOracle};
pub use runner::{
    SimulationError, SimulationRunner, SimulationStats, SIM_FEE_TOKEN, SIM_ORACLE, SIM_OWNER,
};
