//! Broker Simulator
//!
//! A workload simulator built on top of the simulation framework. Loads a
//! run description from TOML, drives the broker through it, and reports
//! throughput, latency, and how many faulty callbacks were turned away.
//!
//! # Example
//!
//! ```ignore
//! use vrfbroker_simulator::{Simulator, SimulatorConfig, WorkloadConfig};
//!
//! let config = SimulatorConfig::default()
//!     .with_blocks(200)
//!     .with_workload(WorkloadConfig::default().with_requests_per_block(10));
//!
//! let report = Simulator::new(config)?.run()?;
//! println!("Mean latency: {:.2} blocks", report.mean_latency_blocks());
//! ```

pub mod config;
pub mod metrics;
pub mod runner;

pub use config::{
    BrokerSettings, ConfigLoadError, FaultConfig, OracleSettings, SimulatorConfig, WorkloadConfig,
};
pub use metrics::SimulationReport;
pub use runner::Simulator;
