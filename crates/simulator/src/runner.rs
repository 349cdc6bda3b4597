//! Simulator driver.

use crate::{SimulationReport, SimulatorConfig};
use tracing::{info, warn};
use vrfbroker_simulation::{SimulationError, SimulationRunner};

/// Runs a configured workload to completion and reports on it.
pub struct Simulator {
    config: SimulatorConfig,
    runner: SimulationRunner,
}

impl Simulator {
    /// Set up the broker and oracle for a run.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulationError> {
        let runner = SimulationRunner::new(config.to_simulation_config())?;
        Ok(Self { config, runner })
    }

    /// Produce the configured blocks, let outstanding requests settle, and
    /// check the broker's invariants.
    pub fn run(&mut self) -> Result<SimulationReport, SimulationError> {
        info!(
            seed = self.config.seed,
            blocks = self.config.blocks,
            requests_per_block = self.config.workload.requests_per_block,
            "Starting simulation"
        );

        self.runner.run_blocks(self.config.blocks);
        let settled = self.runner.settle(self.config.settle_blocks);
        if !settled {
            warn!(
                settle_blocks = self.config.settle_blocks,
                "Oracle still has requests in flight"
            );
        }

        self.runner.check_invariants()?;

        let broker = self.runner.node().broker();
        let report = SimulationReport {
            seed: self.config.seed,
            final_height: self.runner.head().height.0,
            settled,
            callback_limit: broker.config().callback_limit(),
            confirmations: broker.config().confirmations(),
            stats: self.runner.stats().clone(),
        };

        info!(
            submitted = report.stats.submitted,
            fulfilled = report.stats.fulfilled,
            mean_latency = report.mean_latency_blocks(),
            "Simulation finished"
        );
        Ok(report)
    }
}
