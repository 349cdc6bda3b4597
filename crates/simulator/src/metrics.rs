//! Run reports.

use serde::Serialize;
use vrfbroker_simulation::SimulationStats;

/// Summary of a finished simulator run.
#[derive(Clone, Debug, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub final_height: u64,
    /// Whether every dispatched request was delivered before the run ended.
    pub settled: bool,
    pub callback_limit: u32,
    pub confirmations: u16,
    pub stats: SimulationStats,
}

impl SimulationReport {
    /// Mean submit-to-fulfill latency in blocks.
    pub fn mean_latency_blocks(&self) -> f64 {
        self.stats.mean_latency_blocks()
    }

    /// Fraction of submission attempts the oracle refused.
    pub fn dispatch_failure_ratio(&self) -> f64 {
        let attempts = self.stats.submitted + self.stats.dispatch_failures;
        if attempts == 0 {
            return 0.0;
        }
        self.stats.dispatch_failures as f64 / attempts as f64
    }

    /// Print a human-readable summary to stdout.
    pub fn print(&self) {
        let stats = &self.stats;
        println!("=== Simulation Report ===");
        println!("Seed:                 {}", self.seed);
        println!("Blocks:               {}", stats.blocks);
        println!("Final height:         {}", self.final_height);
        println!(
            "Broker config:        callback_limit={} confirmations={}",
            self.callback_limit, self.confirmations
        );
        println!();
        println!("Submitted:            {}", stats.submitted);
        println!(
            "Dispatch failures:    {} ({:.1}%)",
            stats.dispatch_failures,
            self.dispatch_failure_ratio() * 100.0
        );
        println!("Fulfilled:            {}", stats.fulfilled);
        println!("Pending:              {}", stats.pending());
        println!("Duplicate rejections: {}", stats.duplicate_rejections);
        println!("Stray rejections:     {}", stats.stray_rejections);
        println!("Events emitted:       {}", stats.events_emitted);
        println!();
        println!(
            "Latency (blocks):     mean={:.2} min={} max={}",
            self.mean_latency_blocks(),
            stats
                .min_latency_blocks
                .map_or_else(|| "-".to_string(), |m| m.to_string()),
            stats.max_latency_blocks
        );
        if !self.settled {
            println!("WARNING: requests still in flight at end of run");
        }
    }
}
