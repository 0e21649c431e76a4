// src/simulation/monte_carlo.rs

//! Replication and statistical summary layer.
//!
//! Every replication gets its own seed derived from the master seed and its index, so a
//! run is reproducible no matter how the replications are scheduled across threads.
//! Results are always reduced in index order.

use crate::error::{SimError, SimResult};
use crate::simulation::config::{PolicyParameters, SimulationConfig};
use crate::simulation::engine::{fill_rate, ReplicationResult, ReplicationSimulator};
use log::info;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Seed for replication `index`, mixed so neighbouring indices land far apart.
pub fn derive_seed(master_seed: u64, index: u64) -> u64 {
    let mut z = master_seed ^ index.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Mean cost of each component per replication.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub holding: f64,
    pub shortage: f64,
    pub ordering: f64,
    pub purchasing: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.holding + self.shortage + self.ordering + self.purchasing
    }
}

/// Spread of total cost across replications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentile_10: f64,
    pub percentile_50: f64,
    pub percentile_90: f64,
}

/// Where on-hand stock stood at the end of the last day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryDistribution {
    pub mean: f64,
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
    /// Ending on-hand level -> number of replications that ended there.
    pub histogram: BTreeMap<u32, usize>,
}

/// Aggregated statistics of all replications of one policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub replications: u32,
    pub horizon_days: u32,
    pub total_cost: CostStats,
    pub mean_daily_cost: f64,
    pub mean_cost_per_cycle: f64,
    pub mean_breakdown: CostBreakdown,
    /// Share of all demand served from stock on the day it occurred.
    pub service_level: f64,
    /// Share of all simulated days with at least one unit short.
    pub stockout_day_frequency: f64,
    pub mean_orders: f64,
    pub ending_inventory: InventoryDistribution,
    /// Mean ending on-hand for each day, across replications.
    pub daily_mean_on_hand: Vec<f64>,
    /// Mean total cost for each day, across replications.
    pub daily_mean_cost: Vec<f64>,
}

/// Runs many independent replications of a policy.
#[derive(Debug, Clone)]
pub struct MonteCarloRunner {
    config: SimulationConfig,
}

impl MonteCarloRunner {
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Runs every replication and keeps the full daily histories.
    pub fn run_replications(&self, params: &PolicyParameters) -> SimResult<Vec<ReplicationResult>> {
        let simulator = ReplicationSimulator::new(params)?;
        let master_seed = self.config.master_seed;
        let count = self.config.replications;

        info!(
            "running {} replications of M={} N={} over {} days",
            count, params.order_up_to, params.review_interval, params.horizon_days
        );

        let results = if self.config.parallel {
            (0..count)
                .into_par_iter()
                .map(|index| simulator.run(derive_seed(master_seed, index as u64)))
                .collect::<SimResult<Vec<_>>>()?
        } else {
            (0..count)
                .map(|index| simulator.run(derive_seed(master_seed, index as u64)))
                .collect::<SimResult<Vec<_>>>()?
        };

        Ok(results)
    }

    /// Runs every replication and reduces them to a summary.
    pub fn run(&self, params: &PolicyParameters) -> SimResult<SimulationSummary> {
        let results = self.run_replications(params)?;
        let summary = summarize(params, &results)?;
        info!(
            "M={} N={}: mean cost {:.2} (sd {:.2}), service level {:.4}",
            params.order_up_to,
            params.review_interval,
            summary.total_cost.mean,
            summary.total_cost.std_dev,
            summary.service_level
        );
        Ok(summary)
    }
}

/// Reduces a set of replications of `params` to its summary statistics.
pub fn summarize(params: &PolicyParameters, results: &[ReplicationResult]) -> SimResult<SimulationSummary> {
    if results.is_empty() {
        return Err(SimError::config("cannot summarize zero replications"));
    }
    let horizon = params.horizon_days as usize;
    if let Some(bad) = results.iter().find(|r| r.len() != horizon) {
        return Err(SimError::inconsistency(
            bad.len() as u32,
            format!("replication has {} days, horizon is {}", bad.len(), horizon),
        ));
    }
    for result in results {
        let summed: f64 = result.days.iter().map(|d| d.total_cost).sum();
        if (summed - result.total_cost).abs() > 1e-9 * result.total_cost.abs().max(1.0) {
            return Err(SimError::inconsistency(
                params.horizon_days,
                format!(
                    "replication total {} does not match its daily costs {}",
                    result.total_cost, summed
                ),
            ));
        }
    }

    let n = results.len() as f64;
    let totals: Vec<f64> = results.iter().map(|r| r.total_cost).collect();
    let total_cost = cost_stats(&totals);

    let mut breakdown = CostBreakdown::default();
    let mut demand = 0u64;
    let mut short = 0u64;
    let mut stockout_days = 0usize;
    let mut orders = 0usize;
    let mut daily_on_hand = vec![0.0; horizon];
    let mut daily_cost = vec![0.0; horizon];

    for result in results {
        breakdown.holding += result.holding_cost();
        breakdown.shortage += result.shortage_cost();
        breakdown.ordering += result.ordering_cost();
        breakdown.purchasing += result.purchasing_cost();
        demand += result.total_demand();
        short += result.total_short();
        stockout_days += result.stockout_days();
        orders += result.orders_placed();
        for (i, record) in result.days.iter().enumerate() {
            daily_on_hand[i] += record.on_hand_end as f64;
            daily_cost[i] += record.total_cost;
        }
    }

    breakdown.holding /= n;
    breakdown.shortage /= n;
    breakdown.ordering /= n;
    breakdown.purchasing /= n;
    daily_on_hand.iter_mut().for_each(|v| *v /= n);
    daily_cost.iter_mut().for_each(|v| *v /= n);

    let cycles = params.cycles();
    let mean_cost_per_cycle = if cycles > 0.0 {
        total_cost.mean / cycles
    } else {
        0.0
    };

    Ok(SimulationSummary {
        replications: results.len() as u32,
        horizon_days: params.horizon_days,
        mean_daily_cost: total_cost.mean / horizon as f64,
        mean_cost_per_cycle,
        total_cost,
        mean_breakdown: breakdown,
        service_level: fill_rate(short, demand),
        stockout_day_frequency: stockout_days as f64 / (n * horizon as f64),
        mean_orders: orders as f64 / n,
        ending_inventory: inventory_distribution(results),
        daily_mean_on_hand: daily_on_hand,
        daily_mean_cost: daily_cost,
    })
}

fn mean_and_std_dev(values: &[f64]) -> (f64, f64) {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    (mean, variance.sqrt())
}

fn cost_stats(totals: &[f64]) -> CostStats {
    let (mean, std_dev) = mean_and_std_dev(totals);

    let mut sorted = totals.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let percentile = |p: f64| {
        let index = ((p / 100.0) * (sorted.len() as f64 - 1.0)).round() as usize;
        sorted[index.min(sorted.len() - 1)]
    };

    CostStats {
        mean,
        std_dev,
        min: sorted.first().copied().unwrap_or(0.0),
        max: sorted.last().copied().unwrap_or(0.0),
        percentile_10: percentile(10.0),
        percentile_50: percentile(50.0),
        percentile_90: percentile(90.0),
    }
}

fn inventory_distribution(results: &[ReplicationResult]) -> InventoryDistribution {
    let ending: Vec<u32> = results.iter().map(|r| r.ending_on_hand()).collect();
    let as_f64: Vec<f64> = ending.iter().map(|&v| v as f64).collect();
    let (mean, std_dev) = mean_and_std_dev(&as_f64);

    let mut histogram = BTreeMap::new();
    for level in &ending {
        *histogram.entry(*level).or_insert(0) += 1;
    }

    InventoryDistribution {
        mean,
        std_dev,
        min: ending.iter().copied().min().unwrap_or(0),
        max: ending.iter().copied().max().unwrap_or(0),
        histogram,
    }
}
