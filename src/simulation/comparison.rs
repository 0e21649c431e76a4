// src/simulation/comparison.rs

use crate::error::SimResult;
use crate::simulation::config::PolicyParameters;
use crate::simulation::monte_carlo::{MonteCarloRunner, SimulationSummary};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A policy scenario with the label it is reported under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPolicy {
    pub name: String,
    #[serde(flatten)]
    pub parameters: PolicyParameters,
}

impl NamedPolicy {
    pub fn new(name: impl Into<String>, parameters: PolicyParameters) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

/// An ordered, read-only set of named policies.
///
/// Passed explicitly to whoever needs it; there is no global registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyCatalog {
    policies: Vec<NamedPolicy>,
}

impl PolicyCatalog {
    pub fn new(policies: Vec<NamedPolicy>) -> Self {
        Self { policies }
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedPolicy> {
        self.policies.iter()
    }

    /// Copy of the catalog with `policy` appended.
    pub fn with_policy(&self, policy: NamedPolicy) -> Self {
        let mut policies = self.policies.clone();
        policies.push(policy);
        Self { policies }
    }

    /// First policy with the given name.
    pub fn get(&self, name: &str) -> Option<&NamedPolicy> {
        self.policies.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.policies.iter().map(|p| p.name.as_str()).collect()
    }

    /// Copy of the catalog with `edit` applied to every policy.
    pub fn map_parameters<F>(&self, edit: F) -> Self
    where
        F: Fn(&mut PolicyParameters),
    {
        let policies = self
            .policies
            .iter()
            .cloned()
            .map(|mut policy| {
                edit(&mut policy.parameters);
                policy
            })
            .collect();
        Self { policies }
    }
}

/// Outcome of simulating one catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyComparison {
    pub name: String,
    pub parameters: PolicyParameters,
    pub summary: SimulationSummary,
}

/// Flat view of a comparison, one line per policy, for tables and CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub policy: String,
    pub order_up_to: u32,
    pub review_interval: u32,
    pub horizon_days: u32,
    pub mean_total_cost: f64,
    pub std_dev_total_cost: f64,
    pub mean_cost_per_cycle: f64,
    pub mean_daily_cost: f64,
    pub holding_cost: f64,
    pub shortage_cost: f64,
    pub ordering_cost: f64,
    pub purchasing_cost: f64,
    pub service_level: f64,
    pub stockout_day_frequency: f64,
    pub mean_orders: f64,
    pub mean_ending_inventory: f64,
}

impl From<&PolicyComparison> for ComparisonRow {
    fn from(c: &PolicyComparison) -> Self {
        let s = &c.summary;
        Self {
            policy: c.name.clone(),
            order_up_to: c.parameters.order_up_to,
            review_interval: c.parameters.review_interval,
            horizon_days: c.parameters.horizon_days,
            mean_total_cost: s.total_cost.mean,
            std_dev_total_cost: s.total_cost.std_dev,
            mean_cost_per_cycle: s.mean_cost_per_cycle,
            mean_daily_cost: s.mean_daily_cost,
            holding_cost: s.mean_breakdown.holding,
            shortage_cost: s.mean_breakdown.shortage,
            ordering_cost: s.mean_breakdown.ordering,
            purchasing_cost: s.mean_breakdown.purchasing,
            service_level: s.service_level,
            stockout_day_frequency: s.stockout_day_frequency,
            mean_orders: s.mean_orders,
            mean_ending_inventory: s.ending_inventory.mean,
        }
    }
}

pub fn comparison_rows(results: &[PolicyComparison]) -> Vec<ComparisonRow> {
    results.iter().map(ComparisonRow::from).collect()
}

/// Lowest mean cost per cycle; the earlier policy wins a tie.
pub fn cheapest(results: &[PolicyComparison]) -> Option<&PolicyComparison> {
    let mut best: Option<&PolicyComparison> = None;
    for candidate in results {
        match best {
            Some(current)
                if candidate.summary.mean_cost_per_cycle >= current.summary.mean_cost_per_cycle => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Runs the same Monte Carlo set-up over every policy of a catalog.
///
/// All policies share the master seed, so replication `i` of each policy sees the same
/// demand path.
#[derive(Debug, Clone)]
pub struct PolicyComparator {
    runner: MonteCarloRunner,
}

impl PolicyComparator {
    pub fn new(runner: MonteCarloRunner) -> Self {
        Self { runner }
    }

    /// Summaries in catalog order.
    pub fn compare(&self, catalog: &PolicyCatalog) -> SimResult<Vec<PolicyComparison>> {
        let evaluate = |policy: &NamedPolicy| -> SimResult<PolicyComparison> {
            Ok(PolicyComparison {
                name: policy.name.clone(),
                parameters: policy.parameters.clone(),
                summary: self.runner.run(&policy.parameters)?,
            })
        };

        if self.runner.config().parallel {
            catalog
                .policies
                .par_iter()
                .map(evaluate)
                .collect::<SimResult<Vec<_>>>()
        } else {
            catalog.iter().map(evaluate).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::simulation::config::SimulationConfig;

    fn comparator(parallel: bool) -> PolicyComparator {
        PolicyComparator::new(
            MonteCarloRunner::new(SimulationConfig {
                replications: 30,
                master_seed: 11,
                parallel,
            })
            .unwrap(),
        )
    }

    fn catalog() -> PolicyCatalog {
        PolicyCatalog::new(vec![
            NamedPolicy::new("zeta", PolicyParameters::new(6, 12)),
            NamedPolicy::new("alpha", PolicyParameters::new(5, 11)),
            NamedPolicy::new("alpha again", PolicyParameters::new(5, 11)),
        ])
    }

    #[test]
    fn keeps_input_order_and_duplicates() {
        let results = comparator(true).compare(&catalog()).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "alpha again"]);
        // identical parameters and seed give identical summaries
        assert_eq!(results[1].summary, results[2].summary);
    }

    #[test]
    fn parallel_matches_sequential() {
        let a = comparator(true).compare(&catalog()).unwrap();
        let b = comparator(false).compare(&catalog()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn cheapest_prefers_first_on_tie() {
        let results = comparator(false).compare(&catalog()).unwrap();
        let best = cheapest(&results).unwrap();
        let min = results
            .iter()
            .map(|r| r.summary.mean_cost_per_cycle)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(best.summary.mean_cost_per_cycle, min);
        if best.parameters == PolicyParameters::new(5, 11) {
            assert_eq!(best.name, "alpha");
        }
        assert!(cheapest(&[]).is_none());
    }

    #[test]
    fn rows_mirror_summaries() {
        let results = comparator(false).compare(&catalog()).unwrap();
        let rows = comparison_rows(&results);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].policy, "zeta");
        assert_eq!(rows[0].order_up_to, 12);
        assert_eq!(rows[0].review_interval, 6);
        assert_eq!(rows[0].mean_total_cost, results[0].summary.total_cost.mean);
    }

    #[test]
    fn invalid_entry_fails_the_comparison() {
        let bad = PolicyCatalog::new(vec![
            NamedPolicy::new("ok", PolicyParameters::new(5, 11)),
            NamedPolicy::new("broken", PolicyParameters::new(0, 11)),
        ]);
        let err = comparator(false).compare(&bad).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration(_)));
    }

    #[test]
    fn catalog_lookup_and_edit() {
        let catalog = catalog().map_parameters(|p| p.horizon_days = 7);
        assert_eq!(catalog.names(), vec!["zeta", "alpha", "alpha again"]);
        assert_eq!(catalog.get("alpha").unwrap().parameters.horizon_days, 7);
        assert!(catalog.get("missing").is_none());
    }
}
