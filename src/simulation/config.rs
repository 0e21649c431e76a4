// src/simulation/config.rs

use crate::error::{SimError, SimResult};
use crate::model::distribution::{DistributionSpec, Sampler};
use crate::model::inventory::ShortageMode;
use crate::model::orders::OpenOrder;
use crate::strategy::review::PeriodicReview;
use serde::{Deserialize, Serialize};

/// Unit costs of running the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParameters {
    /// Per unit of ending on-hand stock per day.
    pub holding: f64,
    /// Per unit short per day.
    pub shortage: f64,
    /// Fixed charge per order placed.
    pub ordering: f64,
    /// Purchasing cost per unit ordered.
    pub unit: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            holding: 20.0,
            shortage: 10.0,
            ordering: 10.0,
            unit: 50.0,
        }
    }
}

/// Cost rates given on the command line, each replacing the scenario's own rate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostOverrides {
    pub holding: Option<f64>,
    pub shortage: Option<f64>,
    pub ordering: Option<f64>,
    pub unit: Option<f64>,
}

impl CostOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, costs: &mut CostParameters) {
        if let Some(holding) = self.holding {
            costs.holding = holding;
        }
        if let Some(shortage) = self.shortage {
            costs.shortage = shortage;
        }
        if let Some(ordering) = self.ordering {
            costs.ordering = ordering;
        }
        if let Some(unit) = self.unit {
            costs.unit = unit;
        }
    }
}

impl CostParameters {
    fn validate(&self) -> SimResult<()> {
        let fields = [
            ("holding", self.holding),
            ("shortage", self.shortage),
            ("ordering", self.ordering),
            ("unit", self.unit),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::config(format!(
                    "{} cost must be finite and >= 0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// One complete scenario: an (M, N) policy plus the world it runs in.
///
/// The simulator only ever borrows this, so a value is effectively frozen once built.
/// Every field has a default, which lets scenario files list just the differences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyParameters {
    /// N: days between reviews.
    pub review_interval: u32,
    /// M: the order-up-to level.
    pub order_up_to: u32,
    pub demand: DistributionSpec,
    pub lead_time: DistributionSpec,
    pub costs: CostParameters,
    pub horizon_days: u32,
    pub initial_inventory: u32,
    /// An order already on its way on day 1.
    pub initial_order: Option<OpenOrder>,
    pub shortage_mode: ShortageMode,
    pub allow_zero_lead_time: bool,
    pub single_outstanding_order: bool,
}

pub const DEFAULT_CYCLES: u32 = 10;
pub const DEFAULT_REVIEW_INTERVAL: u32 = 5;

impl Default for PolicyParameters {
    fn default() -> Self {
        Self {
            review_interval: DEFAULT_REVIEW_INTERVAL,
            order_up_to: 11,
            demand: DistributionSpec::Discrete {
                values: vec![0.0, 1.0, 2.0, 3.0, 4.0],
                probabilities: vec![0.10, 0.25, 0.35, 0.21, 0.09],
            },
            lead_time: DistributionSpec::Discrete {
                values: vec![1.0, 2.0, 3.0],
                probabilities: vec![0.60, 0.30, 0.10],
            },
            costs: CostParameters::default(),
            horizon_days: DEFAULT_REVIEW_INTERVAL * DEFAULT_CYCLES,
            initial_inventory: 3,
            initial_order: Some(OpenOrder {
                quantity: 8,
                arrival_day: 3,
            }),
            shortage_mode: ShortageMode::LostSales,
            allow_zero_lead_time: false,
            single_outstanding_order: false,
        }
    }
}

impl PolicyParameters {
    /// Default scenario with the given N and M.
    pub fn new(review_interval: u32, order_up_to: u32) -> Self {
        Self {
            review_interval,
            order_up_to,
            ..Self::default()
        }
    }

    /// Sets the horizon to a whole number of review cycles.
    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.horizon_days = self.review_interval.saturating_mul(cycles);
        self
    }

    /// Number of review cycles in the horizon (may be fractional).
    pub fn cycles(&self) -> f64 {
        if self.review_interval == 0 {
            return 0.0;
        }
        self.horizon_days as f64 / self.review_interval as f64
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.review_interval < 1 {
            return Err(SimError::config("review interval N must be >= 1"));
        }
        if self.horizon_days < 1 {
            return Err(SimError::config("horizon must be at least one day"));
        }
        self.costs.validate()?;
        if let Some(order) = &self.initial_order {
            if order.quantity == 0 {
                return Err(SimError::config("initial open order must have quantity > 0"));
            }
            if order.arrival_day < 1 {
                return Err(SimError::config("initial open order must arrive on day 1 or later"));
            }
            if self.initial_inventory.checked_add(order.quantity).is_none() {
                return Err(SimError::config(format!(
                    "initial stock {} plus open order {} exceeds {} units",
                    self.initial_inventory,
                    order.quantity,
                    u32::MAX
                )));
            }
        }
        self.demand.validate()?;
        self.lead_time.validate()?;
        Ok(())
    }

    pub fn policy(&self) -> PeriodicReview {
        PeriodicReview::new(self.review_interval, self.order_up_to)
            .with_single_outstanding_order(self.single_outstanding_order)
    }

    pub fn demand_sampler(&self) -> SimResult<Sampler> {
        Sampler::demand(&self.demand)
    }

    pub fn lead_time_sampler(&self) -> SimResult<Sampler> {
        Sampler::lead_time(&self.lead_time, self.allow_zero_lead_time)
    }
}

/// How many replications to run and where their randomness comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub replications: u32,
    pub master_seed: u64,
    /// Spread replications over the rayon thread pool.
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            replications: 500,
            master_seed: 0,
            parallel: true,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.replications < 1 {
            return Err(SimError::config("replication count must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scenario_is_valid() {
        let params = PolicyParameters::default();
        params.validate().unwrap();
        assert_eq!(params.horizon_days, 50);
        assert_eq!(params.cycles(), 10.0);
    }

    #[test]
    fn cycles_scale_with_review_interval() {
        let params = PolicyParameters::new(6, 12).with_cycles(10);
        assert_eq!(params.horizon_days, 60);
        assert_eq!(params.cycles(), 10.0);
    }

    #[test]
    fn rejects_zero_review_interval_and_horizon() {
        let err = PolicyParameters::new(0, 10).validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration(_)));

        let params = PolicyParameters {
            horizon_days: 0,
            ..PolicyParameters::default()
        };
        assert!(matches!(
            params.validate().unwrap_err(),
            SimError::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn rejects_negative_costs() {
        let mut params = PolicyParameters::default();
        params.costs.holding = -1.0;
        assert!(matches!(
            params.validate().unwrap_err(),
            SimError::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn bad_distribution_surfaces_as_distribution_error() {
        let params = PolicyParameters {
            demand: DistributionSpec::Normal {
                mean: 10.0,
                std_dev: -2.0,
            },
            ..PolicyParameters::default()
        };
        assert!(matches!(
            params.validate().unwrap_err(),
            SimError::InvalidDistribution(_)
        ));
    }

    #[test]
    fn initial_stock_must_fit_with_its_open_order() {
        let params = PolicyParameters {
            initial_inventory: u32::MAX,
            initial_order: Some(OpenOrder {
                quantity: 1,
                arrival_day: 1,
            }),
            ..PolicyParameters::default()
        };
        assert!(matches!(
            params.validate().unwrap_err(),
            SimError::InvalidConfiguration(_)
        ));

        let params = PolicyParameters {
            initial_inventory: u32::MAX - 8,
            ..PolicyParameters::default()
        };
        params.validate().unwrap();
    }

    #[test]
    fn cost_overrides_replace_only_given_rates() {
        let mut costs = CostParameters::default();
        let overrides = CostOverrides {
            shortage: Some(40.0),
            unit: Some(0.0),
            ..CostOverrides::default()
        };
        assert!(!overrides.is_empty());
        overrides.apply(&mut costs);
        assert_eq!(
            costs,
            CostParameters {
                holding: 20.0,
                shortage: 40.0,
                ordering: 10.0,
                unit: 0.0,
            }
        );
        assert!(CostOverrides::default().is_empty());
    }

    #[test]
    fn negative_cost_override_fails_validation() {
        let mut params = PolicyParameters::default();
        CostOverrides {
            ordering: Some(-5.0),
            ..CostOverrides::default()
        }
        .apply(&mut params.costs);
        assert!(matches!(
            params.validate().unwrap_err(),
            SimError::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn zero_replications_is_rejected() {
        let config = SimulationConfig {
            replications: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let params: PolicyParameters =
            serde_json::from_str(r#"{"review_interval": 6, "order_up_to": 12}"#).unwrap();
        assert_eq!(params.review_interval, 6);
        assert_eq!(params.order_up_to, 12);
        assert_eq!(params.costs, CostParameters::default());
        assert_eq!(params.shortage_mode, ShortageMode::LostSales);
    }
}
