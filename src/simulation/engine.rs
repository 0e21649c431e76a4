// src/simulation/engine.rs

use crate::error::{SimError, SimResult};
use crate::model::distribution::Sampler;
use crate::model::inventory::{InventoryState, ShortageMode};
use crate::model::orders::OpenOrder;
use crate::simulation::config::PolicyParameters;
use crate::strategy::review::PeriodicReview;
use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// ChaCha stream numbers used inside one replication seed.
pub const DEMAND_STREAM: u64 = 0;
pub const LEAD_TIME_STREAM: u64 = 1;

/// Relative tolerance for the end-of-run cost reconciliation.
const COST_TOLERANCE: f64 = 1e-9;

/// One simulated day, as seen after all of that day's events.
///
/// Serialize so it can be written straight to CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub day: u32,
    pub cycle: u32,
    pub on_hand_start: u32,
    pub received: u32,
    pub demand: u32,
    pub sales: u32,
    pub units_short: u32,
    pub on_hand_end: u32,
    pub backlog: u32,
    pub on_order: u64,
    pub position: i64,
    pub order_placed: bool,
    pub order_quantity: u32,
    pub lead_time: Option<u32>,
    pub holding_cost: f64,
    pub shortage_cost: f64,
    pub ordering_cost: f64,
    pub purchasing_cost: f64,
    pub total_cost: f64,
}

/// The full day-by-day history of one replication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationResult {
    pub days: Vec<DayRecord>,
    pub total_cost: f64,
}

impl ReplicationResult {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn total_demand(&self) -> u64 {
        self.days.iter().map(|d| d.demand as u64).sum()
    }

    pub fn total_short(&self) -> u64 {
        self.days.iter().map(|d| d.units_short as u64).sum()
    }

    pub fn holding_cost(&self) -> f64 {
        self.days.iter().map(|d| d.holding_cost).sum()
    }

    pub fn shortage_cost(&self) -> f64 {
        self.days.iter().map(|d| d.shortage_cost).sum()
    }

    pub fn ordering_cost(&self) -> f64 {
        self.days.iter().map(|d| d.ordering_cost).sum()
    }

    pub fn purchasing_cost(&self) -> f64 {
        self.days.iter().map(|d| d.purchasing_cost).sum()
    }

    pub fn orders_placed(&self) -> usize {
        self.days.iter().filter(|d| d.order_placed).count()
    }

    pub fn stockout_days(&self) -> usize {
        self.days.iter().filter(|d| d.units_short > 0).count()
    }

    pub fn ending_on_hand(&self) -> u32 {
        self.days.last().map(|d| d.on_hand_end).unwrap_or(0)
    }

    /// Fraction of demand served from stock on the day it occurred.
    pub fn service_level(&self) -> f64 {
        fill_rate(self.total_short(), self.total_demand())
    }
}

pub(crate) fn fill_rate(short: u64, demand: u64) -> f64 {
    if demand == 0 {
        1.0
    } else {
        1.0 - short as f64 / demand as f64
    }
}

/// The two independent random streams a replication draws from.
///
/// Demand and lead time use separate streams so the demand path does not shift when a
/// different policy places a different number of orders.
#[derive(Debug, Clone)]
pub struct ReplicationStreams {
    pub demand: ChaCha8Rng,
    pub lead_time: ChaCha8Rng,
}

impl ReplicationStreams {
    pub fn from_seed(seed: u64) -> Self {
        let mut demand = ChaCha8Rng::seed_from_u64(seed);
        demand.set_stream(DEMAND_STREAM);
        let mut lead_time = ChaCha8Rng::seed_from_u64(seed);
        lead_time.set_stream(LEAD_TIME_STREAM);
        Self { demand, lead_time }
    }
}

/// Advances one horizon day by day under an (M, N) policy.
pub struct ReplicationSimulator<'a> {
    params: &'a PolicyParameters,
    policy: PeriodicReview,
    demand: Sampler,
    lead_time: Sampler,
}

impl<'a> ReplicationSimulator<'a> {
    pub fn new(params: &'a PolicyParameters) -> SimResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            policy: params.policy(),
            demand: params.demand_sampler()?,
            lead_time: params.lead_time_sampler()?,
        })
    }

    /// Runs one replication on freshly seeded streams.
    pub fn run(&self, seed: u64) -> SimResult<ReplicationResult> {
        let mut streams = ReplicationStreams::from_seed(seed);
        self.run_with(&mut streams.demand, &mut streams.lead_time)
    }

    /// Runs one replication on caller-supplied streams.
    pub fn run_with<D, L>(&self, demand_rng: &mut D, lead_rng: &mut L) -> SimResult<ReplicationResult>
    where
        D: Rng + ?Sized,
        L: Rng + ?Sized,
    {
        let mut inventory =
            InventoryState::new(self.params.initial_inventory, self.params.initial_order);
        let mut days = Vec::with_capacity(self.params.horizon_days as usize);
        let mut cumulative_cost = 0.0;

        for day in 1..=self.params.horizon_days {
            let record = self.step(day, &mut inventory, demand_rng, lead_rng)?;
            cumulative_cost += record.total_cost;
            days.push(record);
        }

        let summed: f64 = days.iter().map(|d| d.total_cost).sum();
        if (summed - cumulative_cost).abs() > COST_TOLERANCE * cumulative_cost.abs().max(1.0) {
            return Err(SimError::inconsistency(
                self.params.horizon_days,
                format!(
                    "daily costs sum to {} but {} was accumulated",
                    summed, cumulative_cost
                ),
            ));
        }

        Ok(ReplicationResult {
            days,
            total_cost: cumulative_cost,
        })
    }

    fn step<D, L>(
        &self,
        day: u32,
        inventory: &mut InventoryState,
        demand_rng: &mut D,
        lead_rng: &mut L,
    ) -> SimResult<DayRecord>
    where
        D: Rng + ?Sized,
        L: Rng + ?Sized,
    {
        let mode = self.params.shortage_mode;
        let costs = &self.params.costs;
        let on_hand_start = inventory.on_hand;
        let position_start = inventory.position();

        // =================================================================
        // PHASE 1: Arrivals
        // =================================================================
        let received = inventory.receive_shipments(day)?;
        if received > 0 {
            trace!("day {}: received {} units", day, received);
        }

        // =================================================================
        // PHASE 2: Demand
        // =================================================================
        let demand = self.demand.sample(demand_rng);
        let outcome = inventory.process_demand(demand, mode);

        // =================================================================
        // PHASE 3: Review
        // Lead time is drawn on every review day so the stream stays aligned
        // between policies that order at different times.
        // =================================================================
        let mut order_quantity = 0;
        let mut lead_time = None;
        let mut cleared = 0;
        if self.policy.is_review_day(day) {
            let drawn = self.lead_time.sample(lead_rng);
            let position = inventory.position();
            if let Some(quantity) =
                self.policy
                    .order_quantity(day, position, inventory.pipeline.len())
            {
                debug!(
                    "day {}: position {} below M={}, ordering {} (lead time {})",
                    day,
                    position,
                    self.policy.order_up_to(),
                    quantity,
                    drawn
                );
                order_quantity = quantity;
                lead_time = Some(drawn);
                if drawn == 0 {
                    cleared = inventory.receive_immediately(day, quantity)?;
                } else {
                    inventory.place_order(
                        day,
                        OpenOrder {
                            quantity,
                            arrival_day: day.saturating_add(drawn),
                        },
                    )?;
                }
            }
        }

        // =================================================================
        // PHASE 4: Costs
        // =================================================================
        let order_placed = lead_time.is_some();
        let short_units = match mode {
            ShortageMode::LostSales => outcome.units_short,
            ShortageMode::Backorder => inventory.backlog,
        };
        let holding_cost = costs.holding * inventory.on_hand as f64;
        let shortage_cost = costs.shortage * short_units as f64;
        let ordering_cost = if order_placed { costs.ordering } else { 0.0 };
        let purchasing_cost = costs.unit * order_quantity as f64;
        let total_cost = holding_cost + shortage_cost + ordering_cost + purchasing_cost;

        // =================================================================
        // PHASE 5: Invariants & record
        // =================================================================
        for (name, value) in [
            ("holding", holding_cost),
            ("shortage", shortage_cost),
            ("ordering", ordering_cost),
            ("purchasing", purchasing_cost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::inconsistency(
                    day,
                    format!("{} cost is {}", name, value),
                ));
            }
        }

        if outcome.units_short > demand {
            return Err(SimError::inconsistency(
                day,
                format!("{} units short against demand {}", outcome.units_short, demand),
            ));
        }

        let depletion = match mode {
            ShortageMode::LostSales => outcome.sales as i64,
            ShortageMode::Backorder => demand as i64,
        };
        let position_end = inventory.position();
        if position_end != position_start - depletion + order_quantity as i64 {
            return Err(SimError::inconsistency(
                day,
                format!(
                    "inventory position moved from {} to {} with depletion {} and order {}",
                    position_start, position_end, depletion, order_quantity
                ),
            ));
        }

        Ok(DayRecord {
            day,
            cycle: self.policy.cycle_of(day),
            on_hand_start,
            received,
            demand,
            sales: outcome.sales + cleared,
            units_short: outcome.units_short,
            on_hand_end: inventory.on_hand,
            backlog: inventory.backlog,
            on_order: inventory.pipeline.outstanding(),
            position: position_end,
            order_placed,
            order_quantity,
            lead_time,
            holding_cost,
            shortage_cost,
            ordering_cost,
            purchasing_cost,
            total_cost,
        })
    }
}
