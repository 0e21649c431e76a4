// src/model/inventory.rs

use crate::error::{SimError, SimResult};
use crate::model::orders::{OpenOrder, OpenOrders};
use serde::{Deserialize, Serialize};

/// What happens to demand that cannot be served from stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortageMode {
    /// Unmet demand is gone for good.
    #[default]
    LostSales,
    /// Unmet demand waits in a backlog and is served first once stock arrives.
    Backorder,
}

/// Result of serving one day's demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemandOutcome {
    /// Units shipped today, including backlog that was cleared.
    pub sales: u32,
    /// Units of today's demand that could not be served from stock today.
    pub units_short: u32,
}

/// Stock state of the single item at the single location.
#[derive(Debug, Clone)]
pub struct InventoryState {
    pub on_hand: u32,
    pub backlog: u32,
    pub pipeline: OpenOrders,
}

impl InventoryState {
    pub fn new(initial_on_hand: u32, initial_order: Option<OpenOrder>) -> Self {
        let mut pipeline = OpenOrders::new();
        if let Some(order) = initial_order {
            pipeline.push(order);
        }
        Self {
            on_hand: initial_on_hand,
            backlog: 0,
            pipeline,
        }
    }

    /// Step 1: Receive every open order due today.
    pub fn receive_shipments(&mut self, day: u32) -> SimResult<u32> {
        let received = self.pipeline.pop_arrivals(day);
        let received = u32::try_from(received)
            .map_err(|_| SimError::inconsistency(day, format!("{} units arrived at once", received)))?;
        self.on_hand = self.add_to_stock(day, received)?;
        Ok(received)
    }

    /// Step 2: Serve today's demand from on-hand stock.
    pub fn process_demand(&mut self, demand: u32, mode: ShortageMode) -> DemandOutcome {
        match mode {
            ShortageMode::LostSales => {
                let sales = demand.min(self.on_hand);
                self.on_hand -= sales;
                DemandOutcome {
                    sales,
                    units_short: demand - sales,
                }
            }
            ShortageMode::Backorder => {
                // Old backlog is first in line
                let served_today = demand.min(self.on_hand.saturating_sub(self.backlog));
                let obligation = self.backlog.saturating_add(demand);
                let sales = obligation.min(self.on_hand);
                self.on_hand -= sales;
                self.backlog = obligation - sales;
                DemandOutcome {
                    sales,
                    units_short: demand - served_today,
                }
            }
        }
    }

    /// Step 3: Put a new order into the pipeline.
    ///
    /// On-hand plus everything on order must stay countable in a `u32`, so every
    /// later arrival can be booked.
    pub fn place_order(&mut self, day: u32, order: OpenOrder) -> SimResult<()> {
        let committed = self.on_hand as u64 + self.pipeline.outstanding() + order.quantity as u64;
        if committed > u32::MAX as u64 {
            return Err(SimError::inconsistency(
                day,
                format!(
                    "order of {} would put {} units on hand and on order",
                    order.quantity, committed
                ),
            ));
        }
        self.pipeline.push(order);
        Ok(())
    }

    /// Books a same-day delivery straight into stock, clearing backlog first.
    /// Returns the backlog units shipped out of it.
    pub fn receive_immediately(&mut self, day: u32, quantity: u32) -> SimResult<u32> {
        self.on_hand = self.add_to_stock(day, quantity)?;
        let cleared = self.backlog.min(self.on_hand);
        self.on_hand -= cleared;
        self.backlog -= cleared;
        Ok(cleared)
    }

    fn add_to_stock(&self, day: u32, units: u32) -> SimResult<u32> {
        self.on_hand.checked_add(units).ok_or_else(|| {
            SimError::inconsistency(
                day,
                format!("receiving {} units overflows {} on hand", units, self.on_hand),
            )
        })
    }

    /// On-hand plus everything on order, minus what is owed to customers.
    pub fn position(&self) -> i64 {
        self.on_hand as i64 + self.pipeline.outstanding() as i64 - self.backlog as i64
    }
}
