// src/model/orders.rs

use serde::{Deserialize, Serialize};

/// A replenishment order that has been placed but not yet received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub quantity: u32,
    pub arrival_day: u32,
}

/// The pipeline of open orders.
///
/// Unlike a fixed-delay pipe, every order carries its own arrival day, so orders with
/// different lead times can overtake each other and several can be open at once.
#[derive(Debug, Clone, Default)]
pub struct OpenOrders {
    orders: Vec<OpenOrder>,
}

impl OpenOrders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step 1: Goods arrive at the start of `day`.
    /// Removes every order due on or before `day` and returns the units received.
    pub fn pop_arrivals(&mut self, day: u32) -> u64 {
        let mut received = 0;
        self.orders.retain(|order| {
            if order.arrival_day <= day {
                received += order.quantity as u64;
                false
            } else {
                true
            }
        });
        received
    }

    /// Step 3: A new order enters the pipeline.
    pub fn push(&mut self, order: OpenOrder) {
        self.orders.push(order);
    }

    /// Units ordered but not yet received.
    pub fn outstanding(&self) -> u64 {
        self.orders.iter().map(|o| o.quantity as u64).sum()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
