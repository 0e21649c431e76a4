// src/strategy/review.rs

/// The (M, N) rule: every `N` days, top the inventory position back up to `M`.
///
/// It looks at the inventory position (on-hand + on order - backlog), never at
/// on-hand alone, so stock already in transit is not ordered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicReview {
    review_interval: u32,
    order_up_to: u32,
    single_outstanding_order: bool,
}

impl PeriodicReview {
    pub fn new(review_interval: u32, order_up_to: u32) -> Self {
        Self {
            review_interval,
            order_up_to,
            single_outstanding_order: false,
        }
    }

    /// Skip a review entirely while an earlier order is still on its way.
    pub fn with_single_outstanding_order(mut self, enabled: bool) -> Self {
        self.single_outstanding_order = enabled;
        self
    }

    pub fn order_up_to(&self) -> u32 {
        self.order_up_to
    }

    /// Days are numbered from 1, so the first review falls on day `N`.
    pub fn is_review_day(&self, day: u32) -> bool {
        self.review_interval != 0 && day % self.review_interval == 0
    }

    /// 1-based review cycle that `day` belongs to.
    pub fn cycle_of(&self, day: u32) -> u32 {
        match self.review_interval {
            0 => 1,
            n => (day.saturating_sub(1)) / n + 1,
        }
    }

    /// How much to order on `day`, if anything.
    pub fn order_quantity(&self, day: u32, position: i64, open_orders: usize) -> Option<u32> {
        if !self.is_review_day(day) {
            return None;
        }
        if self.single_outstanding_order && open_orders > 0 {
            return None;
        }

        let gap = self.order_up_to as i64 - position;
        if gap <= 0 {
            None
        } else {
            Some(u32::try_from(gap).unwrap_or(u32::MAX))
        }
    }
}
