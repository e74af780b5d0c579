//! Bid value type.

use crate::{AgentId, Price, Result, TaskName, Tick, ValueError};
use std::fmt;

/// A priced claim by one agent on one task at one point in simulated time.
///
/// Bids are immutable. Raising a price means issuing a new bid; the old one
/// is superseded, never edited. A price of zero is the cannot-serve sentinel:
/// the bidder had less residual capacity than the task demands when the bid
/// was placed. That is distinct from "no bid exists".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bid {
    agent: AgentId,
    task: TaskName,
    price: Price,
    placed_at: Tick,
}

impl Bid {
    /// Create a bid. Fails if `price` is negative.
    pub fn new(
        agent: AgentId,
        task: impl Into<TaskName>,
        price: Price,
        placed_at: Tick,
    ) -> Result<Self> {
        let task = task.into();
        if price.raw() < 0 {
            return Err(ValueError::NegativePrice(task, price));
        }
        Ok(Self {
            agent,
            task,
            price,
            placed_at,
        })
    }

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn task(&self) -> &TaskName {
        &self.task
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn placed_at(&self) -> Tick {
        self.placed_at
    }

    /// Whether this bid commits capacity (non-sentinel price).
    pub fn is_serving(&self) -> bool {
        self.price.is_positive()
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} by {} (t={})",
            self.task, self.price, self.agent, self.placed_at
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_construction() {
        let bid = Bid::new(AgentId(1), "task_1", Price::from_float(9.0), 0).unwrap();
        assert_eq!(bid.agent(), AgentId(1));
        assert_eq!(bid.task(), "task_1");
        assert_eq!(bid.price(), Price::from_float(9.0));
        assert_eq!(bid.placed_at(), 0);
        assert!(bid.is_serving());
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = Bid::new(AgentId(1), "task_1", Price(-1), 0).unwrap_err();
        assert!(matches!(err, ValueError::NegativePrice(_, _)));
    }

    #[test]
    fn test_zero_price_is_sentinel_not_error() {
        let bid = Bid::new(AgentId(1), "task_1", Price::ZERO, 3).unwrap();
        assert!(!bid.is_serving());
    }
}
