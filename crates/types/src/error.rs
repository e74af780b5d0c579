//! Validation errors for value construction.

use crate::{Price, TaskName};
use std::fmt;

/// Result type for value construction.
pub type Result<T> = std::result::Result<T, ValueError>;

/// A value would be constructed outside its domain.
///
/// These are configuration defects: the value is never created, and callers
/// are expected to fail setup rather than recover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Task demand must be strictly positive.
    ZeroDemand(TaskName),
    /// Bid prices are never negative.
    NegativePrice(TaskName, Price),
    /// Agent capacity must be strictly positive.
    ZeroCapacity,
    /// Agent unit cost must be strictly positive.
    NonPositiveUnitCost(Price),
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::ZeroDemand(task) => {
                write!(f, "task {} must demand a positive amount of capacity", task)
            }
            ValueError::NegativePrice(task, price) => {
                write!(f, "negative price {} for task {}", price, task)
            }
            ValueError::ZeroCapacity => write!(f, "agent capacity must be positive"),
            ValueError::NonPositiveUnitCost(cost) => {
                write!(f, "agent unit cost must be positive, got {}", cost)
            }
        }
    }
}

impl std::error::Error for ValueError {}
