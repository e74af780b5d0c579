//! Shared value types for the auction workspace.
//!
//! Identifier newtypes, fixed-point prices and capacity units, and the
//! Task/Bid records the protocol exchanges. Everything here is an immutable
//! value: construction validates domain constraints, and there is no behavior
//! beyond field access.

mod bid;
mod error;
mod ids;
mod task;
mod units;

pub use bid::Bid;
pub use error::{Result, ValueError};
pub use ids::{AgentId, TaskName, Tick};
pub use task::Task;
pub use units::{Capacity, Price, PRICE_SCALE};
