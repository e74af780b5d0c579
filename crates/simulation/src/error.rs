//! Error types for simulation setup and stepping.

use auction::AuctionError;
use std::fmt;
use types::{AgentId, Tick};

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors raised while wiring or running a simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// A link or arrival references an agent the simulation does not know.
    UnknownAgent(AgentId),
    /// An arrival is scheduled at or after the end of the run.
    ArrivalAfterEnd { at: Tick, duration: Tick },
    /// An auction-level error surfaced while wiring or stepping.
    Auction(AuctionError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::UnknownAgent(id) => write!(f, "unknown agent: {}", id),
            SimulationError::ArrivalAfterEnd { at, duration } => write!(
                f,
                "arrival at tick {} never happens in a {}-tick run",
                at, duration
            ),
            SimulationError::Auction(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<AuctionError> for SimulationError {
    fn from(err: AuctionError) -> Self {
        SimulationError::Auction(err)
    }
}
