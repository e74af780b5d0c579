//! Error types for auction operations.

use std::fmt;
use types::{AgentId, TaskName, ValueError};

/// Result type for auction operations.
pub type Result<T> = std::result::Result<T, AuctionError>;

/// Errors that can occur while wiring or running an auction.
///
/// All of these indicate a configuration or programming defect, not a
/// transient condition; callers are expected to fail setup rather than retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuctionError {
    /// The task name already exists in the agent's catalog.
    DuplicateTask(TaskName),
    /// The agent id is not registered with the network directory.
    UnknownAgent(AgentId),
    /// The agent id is already registered with the network directory.
    DuplicateAgent(AgentId),
    /// A value failed its construction-time validation.
    Value(ValueError),
}

impl fmt::Display for AuctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuctionError::DuplicateTask(name) => {
                write!(f, "task {} is already in the catalog", name)
            }
            AuctionError::UnknownAgent(id) => write!(f, "unknown agent: {}", id),
            AuctionError::DuplicateAgent(id) => write!(f, "agent {} is already registered", id),
            AuctionError::Value(err) => write!(f, "invalid value: {}", err),
        }
    }
}

impl std::error::Error for AuctionError {}

impl From<ValueError> for AuctionError {
    fn from(err: ValueError) -> Self {
        AuctionError::Value(err)
    }
}
