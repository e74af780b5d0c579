//! Core identifier types for the auction system.

use derive_more::{From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an agent.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
    From,
    Into,
)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Agent#{}", self.0)
    }
}

/// Task identity. Names are unique within one agent's catalog; scenarios keep
/// them globally unique by convention so winning lists read unambiguously.
pub type TaskName = String;

/// Simulation tick (discrete time step).
pub type Tick = u64;
