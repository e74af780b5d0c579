//! Simulation crate: the allocation driver.
//!
//! Owns the global discrete clock, the agents, the gossip network, and the
//! task-arrival schedule. The auction protocol itself lives in the `auction`
//! crate and only reacts to being ticked; everything here is glue around it.
//!
//! # Architecture
//!
//! The simulation runs in discrete ticks:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Simulation.step()              │
//! │                                             │
//! │  1. Deliver arrivals due at the current tick│
//! │  2. Touched agents price their catalogs     │
//! │  3. Gossip rounds (configurable per tick):  │
//! │       every agent broadcasts, then every    │
//! │       agent drains its mailbox + reconciles │
//! │  4. Advance tick counter                    │
//! │                                             │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The protocol has no innate stopping condition, so termination is imposed
//! here: a run lasts a configured number of ticks, with an optional early-out
//! once a whole tick passes with no belief changes and no pending arrivals.
//!
//! # Example
//!
//! ```ignore
//! use simulation::{Arrival, Simulation, SimulationConfig};
//! use types::{AgentId, Capacity, Price, Task};
//!
//! let mut sim = Simulation::new(SimulationConfig::new().with_duration(10));
//! sim.add_agent(AgentId(1), Capacity(100), Price::from_float(1.0))?;
//! sim.add_agent(AgentId(2), Capacity(100), Price::from_float(2.0))?;
//! sim.link(AgentId(1), AgentId(2))?;
//! sim.schedule_arrival(Arrival {
//!     at: 0,
//!     task: Task::new("task_1", Capacity(10))?,
//!     destinations: vec![AgentId(1), AgentId(2)],
//! })?;
//! sim.run()?;
//! ```

pub mod config;
mod error;
mod runner;
mod schedule;

pub use config::SimulationConfig;
pub use error::{Result, SimulationError};
pub use runner::{Simulation, SimulationStats};
pub use schedule::{Arrival, Schedule};
