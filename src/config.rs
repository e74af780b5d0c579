//! Scenario configuration: the YAML file that describes one run.
//!
//! A scenario names the agents with their capacities and unit costs, the
//! gossip links between them, and the task-arrival timeline. Everything the
//! core needs is wired from here before the first tick.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use auction::TieBreak;
use serde::{Deserialize, Serialize};
use simulation::{Arrival, Simulation, SimulationConfig};
use types::{AgentId, Capacity, Price, Task, TaskName, Tick};

/// One agent's setup parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Agent identifier, unique within the scenario.
    pub id: u64,
    /// Total capacity this agent owns.
    pub capacity: u64,
    /// Cost per capacity unit, the agent's pricing constant.
    pub unit_cost: f64,
}

/// A task as it appears in a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Task name, globally unique by convention.
    pub name: TaskName,
    /// Capacity the task demands.
    pub demand: u64,
}

/// One scheduled task arrival.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrivalSpec {
    /// Tick at which the task lands.
    #[serde(default)]
    pub at: Tick,
    /// The task being offered.
    pub task: TaskSpec,
    /// Agents whose catalogs receive the task.
    pub to: Vec<u64>,
}

/// A complete simulation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    // ─────────────────────────────────────────────────────────────────────────
    // Run control
    // ─────────────────────────────────────────────────────────────────────────
    /// Ticks to simulate.
    #[serde(default = "default_duration")]
    pub duration: Tick,
    /// Master seed; per-agent generators derive from it.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Gossip rounds per tick.
    #[serde(default = "default_rounds_per_tick")]
    pub rounds_per_tick: u32,
    /// Stop before `duration` once beliefs settle.
    #[serde(default)]
    pub stop_on_convergence: bool,
    /// Tie-break policy for all agents.
    #[serde(default)]
    pub tie_break: TieBreak,

    // ─────────────────────────────────────────────────────────────────────────
    // Topology and workload
    // ─────────────────────────────────────────────────────────────────────────
    /// The agents.
    pub agents: Vec<AgentSpec>,
    /// Symmetric gossip links, as id pairs.
    #[serde(default)]
    pub links: Vec<(u64, u64)>,
    /// Task-arrival timeline.
    #[serde(default)]
    pub arrivals: Vec<ArrivalSpec>,
}

fn default_duration() -> Tick {
    20
}

fn default_seed() -> u64 {
    42
}

fn default_rounds_per_tick() -> u32 {
    1
}

impl ScenarioConfig {
    /// Load a scenario from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scenario file {}", path.display()))?;
        let scenario: ScenarioConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing scenario file {}", path.display()))?;
        Ok(scenario)
    }

    /// The built-in demo: two linked agents contesting one task.
    ///
    /// The cheaper agent prices task_1 at 9.0, the pricier one at 18.0, so
    /// both settle on agent 2 after a couple of gossip rounds.
    pub fn demo() -> Self {
        Self {
            duration: 20,
            seed: default_seed(),
            rounds_per_tick: 1,
            stop_on_convergence: true,
            tie_break: TieBreak::CoinFlip,
            agents: vec![
                AgentSpec {
                    id: 1,
                    capacity: 100,
                    unit_cost: 1.0,
                },
                AgentSpec {
                    id: 2,
                    capacity: 100,
                    unit_cost: 2.0,
                },
            ],
            links: vec![(1, 2)],
            arrivals: vec![ArrivalSpec {
                at: 0,
                task: TaskSpec {
                    name: "task_1".to_string(),
                    demand: 10,
                },
                to: vec![1, 2],
            }],
        }
    }

    /// Build a fully wired simulation from this scenario.
    ///
    /// Any inconsistency (duplicate agent id, unknown id in a link or arrival,
    /// non-positive capacity or unit cost, arrival past the end of the run)
    /// fails here, before the first tick.
    pub fn build(&self) -> Result<Simulation> {
        anyhow::ensure!(!self.agents.is_empty(), "scenario defines no agents");
        anyhow::ensure!(
            self.rounds_per_tick >= 1,
            "rounds_per_tick must be at least 1; beliefs travel one hop per round"
        );
        let config = SimulationConfig::new()
            .with_duration(self.duration)
            .with_seed(self.seed)
            .with_rounds_per_tick(self.rounds_per_tick)
            .with_stop_on_convergence(self.stop_on_convergence)
            .with_tie_break(self.tie_break);
        let mut sim = Simulation::new(config);

        for spec in &self.agents {
            sim.add_agent(
                AgentId(spec.id),
                Capacity(spec.capacity),
                Price::from_float(spec.unit_cost),
            )
            .with_context(|| format!("adding agent {}", spec.id))?;
        }
        for (a, b) in &self.links {
            sim.link(AgentId(*a), AgentId(*b))
                .with_context(|| format!("linking agents {} and {}", a, b))?;
        }
        for spec in &self.arrivals {
            let task = Task::new(spec.task.name.clone(), Capacity(spec.task.demand))
                .with_context(|| format!("task {}", spec.task.name))?;
            sim.schedule_arrival(Arrival {
                at: spec.at,
                task,
                destinations: spec.to.iter().map(|&id| AgentId(id)).collect(),
            })
            .with_context(|| format!("scheduling arrival of {}", spec.task.name))?;
        }
        Ok(sim)
    }
}
