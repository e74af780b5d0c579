//! Simulation configuration options.

use auction::TieBreak;
use types::Tick;

/// Configuration for one simulation run.
///
/// The protocol itself has no stopping condition, so both the duration and
/// the convergence early-out are explicit knobs here rather than something
/// inferred from agent behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of ticks to simulate.
    pub duration: Tick,

    /// Master seed. Each agent's generator is derived from it, so one seed
    /// reproduces an entire run.
    pub seed: u64,

    /// Gossip rounds run every tick. Must be at least 1 for beliefs to
    /// travel; information moves one hop per round.
    pub rounds_per_tick: u32,

    /// Stop before `duration` once a whole tick passes with no belief
    /// changes and no arrivals left to deliver.
    pub stop_on_convergence: bool,

    /// Tie-break policy installed on every agent.
    pub tie_break: TieBreak,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration: 20,
            seed: 42,
            rounds_per_tick: 1,
            stop_on_convergence: false, // run the full duration unless asked
            tie_break: TieBreak::CoinFlip,
        }
    }
}

impl SimulationConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the run duration in ticks.
    pub fn with_duration(mut self, duration: Tick) -> Self {
        self.duration = duration;
        self
    }

    /// Set the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of gossip rounds per tick.
    pub fn with_rounds_per_tick(mut self, rounds: u32) -> Self {
        self.rounds_per_tick = rounds;
        self
    }

    /// Enable or disable the convergence early-out.
    pub fn with_stop_on_convergence(mut self, stop: bool) -> Self {
        self.stop_on_convergence = stop;
        self
    }

    /// Set the tie-break policy for all agents.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}
