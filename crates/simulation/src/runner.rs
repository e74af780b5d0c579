//! The simulation runner: clock, arrival delivery, and gossip rounds.

use std::collections::{BTreeMap, BTreeSet};

use auction::{Bidder, Network};
use tracing::{debug, info};
use types::{AgentId, Capacity, Price, Tick};

use crate::{Arrival, Result, Schedule, SimulationConfig, SimulationError};

/// Cumulative statistics for a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimulationStats {
    /// Ticks actually run. May be less than the configured duration when the
    /// convergence early-out fires.
    pub ticks_run: u64,

    /// Task arrivals delivered.
    pub tasks_arrived: usize,

    /// Bids recorded while pricing catalogs after arrivals.
    pub bids_placed: usize,

    /// Gossip messages queued on the network.
    pub messages_sent: usize,

    /// Winner entries adopted from neighbors.
    pub adoptions: usize,

    /// Counter-bids that retained a lead at a higher price.
    pub raises: usize,

    /// Standing bids withdrawn or zeroed out.
    pub concessions: usize,
}

/// The allocation driver.
///
/// Owns the global clock, the agents, the gossip network, and the arrival
/// schedule. Agents only react to being ticked; everything they learn about
/// each other travels through the network as messages.
pub struct Simulation {
    config: SimulationConfig,
    bidders: BTreeMap<AgentId, Bidder>,
    network: Network,
    schedule: Schedule,
    stats: SimulationStats,
    tick: Tick,
    converged: bool,
}

impl Simulation {
    /// Create an empty simulation with the given configuration.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            bidders: BTreeMap::new(),
            network: Network::new(),
            schedule: Schedule::new(),
            stats: SimulationStats::default(),
            tick: 0,
            converged: false,
        }
    }

    /// Create a simulation with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SimulationConfig::default())
    }

    // ─── Setup ───────────────────────────────────────────────────────────────

    /// Add an agent. Its generator seed derives from the master seed and the
    /// agent id, and it uses the configured tie-break policy.
    pub fn add_agent(&mut self, id: AgentId, capacity: Capacity, unit_cost: Price) -> Result<()> {
        let seed = self.config.seed.wrapping_add(id.0);
        let bidder =
            Bidder::with_seed(id, capacity, unit_cost, seed)?.with_tie_break(self.config.tie_break);
        self.network.register(id)?;
        self.bidders.insert(id, bidder);
        Ok(())
    }

    /// Wire a symmetric gossip link between two agents.
    pub fn link(&mut self, a: AgentId, b: AgentId) -> Result<()> {
        if !self.bidders.contains_key(&a) {
            return Err(SimulationError::UnknownAgent(a));
        }
        if !self.bidders.contains_key(&b) {
            return Err(SimulationError::UnknownAgent(b));
        }
        if let Some(bidder) = self.bidders.get_mut(&a) {
            bidder.add_neighbor(b);
        }
        if let Some(bidder) = self.bidders.get_mut(&b) {
            bidder.add_neighbor(a);
        }
        Ok(())
    }

    /// Queue a task arrival. Destinations must be known agents and the tick
    /// must fall inside the run.
    pub fn schedule_arrival(&mut self, arrival: Arrival) -> Result<()> {
        if arrival.at >= self.config.duration {
            return Err(SimulationError::ArrivalAfterEnd {
                at: arrival.at,
                duration: self.config.duration,
            });
        }
        for dest in &arrival.destinations {
            if !self.bidders.contains_key(dest) {
                return Err(SimulationError::UnknownAgent(*dest));
            }
        }
        self.schedule.push(arrival);
        Ok(())
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    /// Current simulation tick.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Number of agents in the simulation.
    pub fn agent_count(&self) -> usize {
        self.bidders.len()
    }

    /// Run statistics so far.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// The active configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// One agent, by id.
    pub fn agent(&self, id: AgentId) -> Option<&Bidder> {
        self.bidders.get(&id)
    }

    /// All agents in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Bidder> {
        self.bidders.values()
    }

    /// Whether the last completed tick changed no beliefs anywhere, with no
    /// arrivals left to deliver. A later arrival clears the flag again.
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    // ─── Run loop ────────────────────────────────────────────────────────────

    /// Advance the simulation by one tick:
    ///
    /// 1. Deliver arrivals due at the current tick.
    /// 2. Agents that received tasks price their whole catalog.
    /// 3. Run the configured number of gossip rounds; in each, every agent
    ///    broadcasts its winning list, then every agent drains its mailbox
    ///    and reconciles. The phase split keeps rounds aligned: nobody sees
    ///    a neighbor's next-round state early.
    /// 4. Advance the clock.
    pub fn step(&mut self) -> Result<()> {
        let touched = self.deliver_arrivals()?;
        if !touched.is_empty() {
            // New work reopens the auction.
            self.converged = false;
        }
        for id in touched {
            let Some(bidder) = self.bidders.get_mut(&id) else {
                continue;
            };
            let placed = bidder.propose_bids(self.tick)?;
            debug!(agent = %id, bids = placed.len(), "catalog priced");
            self.stats.bids_placed += placed.len();
        }

        let mut quiet = true;
        for _ in 0..self.config.rounds_per_tick {
            if self.gossip_round()? > 0 {
                quiet = false;
            }
        }

        if quiet && self.schedule.is_empty() {
            if !self.converged {
                info!(tick = self.tick, "beliefs stable, auction converged");
            }
            self.converged = true;
        }

        self.tick += 1;
        self.stats.ticks_run = self.tick;
        Ok(())
    }

    /// Run until the configured duration elapses, or earlier when the
    /// convergence early-out is enabled and fires.
    pub fn run(&mut self) -> Result<()> {
        info!(
            agents = self.bidders.len(),
            duration = self.config.duration,
            rounds_per_tick = self.config.rounds_per_tick,
            "starting run"
        );
        while self.tick < self.config.duration {
            if self.config.stop_on_convergence && self.converged {
                info!(tick = self.tick, "stopping early, nothing left to settle");
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    // ─── Phases ──────────────────────────────────────────────────────────────

    fn deliver_arrivals(&mut self) -> Result<BTreeSet<AgentId>> {
        let due = self.schedule.take_due(self.tick);
        let mut touched = BTreeSet::new();
        for arrival in due {
            info!(
                tick = self.tick,
                task = %arrival.task.name(),
                demand = %arrival.task.demand(),
                destinations = arrival.destinations.len(),
                "task arrived"
            );
            for dest in &arrival.destinations {
                let Some(bidder) = self.bidders.get_mut(dest) else {
                    return Err(SimulationError::UnknownAgent(*dest));
                };
                bidder.add_task(arrival.task.clone())?;
                touched.insert(*dest);
            }
            self.stats.tasks_arrived += 1;
        }
        Ok(touched)
    }

    // One gossip round. Returns how many winner entries changed anywhere.
    fn gossip_round(&mut self) -> Result<usize> {
        for bidder in self.bidders.values() {
            self.stats.messages_sent += bidder.broadcast(self.tick, &self.network)?;
        }

        let ids: Vec<AgentId> = self.bidders.keys().copied().collect();
        let mut changes = 0;
        for id in ids {
            let inbox = self.network.drain(id)?;
            let Some(bidder) = self.bidders.get_mut(&id) else {
                continue;
            };
            for msg in inbox {
                let summary = bidder.reconcile(msg.sender, &msg.winners, self.tick)?;
                self.stats.adoptions += summary.adopted;
                self.stats.raises += summary.raised;
                self.stats.concessions += summary.conceded;
                changes += summary.changed();
            }
        }
        Ok(changes)
    }
}

// =============================================================================
// Tests
// =============================================================================
