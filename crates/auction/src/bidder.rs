//! The bidding agent: capacity accounting, pricing, and belief reconciliation.

use crate::{AuctionError, GossipMessage, Network, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};
use types::{AgentId, Bid, Capacity, Price, Task, TaskName, Tick};

// =============================================================================
// Tie-break policy
// =============================================================================

/// What a bidder does when its fair price cannot beat the competition.
///
/// The protocol behavior is [`TieBreak::CoinFlip`]: an unbiased choice
/// between raising and conceding, which prevents livelock when two agents'
/// fair prices are both below the incumbent. The deterministic policies exist
/// for tests and for scenarios that want reproducible outcomes regardless of
/// seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Unbiased coin flip between raising and conceding.
    #[default]
    CoinFlip,
    /// Always raise over the competing price.
    AlwaysRaise,
    /// Always withdraw and let the competing bid stand.
    AlwaysConcede,
}

// =============================================================================
// Reconcile summary
// =============================================================================

/// Counts of what one `reconcile` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileSummary {
    /// Incoming bids installed as the new local winner.
    pub adopted: usize,
    /// Counter-bids that retained the lead at a higher price.
    pub raised: usize,
    /// Own bids withdrawn (or zeroed out) in the face of a better claim.
    pub conceded: usize,
    /// Incoming bids ignored as stale or inferior.
    pub ignored: usize,
}

impl ReconcileSummary {
    /// Number of entries whose local winner actually changed.
    pub fn changed(&self) -> usize {
        self.adopted + self.raised
    }
}

// =============================================================================
// Bidder
// =============================================================================

/// An autonomous agent that bids for tasks against its neighbors.
///
/// A bidder owns a fixed capacity and a unit cost, a catalog of tasks it may
/// bid on, the set of neighbor ids it gossips with, its own standing bids,
/// and a local belief about the winning bid per task. The belief is not a
/// possession: a task in the winning list may name another agent, and the
/// allocation is only final once the driver stops ticking.
#[derive(Debug)]
pub struct Bidder {
    id: AgentId,
    capacity: Capacity,
    unit_cost: Price,
    neighbors: BTreeSet<AgentId>,
    catalog: BTreeMap<TaskName, Task>,
    active_bids: BTreeMap<TaskName, Bid>,
    local_winner: BTreeMap<TaskName, Bid>,
    rng: StdRng,
    tie_break: TieBreak,
}

impl Bidder {
    /// Create a bidder with an OS-seeded generator.
    ///
    /// Fails if `capacity` is zero or `unit_cost` is not positive.
    pub fn new(id: AgentId, capacity: Capacity, unit_cost: Price) -> Result<Self> {
        Self::from_rng(id, capacity, unit_cost, StdRng::from_os_rng())
    }

    /// Create a bidder with a deterministic generator for reproducible runs.
    pub fn with_seed(id: AgentId, capacity: Capacity, unit_cost: Price, seed: u64) -> Result<Self> {
        Self::from_rng(id, capacity, unit_cost, StdRng::seed_from_u64(seed))
    }

    fn from_rng(id: AgentId, capacity: Capacity, unit_cost: Price, rng: StdRng) -> Result<Self> {
        if capacity.is_zero() {
            return Err(types::ValueError::ZeroCapacity.into());
        }
        if !unit_cost.is_positive() {
            return Err(types::ValueError::NonPositiveUnitCost(unit_cost).into());
        }
        Ok(Self {
            id,
            capacity,
            unit_cost,
            neighbors: BTreeSet::new(),
            catalog: BTreeMap::new(),
            active_bids: BTreeMap::new(),
            local_winner: BTreeMap::new(),
            rng,
            tie_break: TieBreak::default(),
        })
    }

    /// Set the tie-break policy.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn unit_cost(&self) -> Price {
        self.unit_cost
    }

    /// Tasks this bidder may bid on.
    pub fn catalog(&self) -> &BTreeMap<TaskName, Task> {
        &self.catalog
    }

    /// This bidder's standing bids, including zero-price sentinels.
    pub fn active_bids(&self) -> &BTreeMap<TaskName, Bid> {
        &self.active_bids
    }

    /// Current belief about the winning bid per task.
    pub fn winning_list(&self) -> &BTreeMap<TaskName, Bid> {
        &self.local_winner
    }

    // ─── Topology ────────────────────────────────────────────────────────────

    /// Record `id` as a gossip neighbor.
    ///
    /// Links are directional: wiring A→B says nothing about B→A. Symmetric
    /// topologies add both directions. Adding the same id twice is a no-op.
    pub fn add_neighbor(&mut self, id: AgentId) {
        self.neighbors.insert(id);
    }

    /// Number of distinct neighbors added to this bidder.
    pub fn count_neighbors(&self) -> usize {
        self.neighbors.len()
    }

    // ─── Catalog ─────────────────────────────────────────────────────────────

    /// Replace the task catalog wholesale.
    pub fn assign_catalog(&mut self, tasks: Vec<Task>) {
        self.catalog = tasks
            .into_iter()
            .map(|task| (task.name().clone(), task))
            .collect();
    }

    /// Insert one task. Fails if the name is already cataloged, leaving the
    /// catalog unmodified.
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if self.catalog.contains_key(task.name()) {
            return Err(AuctionError::DuplicateTask(task.name().clone()));
        }
        self.catalog.insert(task.name().clone(), task);
        Ok(())
    }

    /// Insert several tasks. Stops at the first duplicate; tasks inserted
    /// before it remain.
    pub fn add_tasks(&mut self, tasks: impl IntoIterator<Item = Task>) -> Result<()> {
        for task in tasks {
            self.add_task(task)?;
        }
        Ok(())
    }

    // ─── Capacity accounting ─────────────────────────────────────────────────

    /// Capacity not committed to any serving bid.
    ///
    /// Re-derived from `active_bids` on every call so it always reflects the
    /// current snapshot. Zero-price sentinels commit nothing.
    pub fn residual_capacity(&self) -> Capacity {
        let committed: Capacity = self
            .active_bids
            .values()
            .filter(|bid| bid.is_serving())
            .filter_map(|bid| self.catalog.get(bid.task()))
            .map(Task::demand)
            .sum();
        self.capacity.saturating_sub(committed)
    }

    // ─── Bid construction ────────────────────────────────────────────────────

    /// Price one task against the best competing price known for it.
    ///
    /// Returns the bid to stand for this round, or `None` when the bidder
    /// concedes:
    /// - With less residual capacity than the task demands, the bid is the
    ///   zero-price cannot-serve sentinel.
    /// - Otherwise the fair price scales the task's cost by the fraction of
    ///   capacity left over: `((capacity - demand) / capacity) * unit_cost *
    ///   demand`. Loaded agents bid low, idle agents bid high.
    /// - A fair price below `competing` triggers the tie-break: raise to
    ///   `competing + 1.0`, or withdraw the active bid and return `None`.
    ///
    /// The only state touched here is the active-bid removal on concession;
    /// callers record any returned bid.
    pub fn propose_bid(&mut self, task: &Task, now: Tick, competing: Price) -> Result<Option<Bid>> {
        let residual = self.residual_capacity();
        if residual < task.demand() {
            debug!(
                agent = %self.id,
                task = %task.name(),
                %residual,
                demand = %task.demand(),
                "cannot serve, bidding zero"
            );
            let bid = Bid::new(self.id, task.name().clone(), Price::ZERO, now)?;
            return Ok(Some(bid));
        }

        let fair = self.fair_price(task);
        if fair < competing {
            if self.raise_or_concede() {
                let price = competing + Price::ONE;
                debug!(agent = %self.id, task = %task.name(), %price, "raising over competing bid");
                Ok(Some(Bid::new(self.id, task.name().clone(), price, now)?))
            } else {
                debug!(agent = %self.id, task = %task.name(), "conceding");
                self.active_bids.remove(task.name());
                Ok(None)
            }
        } else {
            Ok(Some(Bid::new(self.id, task.name().clone(), fair, now)?))
        }
    }

    /// Price the whole catalog with no competing price.
    ///
    /// Every returned bid is recorded as a standing bid, and the bidder
    /// installs itself as the provisional winner for any task that has no
    /// winner entry yet. A zero-price bid still establishes the entry:
    /// "nobody contests this task" has to be representable. Existing entries
    /// are never overwritten here; that is `reconcile`'s job.
    pub fn propose_bids(&mut self, now: Tick) -> Result<BTreeMap<TaskName, Bid>> {
        let tasks: Vec<Task> = self.catalog.values().cloned().collect();
        let mut placed = BTreeMap::new();
        for task in tasks {
            if let Some(bid) = self.propose_bid(&task, now, Price::ZERO)? {
                self.active_bids.insert(task.name().clone(), bid.clone());
                self.local_winner
                    .entry(task.name().clone())
                    .or_insert_with(|| bid.clone());
                placed.insert(task.name().clone(), bid);
            }
        }
        Ok(placed)
    }

    // The fair price depends only on the task and the bidder's constants, so
    // it is stable across rounds for a given pair.
    fn fair_price(&self, task: &Task) -> Price {
        // The residual gate runs first, so demand <= capacity here.
        let spare =
            (self.capacity.raw() - task.demand().raw()) as f64 / self.capacity.raw() as f64;
        Price::from_float(spare * self.unit_cost.to_float() * task.demand().raw() as f64)
    }

    fn raise_or_concede(&mut self) -> bool {
        match self.tie_break {
            TieBreak::CoinFlip => self.rng.random_bool(0.5),
            TieBreak::AlwaysRaise => true,
            TieBreak::AlwaysConcede => false,
        }
    }

    // ─── Gossip ──────────────────────────────────────────────────────────────

    /// Send the full winning list to every neighbor. Returns the number of
    /// messages queued.
    pub fn broadcast(&self, now: Tick, network: &Network) -> Result<usize> {
        for neighbor in &self.neighbors {
            trace!(
                from = %self.id,
                to = %neighbor,
                tasks = self.local_winner.len(),
                "gossip send"
            );
            network.send(
                *neighbor,
                GossipMessage {
                    sender: self.id,
                    winners: self.local_winner.clone(),
                    sent_at: now,
                },
            )?;
        }
        Ok(self.neighbors.len())
    }

    /// Merge a neighbor's winning list into the local one.
    ///
    /// Strictly ascending, best price wins:
    /// - A task with no local entry adopts the incoming bid outright, whether
    ///   or not it is cataloged here.
    /// - An incoming price above the local one replaces the entry. If the
    ///   displaced winner is this bidder itself, it first re-prices the task
    ///   against the incoming price; a counter-bid that beats it retains the
    ///   lead, anything else is a concession and the incoming bid is adopted.
    /// - Anything at or below the local price is stale and ignored, so the
    ///   winning price per task never decreases.
    pub fn reconcile(
        &mut self,
        sender: AgentId,
        winners: &BTreeMap<TaskName, Bid>,
        now: Tick,
    ) -> Result<ReconcileSummary> {
        let mut summary = ReconcileSummary::default();
        for (task_name, incoming) in winners {
            let current = self
                .local_winner
                .get(task_name)
                .map(|bid| (bid.agent(), bid.price()));
            match current {
                None => {
                    debug!(
                        agent = %self.id,
                        task = %task_name,
                        from = %sender,
                        winner = %incoming.agent(),
                        price = %incoming.price(),
                        "adopting first claim"
                    );
                    self.local_winner.insert(task_name.clone(), incoming.clone());
                    summary.adopted += 1;
                }
                Some((winner, local_price)) if incoming.price() > local_price => {
                    if winner == self.id {
                        self.counter_bid(task_name, incoming, now, &mut summary)?;
                    } else {
                        debug!(
                            agent = %self.id,
                            task = %task_name,
                            winner = %incoming.agent(),
                            price = %incoming.price(),
                            "adopting higher claim"
                        );
                        self.local_winner.insert(task_name.clone(), incoming.clone());
                        summary.adopted += 1;
                    }
                }
                Some(_) => summary.ignored += 1,
            }
        }
        Ok(summary)
    }

    // Outbid on a task this bidder believed it was winning: re-price against
    // the incoming claim. A counter that fails to beat the incoming price is
    // a concession, including the zero-price sentinel, so the winning price
    // never moves backwards.
    fn counter_bid(
        &mut self,
        task_name: &TaskName,
        incoming: &Bid,
        now: Tick,
        summary: &mut ReconcileSummary,
    ) -> Result<()> {
        let counter = match self.catalog.get(task_name).cloned() {
            Some(task) => self.propose_bid(&task, now, incoming.price())?,
            // No longer cataloged here: nothing to re-price from.
            None => None,
        };
        match counter {
            Some(bid) if bid.price() > incoming.price() => {
                debug!(
                    agent = %self.id,
                    task = %task_name,
                    price = %bid.price(),
                    over = %incoming.price(),
                    "counter-bid retains lead"
                );
                self.active_bids.insert(task_name.clone(), bid.clone());
                self.local_winner.insert(task_name.clone(), bid);
                summary.raised += 1;
            }
            Some(bid) if !bid.is_serving() => {
                // Zero-price sentinel: record it so the committed capacity is
                // released, then let the incoming claim stand.
                self.active_bids.insert(task_name.clone(), bid);
                self.local_winner.insert(task_name.clone(), incoming.clone());
                summary.conceded += 1;
                summary.adopted += 1;
            }
            Some(_) => {
                // Equal-price counter: a tie never displaces the incoming
                // claim, so the bid is withdrawn rather than left committing
                // capacity to a task the bidder believes it lost.
                self.active_bids.remove(task_name);
                self.local_winner.insert(task_name.clone(), incoming.clone());
                summary.conceded += 1;
                summary.adopted += 1;
            }
            None => {
                self.local_winner.insert(task_name.clone(), incoming.clone());
                summary.conceded += 1;
                summary.adopted += 1;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
