//! Channel-backed gossip fabric.

use crate::{AuctionError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::{BTreeMap, HashMap};
use types::{AgentId, Bid, TaskName, Tick};

/// One gossip payload: a full winning-list snapshot from one agent.
#[derive(Debug, Clone)]
pub struct GossipMessage {
    /// Agent that sent the snapshot.
    pub sender: AgentId,
    /// The sender's local winner per task at the time of sending.
    pub winners: BTreeMap<TaskName, Bid>,
    /// Tick at which the snapshot was taken.
    pub sent_at: Tick,
}

/// Directory of agent mailboxes.
///
/// Agents address neighbors by id only; the network owns both ends of every
/// channel. Delivery is reliable and in-order within a tick, which is the
/// transport model the protocol assumes.
pub struct Network {
    mailboxes: HashMap<AgentId, Mailbox>,
}

struct Mailbox {
    tx: Sender<GossipMessage>,
    rx: Receiver<GossipMessage>,
}

impl Network {
    pub fn new() -> Self {
        Self {
            mailboxes: HashMap::new(),
        }
    }

    /// Register an agent id, creating its mailbox.
    pub fn register(&mut self, id: AgentId) -> Result<()> {
        if self.mailboxes.contains_key(&id) {
            return Err(AuctionError::DuplicateAgent(id));
        }
        let (tx, rx) = unbounded();
        self.mailboxes.insert(id, Mailbox { tx, rx });
        Ok(())
    }

    /// Queue a message for `to`. Fails if the id was never registered.
    pub fn send(&self, to: AgentId, msg: GossipMessage) -> Result<()> {
        let mailbox = self
            .mailboxes
            .get(&to)
            .ok_or(AuctionError::UnknownAgent(to))?;
        // The network holds the receiving end, so the channel cannot close.
        let _ = mailbox.tx.send(msg);
        Ok(())
    }

    /// Drain every message queued for `to`, oldest first.
    pub fn drain(&self, to: AgentId) -> Result<Vec<GossipMessage>> {
        let mailbox = self
            .mailboxes
            .get(&to)
            .ok_or(AuctionError::UnknownAgent(to))?;
        Ok(mailbox.rx.try_iter().collect())
    }

    /// Whether `id` has a mailbox.
    pub fn contains(&self, id: AgentId) -> bool {
        self.mailboxes.contains_key(&id)
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.mailboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mailboxes.is_empty()
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}
