//! Decentralized auction protocol for capacity allocation.
//!
//! A set of [`Bidder`]s, each owning a fixed capacity, compete for tasks by
//! price. There is no coordinator: every agent keeps a local belief about the
//! winning bid per task and gossips that belief to its neighbors, adopting
//! strictly better incoming claims and counter-bidding when it is outbid on a
//! task it thought it was winning.
//!
//! ```text
//!   propose_bids()        broadcast()            reconcile()
//!  ┌──────────────┐      ┌──────────────┐      ┌──────────────┐
//!  │ price catalog │ ───▶ │ winning list │ ───▶ │ adopt / raise │
//!  │ vs residual   │      │ to neighbors │      │ / concede     │
//!  └──────────────┘      └──────────────┘      └──────────────┘
//!         ▲                                           │
//!         └───────────── next gossip round ◀──────────┘
//! ```
//!
//! Agents never hold references to each other. All gossip travels as
//! [`GossipMessage`] values through the [`Network`] directory, so the
//! no-shared-memory model holds even in a single process.

mod bidder;
mod error;
mod network;

pub use bidder::{Bidder, ReconcileSummary, TieBreak};
pub use error::{AuctionError, Result};
pub use network::{GossipMessage, Network};
