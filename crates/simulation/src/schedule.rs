//! Task-arrival schedule.

use types::{AgentId, Task, Tick};

/// A scheduled task arrival.
///
/// At tick `at`, clones of `task` land in the catalogs of every destination
/// agent. More than one destination makes the task contested.
#[derive(Debug, Clone)]
pub struct Arrival {
    /// Tick at which the task lands.
    pub at: Tick,
    /// The task being offered.
    pub task: Task,
    /// Agents whose catalogs receive the task.
    pub destinations: Vec<AgentId>,
}

/// Pending arrivals, drained tick by tick.
#[derive(Debug, Default)]
pub struct Schedule {
    pending: Vec<Arrival>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arrival: Arrival) {
        self.pending.push(arrival);
    }

    /// Remove and return every arrival due at or before `now`, preserving
    /// the order they were scheduled in.
    pub fn take_due(&mut self, now: Tick) -> Vec<Arrival> {
        let (due, rest) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|arrival| arrival.at <= now);
        self.pending = rest;
        due
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Capacity;

    fn arrival(at: Tick, name: &str) -> Arrival {
        Arrival {
            at,
            task: Task::new(name, Capacity(10)).unwrap(),
            destinations: vec![AgentId(1)],
        }
    }

    #[test]
    fn test_take_due_splits_by_tick() {
        let mut schedule = Schedule::new();
        schedule.push(arrival(0, "t1"));
        schedule.push(arrival(2, "t2"));
        schedule.push(arrival(0, "t3"));

        let due = schedule.take_due(0);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].task.name(), "t1");
        assert_eq!(due[1].task.name(), "t3");
        assert_eq!(schedule.len(), 1);

        assert!(schedule.take_due(1).is_empty());
        assert_eq!(schedule.take_due(2).len(), 1);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_take_due_catches_stragglers() {
        let mut schedule = Schedule::new();
        schedule.push(arrival(1, "t1"));
        // Skipping past the scheduled tick still delivers.
        assert_eq!(schedule.take_due(5).len(), 1);
    }
}
