//! Task value type.

use crate::{Capacity, Result, TaskName, ValueError};

/// An immutable demand descriptor: a named unit of work requiring capacity.
///
/// Identity is the name. Two tasks with the same name are the same task as
/// far as catalogs and winning lists are concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    name: TaskName,
    demand: Capacity,
}

impl Task {
    /// Create a task. Fails if `demand` is zero.
    pub fn new(name: impl Into<TaskName>, demand: Capacity) -> Result<Self> {
        let name = name.into();
        if demand.is_zero() {
            return Err(ValueError::ZeroDemand(name));
        }
        Ok(Self { name, demand })
    }

    pub fn name(&self) -> &TaskName {
        &self.name
    }

    pub fn demand(&self) -> Capacity {
        self.demand
    }
}
