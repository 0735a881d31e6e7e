//! Typed identifiers for farm objects.
//!
//! Identifiers are allocated from a single per-farm counter so that two
//! farms built by the same sequence of operations carry identical ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a growable or producible resource entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Unique identifier for a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlotId(pub u64);

/// Unique identifier for a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub u64);

/// Unique identifier for a queued task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

impl fmt::Display for PlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plot#{}", self.0)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker#{}", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Monotonic id source owned by a farm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator that hands out ids starting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    fn bump(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Allocate an entity id.
    pub fn entity(&mut self) -> EntityId {
        EntityId(self.bump())
    }

    /// Allocate a plot id.
    pub fn plot(&mut self) -> PlotId {
        PlotId(self.bump())
    }

    /// Allocate a worker id.
    pub fn worker(&mut self) -> WorkerId {
        WorkerId(self.bump())
    }

    /// Allocate a task id.
    pub fn task(&mut self) -> TaskId {
        TaskId(self.bump())
    }

    /// Make sure future ids are strictly greater than `seen`.
    ///
    /// Used when repairing snapshots whose counter lags behind the ids
    /// already present.
    pub fn reserve_past(&mut self, seen: u64) {
        if self.next <= seen {
            self.next = seen + 1;
        }
    }

    /// The next id that will be handed out.
    #[must_use]
    pub const fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
