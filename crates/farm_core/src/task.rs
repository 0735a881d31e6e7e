//! Worker and task state machines.
//!
//! Tasks move `Pending -> InProgress -> {Completed | Failed}`; workers
//! move `Idle -> Working -> Idle`. Both are plain data; the
//! [`Scheduler`](crate::scheduler::Scheduler) drives the transitions.

use serde::{Deserialize, Serialize};

use crate::ids::{PlotId, TaskId, WorkerId};
use crate::kind::CropKind;
use crate::math::{fixed_serde, Fixed, Timestamp};

/// What a task does when its worker finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Plant a seed on an empty plot.
    PlantCrop,
    /// Harvest a ready crop.
    HarvestCrop,
    /// Collect goods from a ready animal.
    CollectProduce,
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Waiting for a worker.
    Pending,
    /// Assigned to a worker.
    InProgress,
    /// Effect applied with a positive result.
    Completed,
    /// Effect applied but nothing happened.
    Failed,
}

/// A queued unit of work targeting one plot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier.
    pub id: TaskId,
    /// Effect to apply on completion.
    pub kind: TaskKind,
    /// Lifecycle state.
    pub status: TaskStatus,
    /// Target plot.
    pub plot: PlotId,
    /// Crop to plant, for [`TaskKind::PlantCrop`].
    pub crop: Option<CropKind>,
    /// When the task was queued.
    pub created_at: Timestamp,
    /// Worker carrying out the task.
    pub assigned_worker: Option<WorkerId>,
}

impl Task {
    /// Create a pending task.
    #[must_use]
    pub const fn new(
        id: TaskId,
        kind: TaskKind,
        plot: PlotId,
        crop: Option<CropKind>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            kind,
            status: TaskStatus::Pending,
            plot,
            crop,
            created_at,
            assigned_worker: None,
        }
    }

    /// Whether the task is waiting for a worker.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Whether the task still blocks new tasks for the same plot.
    #[must_use]
    pub fn is_outstanding(&self) -> bool {
        self.status != TaskStatus::Failed
    }
}

/// Worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkerStatus {
    /// Available for assignment.
    #[default]
    Idle,
    /// Carrying out a task.
    Working,
}

/// An abstract farm hand with a fixed per-task service time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Worker {
    /// Worker identifier.
    pub id: WorkerId,
    /// Current state.
    pub status: WorkerStatus,
    /// Task being carried out.
    pub current_task: Option<TaskId>,
    /// When the current task was started.
    pub task_started_at: Timestamp,
    /// Minutes needed to finish one task.
    #[serde(with = "fixed_serde")]
    pub service_minutes: Fixed,
}

impl Worker {
    /// Create an idle worker.
    #[must_use]
    pub const fn new(id: WorkerId, service_minutes: Fixed) -> Self {
        Self {
            id,
            status: WorkerStatus::Idle,
            current_task: None,
            task_started_at: Timestamp::ZERO,
            service_minutes,
        }
    }

    /// Whether the worker is available.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.status == WorkerStatus::Idle
    }

    /// Start a task.
    pub fn assign(&mut self, task: TaskId, now: Timestamp) {
        self.status = WorkerStatus::Working;
        self.current_task = Some(task);
        self.task_started_at = now;
    }

    /// Whether the service time has elapsed by `now`.
    #[must_use]
    pub fn is_task_due(&self, now: Timestamp) -> bool {
        self.status == WorkerStatus::Working
            && now.minutes_since(self.task_started_at) >= self.service_minutes
    }

    /// Return to idle, yielding the task that was being carried out.
    pub fn release(&mut self) -> Option<TaskId> {
        self.status = WorkerStatus::Idle;
        self.current_task.take()
    }
}
