//! The farm aggregate: plots, workers, the task queue and the inventory.
//!
//! `Farm` is plain data plus lookup helpers. The services in
//! [`production`](crate::production), [`scheduler`](crate::scheduler) and
//! [`reconcile`](crate::reconcile) are the only code that mutates it in
//! response to game actions.

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{FarmError, Result};
use crate::ids::{IdAllocator, PlotId, TaskId, WorkerId};
use crate::inventory::Inventory;
use crate::math::{Fixed, Timestamp};
use crate::plot::Plot;
use crate::task::{Task, TaskStatus, Worker, WorkerStatus};

/// A single-owner farm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Farm {
    /// Farm identifier chosen by the host.
    pub id: String,
    /// Plots in acquisition order.
    pub plots: Vec<Plot>,
    /// Workers in hiring order.
    pub workers: Vec<Worker>,
    /// Task queue, oldest first.
    pub tasks: VecDeque<Task>,
    /// Resource ledger.
    pub inventory: Inventory,
    /// Instant up to which the farm has been reconciled.
    pub last_observed_at: Timestamp,
    /// When the farm was created.
    pub started_at: Timestamp,
    /// Source of plot, worker, task and entity ids.
    pub ids: IdAllocator,
}

impl Farm {
    /// Create an empty farm: no plots, no workers, default inventory.
    #[must_use]
    pub fn empty(id: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: id.into(),
            plots: Vec::new(),
            workers: Vec::new(),
            tasks: VecDeque::new(),
            inventory: Inventory::default(),
            last_observed_at: now,
            started_at: now,
            ids: IdAllocator::new(),
        }
    }

    /// Create a new farm stocked with the configured starting resources.
    #[must_use]
    pub fn new(id: impl Into<String>, config: &GameConfig, now: Timestamp) -> Self {
        let mut farm = Self::empty(id, now);
        farm.inventory = Inventory::from_initial(&config.initial);
        for _ in 0..config.initial.plots {
            farm.add_plot();
        }
        let service = config.worker_service_duration();
        for _ in 0..config.initial.workers {
            farm.add_worker(service);
        }
        tracing::debug!(
            farm = %farm.id,
            plots = farm.plots.len(),
            workers = farm.workers.len(),
            gold = farm.inventory.gold,
            "Created farm"
        );
        farm
    }

    /// Append an empty plot and return its id.
    pub fn add_plot(&mut self) -> PlotId {
        let id = self.ids.plot();
        self.plots.push(Plot::new(id));
        id
    }

    /// Append an idle worker and return its id.
    pub fn add_worker(&mut self, service_minutes: Fixed) -> WorkerId {
        let id = self.ids.worker();
        self.workers.push(Worker::new(id, service_minutes));
        id
    }

    /// Index of a plot in acquisition order.
    #[must_use]
    pub fn plot_index(&self, id: PlotId) -> Option<usize> {
        self.plots.iter().position(|p| p.id == id)
    }

    /// Look up a plot.
    #[must_use]
    pub fn plot(&self, id: PlotId) -> Option<&Plot> {
        self.plots.iter().find(|p| p.id == id)
    }

    /// Look up a plot mutably.
    pub fn plot_mut(&mut self, id: PlotId) -> Option<&mut Plot> {
        self.plots.iter_mut().find(|p| p.id == id)
    }

    /// Look up a plot or fail with [`FarmError::PlotNotFound`].
    pub fn require_plot(&self, id: PlotId) -> Result<&Plot> {
        self.plot(id).ok_or(FarmError::PlotNotFound(id))
    }

    /// Look up a worker.
    #[must_use]
    pub fn worker(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    /// Look up a queued task.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Remove a task from the queue, returning it.
    pub fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        self.tasks.remove(index)
    }

    /// Number of plots with nothing on them.
    #[must_use]
    pub fn empty_plot_count(&self) -> usize {
        self.plots.iter().filter(|p| p.is_empty()).count()
    }

    /// Number of idle workers.
    #[must_use]
    pub fn idle_worker_count(&self) -> usize {
        self.workers.iter().filter(|w| w.is_idle()).count()
    }

    /// Number of working workers.
    #[must_use]
    pub fn working_worker_count(&self) -> usize {
        self.workers.len() - self.idle_worker_count()
    }

    /// Number of tasks waiting for a worker.
    #[must_use]
    pub fn pending_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_pending()).count()
    }

    /// Win predicate: `gold >= target`.
    #[must_use]
    pub const fn has_reached_goal(&self, target: u64) -> bool {
        self.inventory.gold >= target
    }

    /// Hash of the complete farm state.
    ///
    /// Two farms with identical state produce identical hashes. Used by
    /// determinism and partition tests.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Check structural invariants.
    ///
    /// A failure here indicates a bug in the core, not bad user input.
    pub fn check_invariants(&self) -> Result<()> {
        if self.inventory.equipment_tier == 0 {
            return Err(FarmError::InvalidState("equipment tier is 0".into()));
        }

        for plot in &self.plots {
            if let Some(entity) = &plot.occupant {
                if !entity.invariants_hold() {
                    return Err(FarmError::InvalidState(format!(
                        "{} on {}: {} of {} cycles completed, alive = {}",
                        entity.id,
                        plot.id,
                        entity.cycles_completed,
                        entity.lifespan_cycles,
                        entity.alive
                    )));
                }
            }
        }

        for worker in &self.workers {
            match (worker.status, worker.current_task) {
                (WorkerStatus::Idle, None) => {}
                (WorkerStatus::Working, Some(task_id)) => {
                    let owned = self.task(task_id).is_some_and(|t| {
                        t.status == TaskStatus::InProgress && t.assigned_worker == Some(worker.id)
                    });
                    if !owned {
                        return Err(FarmError::InvalidState(format!(
                            "{} works on {task_id} which is not assigned to it",
                            worker.id
                        )));
                    }
                }
                (status, task) => {
                    return Err(FarmError::InvalidState(format!(
                        "{} is {status:?} with task {task:?}",
                        worker.id
                    )));
                }
            }
        }

        for task in &self.tasks {
            if task.status == TaskStatus::InProgress {
                let held = task.assigned_worker.and_then(|id| self.worker(id)).is_some_and(|w| {
                    w.current_task == Some(task.id)
                });
                if !held {
                    return Err(FarmError::InvalidState(format!(
                        "{} is in progress without a worker",
                        task.id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Run [`check_invariants`](Self::check_invariants) when validation is
    /// compiled in, logging any violation.
    pub(crate) fn debug_validate(&self, context: &str) {
        #[cfg(any(debug_assertions, feature = "debug-validation"))]
        {
            if let Err(err) = self.check_invariants() {
                tracing::error!(farm = %self.id, context, error = %err, "Farm invariant violated");
            }
        }
        #[cfg(not(any(debug_assertions, feature = "debug-validation")))]
        {
            let _ = context;
        }
    }
}
