//! Scheduler service: assigns idle workers to queued tasks and applies
//! task effects once a worker's service time has elapsed.
//!
//! Each [`Scheduler::tick`] runs two phases in a fixed order:
//!
//! 1. **Completion**: every working worker whose service time has elapsed
//!    applies its task's effect through [`Production`]. The task is marked
//!    `Completed` on a positive result and `Failed` otherwise, then removed
//!    from the queue; the worker becomes idle.
//! 2. **Assignment**: idle workers, in hiring order, each take the oldest
//!    pending task.

use crate::config::GameConfig;
use crate::error::{FarmError, Result};
use crate::farm::Farm;
use crate::ids::{PlotId, TaskId, WorkerId};
use crate::kind::CropKind;
use crate::math::Timestamp;
use crate::production::{log_rejection, Production};
use crate::task::{Task, TaskKind, TaskStatus};

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tasks whose effect produced a result.
    pub completed: Vec<TaskId>,
    /// Tasks whose effect did nothing.
    pub failed: Vec<TaskId>,
    /// Tasks handed to a worker this tick.
    pub assigned: Vec<(TaskId, WorkerId)>,
}

impl TickReport {
    /// Whether the tick changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.failed.is_empty() && self.assigned.is_empty()
    }
}

/// Worker/task scheduler.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler<'a> {
    production: Production<'a>,
}

impl<'a> Scheduler<'a> {
    /// Create a scheduler over a resolved configuration.
    #[must_use]
    pub const fn new(config: &'a GameConfig) -> Self {
        Self {
            production: Production::new(config),
        }
    }

    /// Advance every worker to `now`.
    pub fn tick(&self, farm: &mut Farm, now: Timestamp) -> TickReport {
        let mut report = TickReport::default();
        self.complete_due_tasks(farm, now, &mut report);
        Self::assign_pending_tasks(farm, now, &mut report);

        if !report.is_empty() {
            tracing::debug!(
                completed = report.completed.len(),
                failed = report.failed.len(),
                assigned = report.assigned.len(),
                pending = farm.pending_task_count(),
                "Scheduler tick"
            );
        }
        farm.debug_validate("scheduler tick");
        report
    }

    fn complete_due_tasks(&self, farm: &mut Farm, now: Timestamp, report: &mut TickReport) {
        let due: Vec<usize> = farm
            .workers
            .iter()
            .enumerate()
            .filter(|(_, w)| w.is_task_due(now))
            .map(|(i, _)| i)
            .collect();

        for index in due {
            let worker = &mut farm.workers[index];
            let worker_id = worker.id;
            let Some(task_id) = worker.release() else {
                tracing::warn!(worker = %worker_id, "Working without a task; released");
                continue;
            };
            let Some(mut task) = farm.remove_task(task_id) else {
                tracing::warn!(worker = %worker_id, task = %task_id, "Task vanished from queue");
                continue;
            };

            let succeeded = self.apply(farm, &task, now);
            task.status = if succeeded {
                TaskStatus::Completed
            } else {
                TaskStatus::Failed
            };

            tracing::debug!(
                worker = %worker_id,
                task = %task.id,
                kind = ?task.kind,
                plot = %task.plot,
                status = ?task.status,
                "Task finished"
            );
            if succeeded {
                report.completed.push(task.id);
            } else {
                report.failed.push(task.id);
            }
        }
    }

    fn apply(&self, farm: &mut Farm, task: &Task, now: Timestamp) -> bool {
        match task.kind {
            TaskKind::PlantCrop => match task.crop {
                Some(crop) => self.production.plant_crop(farm, task.plot, crop, now),
                None => {
                    tracing::warn!(task = %task.id, "Plant task without a crop");
                    false
                }
            },
            TaskKind::HarvestCrop => self.production.harvest_crop(farm, task.plot, now) > 0,
            TaskKind::CollectProduce => self.production.collect_produce(farm, task.plot, now) > 0,
        }
    }

    fn assign_pending_tasks(farm: &mut Farm, now: Timestamp, report: &mut TickReport) {
        for worker in farm.workers.iter_mut().filter(|w| w.is_idle()) {
            let Some(task) = farm.tasks.iter_mut().find(|t| t.is_pending()) else {
                break;
            };
            task.status = TaskStatus::InProgress;
            task.assigned_worker = Some(worker.id);
            worker.assign(task.id, now);
            report.assigned.push((task.id, worker.id));
        }
    }

    /// Queue a harvest or collect task for every ready plot that has no
    /// outstanding task. Returns the number of tasks queued.
    pub fn auto_queue_harvest_tasks(&self, farm: &mut Farm, now: Timestamp) -> usize {
        let bonus = farm.inventory.equipment_bonus();
        let targets: Vec<(PlotId, TaskKind)> = farm
            .plots
            .iter()
            .filter(|plot| {
                !farm
                    .tasks
                    .iter()
                    .any(|t| t.plot == plot.id && t.is_outstanding())
            })
            .filter_map(|plot| {
                let entity = plot.occupant.as_ref()?;
                if entity.ready_count(now, bonus) == 0 {
                    return None;
                }
                let kind = if entity.kind.is_crop() {
                    TaskKind::HarvestCrop
                } else {
                    TaskKind::CollectProduce
                };
                Some((plot.id, kind))
            })
            .collect();

        for &(plot, kind) in &targets {
            Self::enqueue(farm, kind, plot, None, now);
        }
        targets.len()
    }

    fn enqueue(
        farm: &mut Farm,
        kind: TaskKind,
        plot: PlotId,
        crop: Option<CropKind>,
        now: Timestamp,
    ) -> TaskId {
        let id = farm.ids.task();
        farm.tasks.push_back(Task::new(id, kind, plot, crop, now));
        tracing::debug!(task = %id, ?kind, plot = %plot, "Queued task");
        id
    }

    fn queue_for_plot(
        farm: &mut Farm,
        kind: TaskKind,
        plot: PlotId,
        crop: Option<CropKind>,
        now: Timestamp,
    ) -> Result<TaskId> {
        farm.require_plot(plot)?;
        Ok(Self::enqueue(farm, kind, plot, crop, now))
    }

    /// Queue a task to plant `crop` on a plot.
    pub fn queue_plant_task(
        &self,
        farm: &mut Farm,
        plot: PlotId,
        crop: CropKind,
        now: Timestamp,
    ) -> Result<TaskId> {
        Self::queue_for_plot(farm, TaskKind::PlantCrop, plot, Some(crop), now)
    }

    /// Queue a task to harvest the crop on a plot.
    pub fn queue_harvest_task(&self, farm: &mut Farm, plot: PlotId, now: Timestamp) -> Result<TaskId> {
        Self::queue_for_plot(farm, TaskKind::HarvestCrop, plot, None, now)
    }

    /// Queue a task to collect goods from the animal on a plot.
    pub fn queue_collect_task(&self, farm: &mut Farm, plot: PlotId, now: Timestamp) -> Result<TaskId> {
        Self::queue_for_plot(farm, TaskKind::CollectProduce, plot, None, now)
    }

    /// Remove a task from the queue, freeing its worker if it had one.
    pub fn cancel_task(&self, farm: &mut Farm, task: TaskId) -> Result<Task> {
        let removed = farm.remove_task(task).ok_or(FarmError::TaskNotFound(task))?;
        if let Some(worker) = farm
            .workers
            .iter_mut()
            .find(|w| w.current_task == Some(task))
        {
            worker.release();
        }
        tracing::debug!(task = %task, "Cancelled task");
        Ok(removed)
    }

    /// Hire a worker at the configured cost.
    pub fn try_hire_worker(&self, farm: &mut Farm) -> Result<WorkerId> {
        let config = self.production.config();
        farm.inventory.spend(config.worker_hire_cost)?;
        let id = farm.add_worker(config.worker_service_duration());
        tracing::debug!(worker = %id, workers = farm.workers.len(), "Hired worker");
        Ok(id)
    }

    /// Hire a worker. Returns `false` if unaffordable.
    pub fn hire_worker(&self, farm: &mut Farm) -> bool {
        self.try_hire_worker(farm)
            .map_err(|err| log_rejection("hire_worker", &err))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProduceConfig;
    use crate::task::WorkerStatus;

    fn t0() -> Timestamp {
        Timestamp::from_secs(1_700_000_000)
    }

    fn setup() -> (GameConfig, Farm) {
        let mut config = GameConfig::default();
        config.initial.workers = 2;
        config.initial.seeds.insert(CropKind::Tomato, 10);
        let farm = Farm::new("sched", &config, t0());
        (config, farm)
    }

    #[test]
    fn test_fifo_assignment() {
        let (config, mut farm) = setup();
        let scheduler = Scheduler::new(&config);
        let plots: Vec<PlotId> = farm.plots.iter().map(|p| p.id).collect();
        let tasks: Vec<TaskId> = plots
            .iter()
            .map(|&p| scheduler.queue_plant_task(&mut farm, p, CropKind::Tomato, t0()).unwrap())
            .collect();

        let report = scheduler.tick(&mut farm, t0());
        assert_eq!(
            report.assigned,
            vec![(tasks[0], farm.workers[0].id), (tasks[1], farm.workers[1].id)]
        );
        assert_eq!(farm.task(tasks[0]).unwrap().status, TaskStatus::InProgress);
        assert_eq!(farm.task(tasks[1]).unwrap().status, TaskStatus::InProgress);
        assert_eq!(farm.task(tasks[2]).unwrap().status, TaskStatus::Pending);
        assert_eq!(farm.idle_worker_count(), 0);
    }

    #[test]
    fn test_completion_after_service_time() {
        let (config, mut farm) = setup();
        let scheduler = Scheduler::new(&config);
        let plot = farm.plots[0].id;
        let task = scheduler
            .queue_plant_task(&mut farm, plot, CropKind::Tomato, t0())
            .unwrap();

        scheduler.tick(&mut farm, t0());
        let early = scheduler.tick(&mut farm, t0().add_secs(90));
        assert!(early.completed.is_empty());
        assert!(farm.plots[0].is_empty());

        let done = scheduler.tick(&mut farm, t0().add_minutes(2));
        assert_eq!(done.completed, vec![task]);
        assert!(farm.task(task).is_none());
        assert!(!farm.plots[0].is_empty());
        assert_eq!(farm.idle_worker_count(), 2);
        assert_eq!(farm.inventory.seed_count(CropKind::Tomato), 9);
    }

    #[test]
    fn test_failed_task_is_removed() {
        let (config, mut farm) = setup();
        let scheduler = Scheduler::new(&config);
        let plot = farm.plots[0].id;
        let task = scheduler.queue_harvest_task(&mut farm, plot, t0()).unwrap();

        scheduler.tick(&mut farm, t0());
        let report = scheduler.tick(&mut farm, t0().add_minutes(2));
        assert_eq!(report.failed, vec![task]);
        assert!(farm.tasks.is_empty());
        assert!(farm.workers.iter().all(|w| w.status == WorkerStatus::Idle));
    }

    #[test]
    fn test_completed_worker_picks_next_task_same_tick() {
        let (config, mut farm) = setup();
        farm.workers.truncate(1);
        let scheduler = Scheduler::new(&config);
        let (first, second) = (farm.plots[0].id, farm.plots[1].id);
        let a = scheduler
            .queue_plant_task(&mut farm, first, CropKind::Tomato, t0())
            .unwrap();
        let b = scheduler
            .queue_plant_task(&mut farm, second, CropKind::Tomato, t0())
            .unwrap();

        scheduler.tick(&mut farm, t0());
        let report = scheduler.tick(&mut farm, t0().add_minutes(2));
        assert_eq!(report.completed, vec![a]);
        assert_eq!(report.assigned, vec![(b, farm.workers[0].id)]);
    }

    #[test]
    fn test_auto_queue_skips_outstanding_plots() {
        let (mut config, mut farm) = setup();
        config
            .crops
            .insert(CropKind::Tomato, ProduceConfig::new(10.0, 1, 40, 5, 30));
        let production = Production::new(&config);
        let scheduler = Scheduler::new(&config);
        let crop_plot = farm.plots[0].id;
        let cow_plot = farm.plots[1].id;
        production.plant_crop(&mut farm, crop_plot, CropKind::Tomato, t0());
        production.place_animal(&mut farm, cow_plot, crate::kind::AnimalKind::DairyCow, t0());

        assert_eq!(scheduler.auto_queue_harvest_tasks(&mut farm, t0().add_minutes(5)), 0);
        assert_eq!(scheduler.auto_queue_harvest_tasks(&mut farm, t0().add_minutes(30)), 2);
        assert_eq!(farm.tasks[0].kind, TaskKind::HarvestCrop);
        assert_eq!(farm.tasks[1].kind, TaskKind::CollectProduce);
        assert_eq!(scheduler.auto_queue_harvest_tasks(&mut farm, t0().add_minutes(40)), 0);

        farm.tasks[0].status = TaskStatus::Failed;
        assert_eq!(scheduler.auto_queue_harvest_tasks(&mut farm, t0().add_minutes(40)), 1);
    }

    #[test]
    fn test_queue_unknown_plot() {
        let (config, mut farm) = setup();
        let scheduler = Scheduler::new(&config);
        assert_eq!(
            scheduler.queue_harvest_task(&mut farm, PlotId(404), t0()),
            Err(FarmError::PlotNotFound(PlotId(404)))
        );
        assert!(farm.tasks.is_empty());
    }

    #[test]
    fn test_cancel_task_frees_worker() {
        let (config, mut farm) = setup();
        let scheduler = Scheduler::new(&config);
        let plot = farm.plots[0].id;
        let task = scheduler.queue_collect_task(&mut farm, plot, t0()).unwrap();
        scheduler.tick(&mut farm, t0());
        assert_eq!(farm.working_worker_count(), 1);

        assert_eq!(scheduler.cancel_task(&mut farm, task).map(|t| t.id), Ok(task));
        assert_eq!(farm.working_worker_count(), 0);
        assert_eq!(
            scheduler.cancel_task(&mut farm, task).map(|t| t.id),
            Err(FarmError::TaskNotFound(task))
        );
    }

    #[test]
    fn test_hire_worker() {
        let (config, mut farm) = setup();
        let scheduler = Scheduler::new(&config);
        assert!(!scheduler.hire_worker(&mut farm));
        farm.inventory.gold = 500;
        let id = scheduler.try_hire_worker(&mut farm).unwrap();
        assert_eq!(farm.workers.len(), 3);
        assert!(farm.worker(id).unwrap().is_idle());
        assert_eq!(farm.inventory.gold, 0);
    }
}
