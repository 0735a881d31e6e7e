//! Persistence boundary: in-memory snapshot encoding and load-time repair.
//!
//! The core performs no file IO. Hosts encode a [`FarmSnapshot`] to bytes
//! (bincode) or JSON, store it wherever they like, and hand the decoded
//! snapshot back through [`FarmSnapshot::restore`], which repairs
//! recoverable anomalies instead of rejecting the whole save.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{FarmError, Result};
use crate::farm::Farm;
use crate::math::{Fixed, Timestamp};
use crate::task::{TaskStatus, WorkerStatus};

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 2;

/// A versioned copy of a farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    /// Format version.
    pub version: u32,
    /// When the snapshot was taken.
    pub saved_at: Timestamp,
    /// The farm state.
    pub farm: Farm,
}

impl FarmSnapshot {
    /// Capture the current state of a farm.
    #[must_use]
    pub fn capture(farm: &Farm, saved_at: Timestamp) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at,
            farm: farm.clone(),
        }
    }

    fn check_version(self) -> Result<Self> {
        if self.version != SNAPSHOT_VERSION {
            return Err(FarmError::SnapshotVersion {
                expected: SNAPSHOT_VERSION,
                found: self.version,
            });
        }
        Ok(self)
    }

    /// Encode to a compact binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| FarmError::Snapshot(format!("Failed to encode snapshot: {e}")))
    }

    /// Decode from the binary form.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let snapshot: Self = bincode::deserialize(data)
            .map_err(|e| FarmError::Snapshot(format!("Failed to decode snapshot: {e}")))?;
        snapshot.check_version()
    }

    /// Encode to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FarmError::Snapshot(format!("Failed to encode snapshot: {e}")))
    }

    /// Decode from JSON.
    ///
    /// Entities missing their configuration fields decode with zeros; run
    /// [`restore`](Self::restore) to re-attach them.
    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(text)
            .map_err(|e| FarmError::Snapshot(format!("Failed to decode snapshot: {e}")))?;
        snapshot.check_version()
    }

    /// Repair the farm against `config` and hand it over.
    pub fn restore(self, config: &GameConfig) -> (Farm, RepairReport) {
        let mut farm = self.farm;
        let report = repair(&mut farm, config);
        (farm, report)
    }
}

/// Counts of repairs applied by [`repair`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Entities whose zeroed cycle anchor or banked-ready instant was reset.
    pub anchors_reset: usize,
    /// Entities whose configuration fields were re-attached.
    pub configs_reattached: usize,
    /// Plots cleared because their occupant had no configuration.
    pub plots_cleared: usize,
    /// Entities whose cycle counters were clamped.
    pub counters_clamped: usize,
    /// Workers returned to idle because their task was gone.
    pub workers_released: usize,
    /// Workers given the configured service time.
    pub service_times_reset: usize,
    /// In-progress tasks without a worker returned to pending.
    pub tasks_requeued: usize,
    /// Finished tasks left in the queue and dropped.
    pub tasks_dropped: usize,
    /// Whether the equipment tier was raised from 0 to 1.
    pub tier_fixed: bool,
    /// Whether a zeroed watermark was reset to the start time.
    pub watermark_reset: bool,
}

impl RepairReport {
    /// Whether nothing needed repair.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.anchors_reset == 0
            && self.configs_reattached == 0
            && self.plots_cleared == 0
            && self.counters_clamped == 0
            && self.workers_released == 0
            && self.service_times_reset == 0
            && self.tasks_requeued == 0
            && self.tasks_dropped == 0
            && !self.tier_fixed
            && !self.watermark_reset
    }
}

/// Apply load-time repairs to a restored farm.
pub fn repair(farm: &mut Farm, config: &GameConfig) -> RepairReport {
    let mut report = RepairReport::default();
    let started_at = farm.started_at;

    repair_entities(farm, config, &mut report);

    if farm.inventory.equipment_tier == 0 {
        farm.inventory.equipment_tier = 1;
        report.tier_fixed = true;
    }
    if farm.last_observed_at.is_zero() && !started_at.is_zero() {
        farm.last_observed_at = started_at;
        report.watermark_reset = true;
    }

    repair_workers(farm, config, &mut report);

    let max_id = farm
        .plots
        .iter()
        .flat_map(|p| std::iter::once(p.id.0).chain(p.occupant.as_ref().map(|e| e.id.0)))
        .chain(farm.workers.iter().map(|w| w.id.0))
        .chain(farm.tasks.iter().map(|t| t.id.0))
        .max()
        .unwrap_or(0);
    farm.ids.reserve_past(max_id);

    if report.is_clean() {
        tracing::debug!(farm = %farm.id, "Snapshot needed no repair");
    } else {
        tracing::warn!(farm = %farm.id, ?report, "Repaired snapshot");
    }
    report
}

fn repair_entities(farm: &mut Farm, config: &GameConfig, report: &mut RepairReport) {
    let started_at = farm.started_at;
    for plot in &mut farm.plots {
        let Some(entity) = plot.occupant.as_mut() else {
            continue;
        };

        if entity.acquired_at.is_zero() {
            entity.acquired_at = started_at;
        }
        let mut anchor_reset = false;
        if entity.cycle_anchor.is_zero() {
            entity.cycle_anchor = entity.acquired_at;
            anchor_reset = true;
        }
        if entity.banked_ready_at.is_zero() {
            entity.banked_ready_at = entity.cycle_anchor;
            anchor_reset = true;
        }
        if anchor_reset {
            report.anchors_reset += 1;
        }

        if !entity.is_valid_for_save() {
            match config.produce(entity.kind).filter(|p| p.is_valid()) {
                Some(produce) => {
                    entity.reattach_config(produce);
                    report.configs_reattached += 1;
                }
                None => {
                    tracing::warn!(
                        plot = %plot.id,
                        kind = %entity.kind,
                        "No usable configuration; clearing plot"
                    );
                    plot.clear();
                    report.plots_cleared += 1;
                    continue;
                }
            }
        }

        if !entity.invariants_hold() {
            entity.cycles_completed = entity.cycles_completed.min(entity.lifespan_cycles);
            entity.cycles_at_anchor = entity.cycles_at_anchor.min(entity.lifespan_cycles);
            entity.alive = entity.cycles_completed < entity.lifespan_cycles;
            report.counters_clamped += 1;
        }
    }
}

fn repair_workers(farm: &mut Farm, config: &GameConfig, report: &mut RepairReport) {
    let before = farm.tasks.len();
    farm.tasks
        .retain(|t| !matches!(t.status, TaskStatus::Completed | TaskStatus::Failed));
    report.tasks_dropped = before - farm.tasks.len();

    let service = config.worker_service_duration();
    for worker in &mut farm.workers {
        if worker.service_minutes <= Fixed::ZERO {
            worker.service_minutes = service;
            report.service_times_reset += 1;
        }

        let holds_task = worker.current_task.is_some_and(|id| {
            farm.tasks.iter().any(|t| {
                t.id == id && t.status == TaskStatus::InProgress && t.assigned_worker == Some(worker.id)
            })
        });
        let consistent = match worker.status {
            WorkerStatus::Idle => worker.current_task.is_none(),
            WorkerStatus::Working => holds_task,
        };
        if !consistent {
            worker.release();
            report.workers_released += 1;
        }
    }

    for task in &mut farm.tasks {
        if task.status != TaskStatus::InProgress {
            continue;
        }
        let held = task.assigned_worker.is_some_and(|id| {
            farm.workers
                .iter()
                .any(|w| w.id == id && w.current_task == Some(task.id))
        });
        if !held {
            task.status = TaskStatus::Pending;
            task.assigned_worker = None;
            report.tasks_requeued += 1;
        }
    }
}
