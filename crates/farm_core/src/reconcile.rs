//! Offline catch-up: brings a farm from its watermark up to `now`.
//!
//! Reconciliation auto-collects everything that became ready, clears dead
//! or spoiled occupants and releases workers whose service time elapsed.
//! Every step is a pure function of `now` and the persisted counters, so
//! reconciling to `t1` and then to `t2` leaves the farm in exactly the
//! state a single reconcile to `t2` would.
//!
//! Tasks held by released workers are discarded without applying their
//! effect; the production they targeted has already been collected.

use crate::config::GameConfig;
use crate::farm::Farm;
use crate::math::{Fixed, Timestamp};
use crate::production::credit_collected;

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Minutes between the old watermark and `now`.
    pub elapsed_minutes: Fixed,
    /// Crop units credited to the harvested ledger.
    pub crops_collected: u64,
    /// Goods credited to the produce ledger.
    pub produce_collected: u64,
    /// Plots emptied because the occupant died or spoiled.
    pub plots_cleared: usize,
    /// Workers returned to idle.
    pub workers_released: usize,
    /// Tasks dropped from the queue with their workers.
    pub tasks_discarded: usize,
}

impl ReconcileReport {
    /// Whether the pass changed anything besides the watermark.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.crops_collected == 0
            && self.produce_collected == 0
            && self.plots_cleared == 0
            && self.workers_released == 0
    }
}

/// Offline-time reconciliation service.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    config: &'a GameConfig,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over a resolved configuration.
    #[must_use]
    pub const fn new(config: &'a GameConfig) -> Self {
        Self { config }
    }

    /// Catch the farm up to `now`.
    ///
    /// Does nothing when `now` is not after the farm's watermark.
    pub fn reconcile(&self, farm: &mut Farm, now: Timestamp) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if now <= farm.last_observed_at {
            return report;
        }
        report.elapsed_minutes = now.minutes_since(farm.last_observed_at);

        let bonus = farm.inventory.equipment_bonus();
        let window = self.config.spoilage_window();

        let mut credits = Vec::new();
        for plot in &mut farm.plots {
            let Some(entity) = plot.occupant.as_mut() else {
                continue;
            };
            let amount = entity.collect(now, bonus);
            if amount > 0 {
                credits.push((entity.kind, amount));
            }
            if !entity.alive || entity.has_spoiled(now, window, bonus) {
                plot.clear();
                report.plots_cleared += 1;
            }
        }
        for (kind, amount) in credits {
            if kind.is_crop() {
                report.crops_collected += u64::from(amount);
            } else {
                report.produce_collected += u64::from(amount);
            }
            credit_collected(farm, kind, amount);
        }

        let mut discarded = Vec::new();
        for worker in farm.workers.iter_mut().filter(|w| w.is_task_due(now)) {
            if let Some(task) = worker.release() {
                discarded.push(task);
            }
            report.workers_released += 1;
        }
        for task in discarded {
            if farm.remove_task(task).is_some() {
                report.tasks_discarded += 1;
            }
        }

        farm.last_observed_at = now;

        tracing::info!(
            farm = %farm.id,
            elapsed_minutes = %report.elapsed_minutes,
            crops = report.crops_collected,
            produce = report.produce_collected,
            cleared = report.plots_cleared,
            workers_released = report.workers_released,
            tasks_discarded = report.tasks_discarded,
            "Reconciled offline time"
        );
        farm.debug_validate("reconcile");
        report
    }
}
