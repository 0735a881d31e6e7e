//! Growth, production and spoilage state machine for one resource entity.
//!
//! Crops and animals share this shape. An entity is `Growing` while
//! `cycles_completed < lifespan_cycles` and `Dead` afterwards; while
//! growing it may hold ready, uncollected units.
//!
//! Every query is a pure function of `(now, cycle_anchor,
//! cycles_at_anchor, cycles_completed, effective duration)`. Collection
//! only advances `cycles_completed`; the anchor never moves on collection,
//! so collecting in one call or in many smaller calls yields the same
//! totals.
//!
//! The anchor moves only when the equipment bonus changes. [`rebase`]
//! banks the cycles earned under the old duration in `cycles_at_anchor`
//! and restarts the schedule at the upgrade instant, carrying over the
//! fractional progress of the cycle in flight. A new bonus therefore only
//! affects time after the change.
//!
//! [`rebase`]: ResourceEntity::rebase
//!
//! # Example
//!
//! ```
//! use farm_core::config::ProduceConfig;
//! use farm_core::ids::EntityId;
//! use farm_core::kind::{CropKind, ResourceKind};
//! use farm_core::math::{EquipmentBonus, Timestamp};
//! use farm_core::resource::ResourceEntity;
//!
//! let t0 = Timestamp::from_secs(1_700_000_000);
//! let config = ProduceConfig::new(10.0, 1, 40, 5, 30);
//! let mut tomato =
//!     ResourceEntity::new(EntityId(1), ResourceKind::Crop(CropKind::Tomato), t0, &config);
//!
//! assert_eq!(tomato.ready_count(t0.add_minutes(30), EquipmentBonus::NONE), 3);
//! assert_eq!(tomato.collect(t0.add_minutes(30), EquipmentBonus::NONE), 3);
//! assert_eq!(tomato.ready_count(t0.add_minutes(30), EquipmentBonus::NONE), 0);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ProduceConfig;
use crate::ids::EntityId;
use crate::kind::ResourceKind;
use crate::math::{fixed_serde, EquipmentBonus, Fixed, Timestamp};

/// Coarse lifecycle state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifeState {
    /// Still producing; may hold ready units.
    Growing,
    /// Lifespan exhausted. Terminal.
    Dead,
}

/// A crop or animal occupying a plot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceEntity {
    /// Unique identifier.
    pub id: EntityId,
    /// Crop or animal discriminant.
    pub kind: ResourceKind,
    /// When the entity was planted or placed.
    pub acquired_at: Timestamp,
    /// Start of the cycle schedule. Cycle `cycles_at_anchor + n` ends at
    /// `cycle_anchor + n * effective_duration`.
    #[serde(default)]
    pub cycle_anchor: Timestamp,
    /// Cycles already earned when the schedule was last rebased.
    #[serde(default)]
    pub cycles_at_anchor: u32,
    /// When the oldest cycle banked by a rebase became ready. Only read
    /// while `cycles_completed < cycles_at_anchor`.
    #[serde(default)]
    pub banked_ready_at: Timestamp,
    /// Cycles already collected.
    pub cycles_completed: u32,
    /// False once the lifespan is exhausted.
    pub alive: bool,
    /// Units produced over the entity's life (statistics only).
    pub total_yield: u64,
    /// Base minutes per cycle, copied from configuration.
    #[serde(default, with = "fixed_serde")]
    pub cycle_minutes: Fixed,
    /// Units per cycle, copied from configuration.
    #[serde(default)]
    pub yield_per_cycle: u32,
    /// Cycles before death, copied from configuration.
    #[serde(default)]
    pub lifespan_cycles: u32,
    /// Sell price per unit, copied from configuration.
    #[serde(default)]
    pub unit_price: u32,
}

impl ResourceEntity {
    /// Create a freshly planted or placed entity.
    #[must_use]
    pub fn new(id: EntityId, kind: ResourceKind, now: Timestamp, config: &ProduceConfig) -> Self {
        Self {
            id,
            kind,
            acquired_at: now,
            cycle_anchor: now,
            cycles_at_anchor: 0,
            banked_ready_at: now,
            cycles_completed: 0,
            alive: config.lifespan_cycles > 0,
            total_yield: 0,
            cycle_minutes: config.cycle_duration(),
            yield_per_cycle: config.yield_per_cycle,
            lifespan_cycles: config.lifespan_cycles,
            unit_price: config.unit_price,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn life_state(&self) -> LifeState {
        if self.alive {
            LifeState::Growing
        } else {
            LifeState::Dead
        }
    }

    /// Cycles left before death.
    #[must_use]
    pub const fn remaining_cycles(&self) -> u32 {
        self.lifespan_cycles.saturating_sub(self.cycles_completed)
    }

    /// Cycle duration after the equipment bonus.
    #[must_use]
    pub fn effective_duration(&self, bonus: EquipmentBonus) -> Fixed {
        bonus.effective_duration(self.cycle_minutes)
    }

    /// Whole cycles earned by `now`, banked cycles included, capped at the
    /// lifespan.
    ///
    /// Returns `None` when the effective duration is not positive.
    fn cycles_elapsed(&self, now: Timestamp, d: Fixed) -> Option<u32> {
        if d <= Fixed::ZERO {
            return None;
        }
        let elapsed = now.minutes_since(self.cycle_anchor);
        let cycles = match elapsed.checked_div(d) {
            Some(ratio) => ratio
                .to_num::<i64>()
                .max(0)
                .saturating_add(i64::from(self.cycles_at_anchor)),
            // Ratio overflows the integer range; it is certainly past the lifespan.
            None => i64::from(self.lifespan_cycles),
        };
        let capped = cycles.min(i64::from(self.lifespan_cycles));
        Some(u32::try_from(capped).unwrap_or(self.lifespan_cycles))
    }

    /// Completed but uncollected cycles at `now`.
    ///
    /// Non-decreasing in `now` and capped at [`remaining_cycles`](Self::remaining_cycles).
    #[must_use]
    pub fn ready_count(&self, now: Timestamp, bonus: EquipmentBonus) -> u32 {
        if !self.alive {
            return 0;
        }
        self.cycles_elapsed(now, self.effective_duration(bonus))
            .map_or(0, |cycles| cycles.saturating_sub(self.cycles_completed))
    }

    /// Minutes until the next unit becomes ready.
    ///
    /// Zero if a unit is already ready, the entity is dead, or the
    /// configuration is malformed.
    #[must_use]
    pub fn time_until_next_ready(&self, now: Timestamp, bonus: EquipmentBonus) -> Fixed {
        if !self.alive || self.ready_count(now, bonus) > 0 {
            return Fixed::ZERO;
        }
        let d = self.effective_duration(bonus);
        if d <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        let elapsed = now.minutes_since(self.cycle_anchor);
        let into_cycle = elapsed.checked_rem(d).unwrap_or(Fixed::ZERO);
        d - into_cycle
    }

    /// Collect every ready unit.
    ///
    /// Returns the yield collected (`ready * yield_per_cycle`), or 0 when
    /// nothing is ready. Marks the entity dead once the lifespan is reached.
    pub fn collect(&mut self, now: Timestamp, bonus: EquipmentBonus) -> u32 {
        let ready = self.ready_count(now, bonus);
        if ready == 0 {
            return 0;
        }

        self.cycles_completed += ready;
        let amount = ready.saturating_mul(self.yield_per_cycle);
        self.total_yield = self.total_yield.saturating_add(u64::from(amount));

        if self.cycles_completed >= self.lifespan_cycles {
            self.alive = false;
        }

        tracing::trace!(
            entity = %self.id,
            kind = %self.kind,
            ready,
            amount,
            cycles_completed = self.cycles_completed,
            alive = self.alive,
            "Collected"
        );

        amount
    }

    /// Minutes since the oldest uncollected unit became ready.
    ///
    /// A unit banked by a rebase became ready at `banked_ready_at`; any
    /// later unit at `cycle_anchor + (cycles_completed + 1 -
    /// cycles_at_anchor) * d`. Returns `None` when nothing is ready.
    #[must_use]
    pub fn time_since_first_ready(&self, now: Timestamp, bonus: EquipmentBonus) -> Option<Fixed> {
        if self.ready_count(now, bonus) == 0 {
            return None;
        }
        if self.cycles_completed < self.cycles_at_anchor {
            return Some(now.minutes_since(self.banked_ready_at));
        }
        let d = self.effective_duration(bonus);
        let elapsed = now.minutes_since(self.cycle_anchor);
        let cycles_into_schedule = self.cycles_completed - self.cycles_at_anchor + 1;
        let first_ready = d.saturating_mul(Fixed::saturating_from_num(cycles_into_schedule));
        Some(elapsed.saturating_sub(first_ready).max(Fixed::ZERO))
    }

    /// Whether the oldest ready unit has waited longer than `window`.
    ///
    /// False for dead entities and when nothing is ready.
    #[must_use]
    pub fn has_spoiled(&self, now: Timestamp, window: Fixed, bonus: EquipmentBonus) -> bool {
        self.time_since_first_ready(now, bonus)
            .is_some_and(|waited| waited > window)
    }

    /// Minutes left before the oldest ready unit spoils.
    ///
    /// `None` when nothing is ready (spoilage does not apply).
    #[must_use]
    pub fn time_until_spoilage(
        &self,
        now: Timestamp,
        window: Fixed,
        bonus: EquipmentBonus,
    ) -> Option<Fixed> {
        self.time_since_first_ready(now, bonus)
            .map(|waited| window.saturating_sub(waited).max(Fixed::ZERO))
    }

    /// Restart the cycle schedule at `now` after the bonus changed from
    /// `old` to `new`.
    ///
    /// Cycles earned under `old` are banked, the oldest ready unit keeps
    /// the instant it became ready, and the cycle in flight keeps its
    /// fractional progress. Instants are rounded towards `now`, so right
    /// after the call the entity has exactly as many ready units as
    /// before and the oldest of them has not waited any longer.
    pub fn rebase(&mut self, now: Timestamp, old: EquipmentBonus, new: EquipmentBonus) {
        if !self.alive || old == new || now < self.cycle_anchor {
            return;
        }
        let d_old = self.effective_duration(old);
        let d_new = self.effective_duration(new);
        let Some(earned) = self.cycles_elapsed(now, d_old) else {
            return;
        };
        if d_new <= Fixed::ZERO {
            return;
        }

        if self.cycles_completed >= self.cycles_at_anchor {
            if let Some(waited) = self.time_since_first_ready(now, old) {
                self.banked_ready_at = now.rewind(waited);
            }
        }

        let in_flight = if earned >= self.lifespan_cycles {
            Fixed::ZERO
        } else {
            let elapsed = now.minutes_since(self.cycle_anchor);
            let progress = elapsed.checked_rem(d_old).unwrap_or(Fixed::ZERO);
            progress
                .checked_div(d_old)
                .and_then(|fraction| fraction.checked_mul(d_new))
                .unwrap_or(Fixed::ZERO)
        };

        self.cycles_at_anchor = earned;
        self.cycle_anchor = now.rewind(in_flight);

        tracing::trace!(
            entity = %self.id,
            cycles_at_anchor = earned,
            anchor = %self.cycle_anchor,
            "Rebased cycle schedule"
        );
    }

    /// Whether the entity carries usable configuration and should be persisted.
    #[must_use]
    pub fn is_valid_for_save(&self) -> bool {
        self.cycle_minutes > Fixed::ZERO && self.yield_per_cycle > 0 && self.lifespan_cycles > 0
    }

    /// Re-copy configuration-derived fields after a restore.
    ///
    /// Deserializers that drop the configuration snapshot leave these
    /// fields zeroed. Progress (`cycles_completed`) is kept but clamped to
    /// the restored lifespan, and `alive` is recomputed from it.
    pub fn reattach_config(&mut self, config: &ProduceConfig) {
        self.cycle_minutes = config.cycle_duration();
        self.yield_per_cycle = config.yield_per_cycle;
        self.lifespan_cycles = config.lifespan_cycles;
        self.unit_price = config.unit_price;
        self.cycles_completed = self.cycles_completed.min(self.lifespan_cycles);
        self.cycles_at_anchor = self.cycles_at_anchor.min(self.lifespan_cycles);
        self.alive = self.cycles_completed < self.lifespan_cycles;
    }

    /// Check the entity's invariants.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        self.cycles_completed <= self.lifespan_cycles
            && self.cycles_at_anchor <= self.lifespan_cycles
            && self.alive == (self.cycles_completed < self.lifespan_cycles)
    }
}
