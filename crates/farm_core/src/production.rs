//! Production service: planting, placing, harvesting, collecting and
//! clearing plots, plus the farm upgrades that cost gold.
//!
//! Every mutating operation comes in two forms. `try_*` returns a
//! [`Result`] carrying the rejection reason; the plain form collapses a
//! rejection to `false` or `0` for callers that only need the outcome.
//! Neither form mutates the farm when it rejects.

use crate::config::GameConfig;
use crate::error::{FarmError, Result};
use crate::farm::Farm;
use crate::ids::PlotId;
use crate::kind::{AnimalKind, CropKind, ResourceKind};
use crate::math::Timestamp;
use crate::resource::ResourceEntity;

/// Log a rejected operation. Rejections are routine; anything else is a bug.
pub(crate) fn log_rejection(operation: &'static str, err: &FarmError) {
    if err.is_rejection() {
        tracing::debug!(operation, reason = %err, "Rejected");
    } else {
        tracing::warn!(operation, error = %err, "Operation failed");
    }
}

/// Credit a collected amount to the ledger matching the entity kind.
pub(crate) fn credit_collected(farm: &mut Farm, kind: ResourceKind, amount: u32) {
    match kind {
        ResourceKind::Crop(crop) => farm.inventory.add_harvest(crop, amount),
        ResourceKind::Animal(animal) => farm.inventory.add_produce(animal, amount),
    }
}

/// Operations that plant, harvest and clear plots.
#[derive(Debug, Clone, Copy)]
pub struct Production<'a> {
    config: &'a GameConfig,
}

impl<'a> Production<'a> {
    /// Create a production service over a resolved configuration.
    #[must_use]
    pub const fn new(config: &'a GameConfig) -> Self {
        Self { config }
    }

    /// The configuration this service reads.
    #[must_use]
    pub const fn config(&self) -> &'a GameConfig {
        self.config
    }

    fn require_empty(farm: &Farm, plot_id: PlotId) -> Result<()> {
        if farm.require_plot(plot_id)?.is_empty() {
            Ok(())
        } else {
            Err(FarmError::PlotOccupied(plot_id))
        }
    }

    fn new_entity(
        &self,
        farm: &mut Farm,
        kind: ResourceKind,
        now: Timestamp,
    ) -> Result<ResourceEntity> {
        let produce = self
            .config
            .produce(kind)
            .ok_or_else(|| FarmError::MissingConfig(kind.name().to_string()))?;
        if !produce.is_valid() {
            tracing::warn!(
                %kind,
                cycle_minutes = produce.cycle_minutes,
                yield_per_cycle = produce.yield_per_cycle,
                lifespan_cycles = produce.lifespan_cycles,
                "Malformed configuration; entity will never become ready"
            );
        }
        Ok(ResourceEntity::new(farm.ids.entity(), kind, now, produce))
    }

    /// Plant one seed of `crop` on an empty plot.
    pub fn try_plant_crop(
        &self,
        farm: &mut Farm,
        plot_id: PlotId,
        crop: CropKind,
        now: Timestamp,
    ) -> Result<()> {
        Self::require_empty(farm, plot_id)?;
        let kind = ResourceKind::Crop(crop);
        if self.config.crop(crop).is_none() {
            return Err(FarmError::MissingConfig(kind.name().to_string()));
        }
        farm.inventory.use_seed(crop)?;

        let entity = self.new_entity(farm, kind, now)?;
        let entity_id = entity.id;
        farm.plot_mut(plot_id)
            .ok_or(FarmError::PlotNotFound(plot_id))?
            .plant_crop(entity)?;

        tracing::debug!(plot = %plot_id, entity = %entity_id, %crop, "Planted");
        Ok(())
    }

    /// Plant one seed of `crop`. Returns `false` on rejection.
    pub fn plant_crop(&self, farm: &mut Farm, plot_id: PlotId, crop: CropKind, now: Timestamp) -> bool {
        self.try_plant_crop(farm, plot_id, crop, now)
            .map_err(|err| log_rejection("plant_crop", &err))
            .is_ok()
    }

    /// Move one stored animal onto an empty plot.
    pub fn try_place_animal(
        &self,
        farm: &mut Farm,
        plot_id: PlotId,
        animal: AnimalKind,
        now: Timestamp,
    ) -> Result<()> {
        Self::require_empty(farm, plot_id)?;
        let kind = ResourceKind::Animal(animal);
        if self.config.animal(animal).is_none() {
            return Err(FarmError::MissingConfig(kind.name().to_string()));
        }
        farm.inventory.take_livestock(animal)?;

        let entity = self.new_entity(farm, kind, now)?;
        let entity_id = entity.id;
        farm.plot_mut(plot_id)
            .ok_or(FarmError::PlotNotFound(plot_id))?
            .place_animal(entity)?;

        tracing::debug!(plot = %plot_id, entity = %entity_id, %animal, "Placed animal");
        Ok(())
    }

    /// Move one stored animal onto a plot. Returns `false` on rejection.
    pub fn place_animal(
        &self,
        farm: &mut Farm,
        plot_id: PlotId,
        animal: AnimalKind,
        now: Timestamp,
    ) -> bool {
        self.try_place_animal(farm, plot_id, animal, now)
            .map_err(|err| log_rejection("place_animal", &err))
            .is_ok()
    }

    /// Collect from the occupant, credit the ledger, and clear the plot
    /// if the occupant died.
    fn collect_from(
        farm: &mut Farm,
        plot_id: PlotId,
        now: Timestamp,
        expect_crop: bool,
    ) -> Result<u32> {
        let bonus = farm.inventory.equipment_bonus();
        let plot = farm
            .plot_mut(plot_id)
            .ok_or(FarmError::PlotNotFound(plot_id))?;
        let expected = if expect_crop { "crop" } else { "animal" };
        let entity = match plot.occupant.as_mut() {
            Some(entity) if entity.kind.is_crop() == expect_crop => entity,
            _ => {
                return Err(FarmError::WrongOccupant {
                    plot: plot_id,
                    expected,
                })
            }
        };

        let kind = entity.kind;
        let amount = entity.collect(now, bonus);
        let died = !entity.alive;
        if died {
            plot.clear();
        }
        if amount > 0 {
            credit_collected(farm, kind, amount);
        }

        tracing::debug!(plot = %plot_id, %kind, amount, died, "Collected from plot");
        Ok(amount)
    }

    /// Harvest every ready unit of the crop on a plot.
    pub fn try_harvest_crop(&self, farm: &mut Farm, plot_id: PlotId, now: Timestamp) -> Result<u32> {
        Self::collect_from(farm, plot_id, now, true)
    }

    /// Harvest a crop. Returns the amount harvested, 0 on rejection.
    pub fn harvest_crop(&self, farm: &mut Farm, plot_id: PlotId, now: Timestamp) -> u32 {
        self.try_harvest_crop(farm, plot_id, now)
            .unwrap_or_else(|err| {
                log_rejection("harvest_crop", &err);
                0
            })
    }

    /// Collect every ready unit of goods from the animal on a plot.
    pub fn try_collect_produce(
        &self,
        farm: &mut Farm,
        plot_id: PlotId,
        now: Timestamp,
    ) -> Result<u32> {
        Self::collect_from(farm, plot_id, now, false)
    }

    /// Collect animal goods. Returns the amount collected, 0 on rejection.
    pub fn collect_produce(&self, farm: &mut Farm, plot_id: PlotId, now: Timestamp) -> u32 {
        self.try_collect_produce(farm, plot_id, now)
            .unwrap_or_else(|err| {
                log_rejection("collect_produce", &err);
                0
            })
    }

    /// Clear every plot whose occupant is dead or has spoiled.
    ///
    /// Spoiled units are discarded without credit. Returns the number of
    /// plots cleared.
    pub fn sweep_spoilage(&self, farm: &mut Farm, now: Timestamp) -> usize {
        let bonus = farm.inventory.equipment_bonus();
        let window = self.config.spoilage_window();
        let mut cleared = 0;
        for plot in &mut farm.plots {
            if plot.needs_clearing(now, window, bonus) {
                if let Some(entity) = plot.clear() {
                    tracing::debug!(
                        plot = %plot.id,
                        entity = %entity.id,
                        kind = %entity.kind,
                        alive = entity.alive,
                        "Cleared plot"
                    );
                }
                cleared += 1;
            }
        }
        cleared
    }

    /// Number of plots whose occupant has at least one ready unit.
    #[must_use]
    pub fn ready_plot_count(&self, farm: &Farm, now: Timestamp) -> usize {
        let bonus = farm.inventory.equipment_bonus();
        farm.plots
            .iter()
            .filter_map(|p| p.occupant.as_ref())
            .filter(|e| e.ready_count(now, bonus) > 0)
            .count()
    }

    /// Buy the next equipment tier at `now`. Returns the new tier.
    ///
    /// Every occupant is rebased at `now`, so the faster cycle applies
    /// from the upgrade on and never to time already spent.
    pub fn try_upgrade_equipment(&self, farm: &mut Farm, now: Timestamp) -> Result<u32> {
        farm.inventory.spend(self.config.equipment_upgrade_cost)?;
        let old = farm.inventory.equipment_bonus();
        farm.inventory.upgrade_equipment();
        let new = farm.inventory.equipment_bonus();

        let mut rebased = 0;
        for entity in farm.plots.iter_mut().filter_map(|p| p.occupant.as_mut()) {
            entity.rebase(now, old, new);
            rebased += 1;
        }

        tracing::debug!(tier = farm.inventory.equipment_tier, rebased, "Upgraded equipment");
        Ok(farm.inventory.equipment_tier)
    }

    /// Buy the next equipment tier. Returns `false` if unaffordable.
    pub fn upgrade_equipment(&self, farm: &mut Farm, now: Timestamp) -> bool {
        self.try_upgrade_equipment(farm, now)
            .map_err(|err| log_rejection("upgrade_equipment", &err))
            .is_ok()
    }

    /// Buy an additional empty plot. Returns its id.
    pub fn try_buy_plot(&self, farm: &mut Farm) -> Result<PlotId> {
        farm.inventory.spend(self.config.plot_buy_cost)?;
        let id = farm.add_plot();
        tracing::debug!(plot = %id, plots = farm.plots.len(), "Bought plot");
        Ok(id)
    }

    /// Buy an additional plot. Returns `false` if unaffordable.
    pub fn buy_plot(&self, farm: &mut Farm) -> bool {
        self.try_buy_plot(farm)
            .map_err(|err| log_rejection("buy_plot", &err))
            .is_ok()
    }
}
