//! A single land slot holding at most one resource entity.

use serde::{Deserialize, Serialize};

use crate::error::{FarmError, Result};
use crate::ids::PlotId;
use crate::math::{EquipmentBonus, Fixed, Timestamp};
use crate::resource::ResourceEntity;

/// What currently occupies a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotStatus {
    /// Nothing planted or placed.
    Empty,
    /// A crop is growing.
    HasPlant,
    /// An animal is placed.
    HasAnimal,
}

/// A land slot.
///
/// The status is derived from the occupant, so a plot can never report
/// `HasPlant` while holding an animal or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plot {
    /// Plot identifier.
    pub id: PlotId,
    /// The crop or animal on this plot.
    pub occupant: Option<ResourceEntity>,
}

impl Plot {
    /// Create an empty plot.
    #[must_use]
    pub const fn new(id: PlotId) -> Self {
        Self { id, occupant: None }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> PlotStatus {
        match &self.occupant {
            None => PlotStatus::Empty,
            Some(entity) if entity.kind.is_crop() => PlotStatus::HasPlant,
            Some(_) => PlotStatus::HasAnimal,
        }
    }

    /// Whether nothing occupies the plot.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    fn occupy(&mut self, entity: ResourceEntity) -> Result<()> {
        if self.occupant.is_some() {
            return Err(FarmError::PlotOccupied(self.id));
        }
        self.occupant = Some(entity);
        Ok(())
    }

    /// Plant a crop entity. Fails unless the plot is empty.
    pub fn plant_crop(&mut self, entity: ResourceEntity) -> Result<()> {
        if !entity.kind.is_crop() {
            return Err(FarmError::InvalidState(format!(
                "{} is not a crop and cannot be planted",
                entity.kind
            )));
        }
        self.occupy(entity)
    }

    /// Place an animal entity. Fails unless the plot is empty.
    pub fn place_animal(&mut self, entity: ResourceEntity) -> Result<()> {
        if !entity.kind.is_animal() {
            return Err(FarmError::InvalidState(format!(
                "{} is not an animal and cannot be placed",
                entity.kind
            )));
        }
        self.occupy(entity)
    }

    /// Empty the plot, returning whatever was on it.
    pub fn clear(&mut self) -> Option<ResourceEntity> {
        self.occupant.take()
    }

    /// Whether the occupant is dead or has spoiled.
    #[must_use]
    pub fn needs_clearing(&self, now: Timestamp, window: Fixed, bonus: EquipmentBonus) -> bool {
        self.occupant
            .as_ref()
            .is_some_and(|entity| !entity.alive || entity.has_spoiled(now, window, bonus))
    }
}
