//! Resource ledger: gold, seeds, harvested crops, produced goods,
//! stored livestock and the equipment tier.
//!
//! All counts are unsigned integers. Debits check availability first and
//! leave the ledger untouched on failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::InitialResources;
use crate::error::{FarmError, Result};
use crate::kind::{AnimalKind, CropKind};
use crate::math::EquipmentBonus;

/// A farm's resource ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Inventory {
    /// Currency balance.
    pub gold: u64,
    /// Seeds per crop kind.
    pub seeds: BTreeMap<CropKind, u32>,
    /// Harvested, unsold crop units.
    pub harvested: BTreeMap<CropKind, u32>,
    /// Produced, unsold goods per animal kind (e.g. milk).
    pub produce: BTreeMap<AnimalKind, u32>,
    /// Animals held in storage, not yet placed on a plot.
    pub livestock: BTreeMap<AnimalKind, u32>,
    /// Equipment tier, at least 1.
    pub equipment_tier: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            gold: 0,
            seeds: BTreeMap::new(),
            harvested: BTreeMap::new(),
            produce: BTreeMap::new(),
            livestock: BTreeMap::new(),
            equipment_tier: 1,
        }
    }
}

fn count<K: Ord>(map: &BTreeMap<K, u32>, key: &K) -> u32 {
    map.get(key).copied().unwrap_or(0)
}

fn credit<K: Ord>(map: &mut BTreeMap<K, u32>, key: K, amount: u32) {
    let entry = map.entry(key).or_insert(0);
    *entry = entry.saturating_add(amount);
}

fn debit<K: Ord + Copy + std::fmt::Display>(
    map: &mut BTreeMap<K, u32>,
    key: K,
    amount: u32,
    what: &str,
) -> Result<()> {
    let available = count(map, &key);
    if available < amount {
        return Err(FarmError::InsufficientStock {
            resource: format!("{key} {what}"),
            required: amount,
            available,
        });
    }
    map.insert(key, available - amount);
    Ok(())
}

impl Inventory {
    /// Create an inventory from the configured starting resources.
    #[must_use]
    pub fn from_initial(initial: &InitialResources) -> Self {
        Self {
            gold: initial.gold,
            seeds: initial.seeds.clone(),
            harvested: CropKind::ALL.iter().map(|&c| (c, 0)).collect(),
            produce: AnimalKind::ALL.iter().map(|&a| (a, 0)).collect(),
            livestock: initial.livestock.clone(),
            equipment_tier: initial.equipment_tier.max(1),
        }
    }

    /// Check if the farm can afford a cost.
    #[must_use]
    pub const fn can_afford(&self, cost: u64) -> bool {
        self.gold >= cost
    }

    /// Spend gold if available.
    pub fn spend(&mut self, cost: u64) -> Result<()> {
        if !self.can_afford(cost) {
            return Err(FarmError::InsufficientFunds {
                required: cost,
                available: self.gold,
            });
        }
        self.gold -= cost;
        Ok(())
    }

    /// Add gold.
    pub fn add_gold(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Seeds held for a crop.
    #[must_use]
    pub fn seed_count(&self, crop: CropKind) -> u32 {
        count(&self.seeds, &crop)
    }

    /// Harvested units held for a crop.
    #[must_use]
    pub fn harvested_count(&self, crop: CropKind) -> u32 {
        count(&self.harvested, &crop)
    }

    /// Produced goods held for an animal kind.
    #[must_use]
    pub fn produce_count(&self, animal: AnimalKind) -> u32 {
        count(&self.produce, &animal)
    }

    /// Stored animals of a kind.
    #[must_use]
    pub fn livestock_count(&self, animal: AnimalKind) -> u32 {
        count(&self.livestock, &animal)
    }

    /// Add seeds.
    pub fn add_seeds(&mut self, crop: CropKind, amount: u32) {
        credit(&mut self.seeds, crop, amount);
    }

    /// Consume one seed.
    pub fn use_seed(&mut self, crop: CropKind) -> Result<()> {
        debit(&mut self.seeds, crop, 1, "seeds")
    }

    /// Credit harvested crop units.
    pub fn add_harvest(&mut self, crop: CropKind, amount: u32) {
        credit(&mut self.harvested, crop, amount);
    }

    /// Remove harvested crop units (for sale).
    pub fn take_harvest(&mut self, crop: CropKind, amount: u32) -> Result<()> {
        debit(&mut self.harvested, crop, amount, "harvested")
    }

    /// Credit produced goods.
    pub fn add_produce(&mut self, animal: AnimalKind, amount: u32) {
        credit(&mut self.produce, animal, amount);
    }

    /// Remove produced goods (for sale).
    pub fn take_produce(&mut self, animal: AnimalKind, amount: u32) -> Result<()> {
        debit(&mut self.produce, animal, amount, animal.produce_name())
    }

    /// Add animals to storage.
    pub fn add_livestock(&mut self, animal: AnimalKind, amount: u32) {
        credit(&mut self.livestock, animal, amount);
    }

    /// Take one animal out of storage.
    pub fn take_livestock(&mut self, animal: AnimalKind) -> Result<()> {
        debit(&mut self.livestock, animal, 1, "in storage")
    }

    /// Speed-up granted by the current equipment tier.
    #[must_use]
    pub fn equipment_bonus(&self) -> EquipmentBonus {
        EquipmentBonus::from_tier(self.equipment_tier)
    }

    /// Raise the equipment tier by one.
    pub fn upgrade_equipment(&mut self) {
        self.equipment_tier = self.equipment_tier.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;

    #[test]
    fn test_from_initial() {
        let inventory = Inventory::from_initial(&InitialResources::default());
        assert_eq!(inventory.gold, 100);
        assert_eq!(inventory.seed_count(CropKind::Tomato), 10);
        assert_eq!(inventory.seed_count(CropKind::Strawberry), 0);
        assert_eq!(inventory.livestock_count(AnimalKind::DairyCow), 2);
        assert_eq!(inventory.harvested_count(CropKind::Blueberry), 0);
        assert_eq!(inventory.equipment_tier, 1);
    }

    #[test]
    fn test_spend() {
        let mut inventory = Inventory {
            gold: 100,
            ..Default::default()
        };
        assert!(inventory.can_afford(100));
        assert!(inventory.spend(60).is_ok());
        assert_eq!(inventory.gold, 40);

        let err = inventory.spend(50).unwrap_err();
        assert_eq!(
            err,
            FarmError::InsufficientFunds {
                required: 50,
                available: 40
            }
        );
        assert_eq!(inventory.gold, 40);
    }

    #[test]
    fn test_use_seed_without_stock() {
        let mut inventory = Inventory::default();
        let err = inventory.use_seed(CropKind::Tomato).unwrap_err();
        assert!(matches!(err, FarmError::InsufficientStock { required: 1, available: 0, .. }));
        assert!(err.to_string().contains("Tomato seeds"));
    }

    #[test]
    fn test_seed_roundtrip() {
        let mut inventory = Inventory::default();
        inventory.add_seeds(CropKind::Blueberry, 2);
        inventory.use_seed(CropKind::Blueberry).unwrap();
        assert_eq!(inventory.seed_count(CropKind::Blueberry), 1);
    }

    #[test]
    fn test_take_produce_partial_is_rejected() {
        let mut inventory = Inventory::default();
        inventory.add_produce(AnimalKind::DairyCow, 3);
        assert!(inventory.take_produce(AnimalKind::DairyCow, 4).is_err());
        assert_eq!(inventory.produce_count(AnimalKind::DairyCow), 3);
        inventory.take_produce(AnimalKind::DairyCow, 3).unwrap();
        assert_eq!(inventory.produce_count(AnimalKind::DairyCow), 0);
    }

    #[test]
    fn test_equipment_bonus() {
        let mut inventory = Inventory::default();
        assert_eq!(inventory.equipment_bonus(), EquipmentBonus::NONE);
        inventory.upgrade_equipment();
        inventory.upgrade_equipment();
        let bonus = inventory.equipment_bonus().fraction();
        assert!((bonus - Fixed::from_num(0.2)).abs() < Fixed::from_num(0.0001));
    }
}
