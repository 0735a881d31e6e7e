//! Resolved game configuration.
//!
//! The core never reads configuration files. Hosts hand it a
//! [`GameConfig`] value, either built in code or deserialized from RON
//! with [`GameConfig::from_ron_str`].
//!
//! # Example RON
//!
//! ```ron
//! GameConfig(
//!     crops: {
//!         Tomato: (cycle_minutes: 10.0, yield_per_cycle: 1, lifespan_cycles: 40,
//!                  unit_price: 5, purchase_price: Some(30)),
//!     },
//!     animals: {
//!         DairyCow: (cycle_minutes: 30.0, yield_per_cycle: 1, lifespan_cycles: 100,
//!                    unit_price: 15, purchase_price: Some(100)),
//!     },
//!     spoilage_window_minutes: 60.0,
//!     gold_target: 1000000,
//! )
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FarmError, Result};
use crate::kind::{AnimalKind, CropKind, ResourceKind};
use crate::math::{minutes_from_f64, Fixed};

/// Per-kind production numbers shared by crops and animals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProduceConfig {
    /// Base minutes per growth/production cycle.
    pub cycle_minutes: f64,
    /// Units yielded by each completed cycle.
    pub yield_per_cycle: u32,
    /// Number of cycles before the entity dies.
    pub lifespan_cycles: u32,
    /// Gold received per sold unit of yield.
    pub unit_price: u32,
    /// Price of one seed or one animal. `None` if not sold individually.
    #[serde(default)]
    pub purchase_price: Option<u64>,
    /// Bulk offer, for kinds sold by the bundle.
    #[serde(default)]
    pub bundle: Option<BundleOffer>,
}

impl ProduceConfig {
    /// Create a produce configuration sold individually.
    #[must_use]
    pub fn new(
        cycle_minutes: f64,
        yield_per_cycle: u32,
        lifespan_cycles: u32,
        unit_price: u32,
        purchase_price: u64,
    ) -> Self {
        Self {
            cycle_minutes,
            yield_per_cycle,
            lifespan_cycles,
            unit_price,
            purchase_price: Some(purchase_price),
            bundle: None,
        }
    }

    /// Sell this kind only in bundles of `size` for `price`.
    #[must_use]
    pub fn bundle_only(mut self, size: u32, price: u64) -> Self {
        self.purchase_price = None;
        self.bundle = Some(BundleOffer { size, price });
        self
    }

    /// Cycle duration as fixed-point minutes (zero if malformed).
    #[must_use]
    pub fn cycle_duration(&self) -> Fixed {
        minutes_from_f64(self.cycle_minutes)
    }

    /// Whether the numbers describe a usable entity.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.cycle_duration() > Fixed::ZERO && self.yield_per_cycle > 0 && self.lifespan_cycles > 0
    }
}

/// A fixed-size bulk offer in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleOffer {
    /// Units per bundle.
    pub size: u32,
    /// Gold per bundle.
    pub price: u64,
}

/// Resources a new farm starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialResources {
    /// Starting gold.
    pub gold: u64,
    /// Number of empty plots.
    pub plots: u32,
    /// Seeds per crop kind.
    pub seeds: BTreeMap<CropKind, u32>,
    /// Animals held in storage per kind.
    pub livestock: BTreeMap<AnimalKind, u32>,
    /// Number of workers.
    pub workers: u32,
    /// Starting equipment tier.
    pub equipment_tier: u32,
}

impl Default for InitialResources {
    fn default() -> Self {
        Self {
            gold: 100,
            plots: 3,
            seeds: BTreeMap::from([
                (CropKind::Tomato, 10),
                (CropKind::Blueberry, 10),
                (CropKind::Strawberry, 0),
            ]),
            livestock: BTreeMap::from([(AnimalKind::DairyCow, 2)]),
            workers: 1,
            equipment_tier: 1,
        }
    }
}

/// Complete resolved configuration for one farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Crop numbers keyed by kind.
    pub crops: BTreeMap<CropKind, ProduceConfig>,
    /// Animal numbers keyed by kind.
    pub animals: BTreeMap<AnimalKind, ProduceConfig>,
    /// Minutes a worker spends on one task.
    pub worker_service_minutes: f64,
    /// Gold to hire one worker.
    pub worker_hire_cost: u64,
    /// Gold per equipment tier upgrade.
    pub equipment_upgrade_cost: u64,
    /// Gold per additional plot.
    pub plot_buy_cost: u64,
    /// Grace period after a unit becomes ready before the occupant spoils.
    pub spoilage_window_minutes: f64,
    /// Gold needed to win.
    pub gold_target: u64,
    /// Starting resources for [`Farm::new`](crate::farm::Farm::new).
    pub initial: InitialResources,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            crops: BTreeMap::from([
                (CropKind::Tomato, ProduceConfig::new(10.0, 1, 40, 5, 30)),
                (CropKind::Blueberry, ProduceConfig::new(15.0, 1, 40, 8, 50)),
                (
                    CropKind::Strawberry,
                    ProduceConfig::new(20.0, 1, 20, 12, 0).bundle_only(10, 300),
                ),
            ]),
            animals: BTreeMap::from([(
                AnimalKind::DairyCow,
                ProduceConfig::new(30.0, 1, 100, 15, 100),
            )]),
            worker_service_minutes: 2.0,
            worker_hire_cost: 500,
            equipment_upgrade_cost: 500,
            plot_buy_cost: 500,
            spoilage_window_minutes: 60.0,
            gold_target: 1_000_000,
            initial: InitialResources::default(),
        }
    }
}

impl GameConfig {
    /// Deserialize a configuration from RON text.
    ///
    /// Missing fields fall back to [`GameConfig::default`].
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| FarmError::ConfigParse(e.to_string()))
    }

    /// Serialize the configuration to pretty RON text.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| FarmError::ConfigParse(e.to_string()))
    }

    /// Look up the numbers for a crop.
    #[must_use]
    pub fn crop(&self, crop: CropKind) -> Option<&ProduceConfig> {
        self.crops.get(&crop)
    }

    /// Look up the numbers for an animal.
    #[must_use]
    pub fn animal(&self, animal: AnimalKind) -> Option<&ProduceConfig> {
        self.animals.get(&animal)
    }

    /// Look up the numbers for any resource kind.
    #[must_use]
    pub fn produce(&self, kind: ResourceKind) -> Option<&ProduceConfig> {
        match kind {
            ResourceKind::Crop(crop) => self.crop(crop),
            ResourceKind::Animal(animal) => self.animal(animal),
        }
    }

    /// Spoilage window as fixed-point minutes.
    #[must_use]
    pub fn spoilage_window(&self) -> Fixed {
        minutes_from_f64(self.spoilage_window_minutes)
    }

    /// Worker service time as fixed-point minutes.
    #[must_use]
    pub fn worker_service_duration(&self) -> Fixed {
        minutes_from_f64(self.worker_service_minutes)
    }

    /// Check the configuration for defects.
    ///
    /// Defects never stop the simulation: entities built from a bad entry
    /// simply never become ready. Returns a list of human-readable issues.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let entries = self
            .crops
            .iter()
            .map(|(k, c)| (ResourceKind::Crop(*k), c))
            .chain(self.animals.iter().map(|(k, c)| (ResourceKind::Animal(*k), c)));

        for (kind, produce) in entries {
            if produce.cycle_duration() <= Fixed::ZERO {
                issues.push(format!(
                    "{kind}: cycle_minutes must be positive, got {}",
                    produce.cycle_minutes
                ));
            }
            if produce.yield_per_cycle == 0 {
                issues.push(format!("{kind}: yield_per_cycle is zero"));
            }
            if produce.lifespan_cycles == 0 {
                issues.push(format!("{kind}: lifespan_cycles is zero"));
            }
            if produce.purchase_price.is_none() && produce.bundle.is_none() {
                issues.push(format!("{kind}: not purchasable in the shop"));
            }
        }

        for crop in CropKind::ALL {
            if !self.crops.contains_key(&crop) {
                issues.push(format!("{crop}: missing crop configuration"));
            }
        }
        for animal in AnimalKind::ALL {
            if !self.animals.contains_key(&animal) {
                issues.push(format!("{animal}: missing animal configuration"));
            }
        }

        if self.worker_service_duration() <= Fixed::ZERO {
            issues.push(format!(
                "worker_service_minutes must be positive, got {}",
                self.worker_service_minutes
            ));
        }
        if self.spoilage_window_minutes.is_nan() || self.spoilage_window_minutes < 0.0 {
            issues.push(format!(
                "spoilage_window_minutes must not be negative, got {}",
                self.spoilage_window_minutes
            ));
        }
        if self.initial.equipment_tier == 0 {
            issues.push("initial equipment_tier must be at least 1".to_string());
        }

        issues
    }
}
