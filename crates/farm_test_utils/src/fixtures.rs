//! Test fixtures and helpers.
//!
//! Pre-built configurations and farms for consistent testing.

use std::collections::BTreeMap;

use farm_core::config::{GameConfig, InitialResources, ProduceConfig};
use farm_core::farm::Farm;
use farm_core::kind::{AnimalKind, CropKind};
use farm_core::math::Timestamp;
use farm_core::production::Production;
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A fixed start instant shared by tests (2023-11-14T22:13:20Z).
#[must_use]
pub const fn t0() -> Timestamp {
    Timestamp::from_secs(1_700_000_000)
}

/// `t0()` plus whole minutes.
#[must_use]
pub const fn at_minute(minutes: i64) -> Timestamp {
    t0().add_minutes(minutes)
}

/// Default configuration with tomatoes replaced by the given numbers.
#[must_use]
pub fn config_with_tomato(cycle_minutes: f64, yield_per_cycle: u32, lifespan: u32, price: u32) -> GameConfig {
    let mut config = GameConfig::default();
    config.crops.insert(
        CropKind::Tomato,
        ProduceConfig::new(cycle_minutes, yield_per_cycle, lifespan, price, 30),
    );
    config
}

/// Builder for farms with precise starting resources.
#[derive(Debug, Clone)]
pub struct FarmBuilder {
    initial: InitialResources,
    config: GameConfig,
}

impl FarmBuilder {
    /// Start from the given configuration with an empty inventory.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            initial: InitialResources {
                gold: 0,
                plots: 0,
                seeds: BTreeMap::new(),
                livestock: BTreeMap::new(),
                workers: 0,
                equipment_tier: 1,
            },
            config,
        }
    }

    /// Starting gold.
    #[must_use]
    pub fn gold(mut self, gold: u64) -> Self {
        self.initial.gold = gold;
        self
    }

    /// Number of empty plots.
    #[must_use]
    pub fn plots(mut self, plots: u32) -> Self {
        self.initial.plots = plots;
        self
    }

    /// Number of workers.
    #[must_use]
    pub fn workers(mut self, workers: u32) -> Self {
        self.initial.workers = workers;
        self
    }

    /// Seeds of one crop.
    #[must_use]
    pub fn seeds(mut self, crop: CropKind, count: u32) -> Self {
        self.initial.seeds.insert(crop, count);
        self
    }

    /// Stored animals of one kind.
    #[must_use]
    pub fn livestock(mut self, animal: AnimalKind, count: u32) -> Self {
        self.initial.livestock.insert(animal, count);
        self
    }

    /// Equipment tier.
    #[must_use]
    pub fn tier(mut self, tier: u32) -> Self {
        self.initial.equipment_tier = tier;
        self
    }

    /// Build the farm at `now`, returning the configuration it was built from.
    #[must_use]
    pub fn build(mut self, now: Timestamp) -> (GameConfig, Farm) {
        self.config.initial = self.initial;
        let farm = Farm::new("fixture", &self.config, now);
        (self.config, farm)
    }
}

/// A farm with every plot planted or stocked at `t0()`.
///
/// Plots alternate tomato, blueberry, cow; one worker per three plots.
#[must_use]
pub fn busy_farm(config: &GameConfig, plots: u32) -> Farm {
    let mut config = config.clone();
    config.initial = InitialResources {
        gold: 1_000,
        plots,
        seeds: BTreeMap::from([(CropKind::Tomato, plots), (CropKind::Blueberry, plots)]),
        livestock: BTreeMap::from([(AnimalKind::DairyCow, plots)]),
        workers: plots.div_ceil(3).max(1),
        equipment_tier: 1,
    };
    let mut farm = Farm::new("busy", &config, t0());
    let production = Production::new(&config);
    let ids: Vec<_> = farm.plots.iter().map(|p| p.id).collect();
    for (i, plot) in ids.into_iter().enumerate() {
        let ok = match i % 3 {
            0 => production.plant_crop(&mut farm, plot, CropKind::Tomato, t0()),
            1 => production.plant_crop(&mut farm, plot, CropKind::Blueberry, t0()),
            _ => production.place_animal(&mut farm, plot, AnimalKind::DairyCow, t0()),
        };
        debug_assert!(ok, "fixture setup failed on plot {i}");
    }
    farm
}
