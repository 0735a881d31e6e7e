//! Shop service: buying seeds and livestock, selling harvests and goods.

use crate::config::{GameConfig, ProduceConfig};
use crate::error::{FarmError, Result};
use crate::farm::Farm;
use crate::kind::{AnimalKind, CropKind};
use crate::production::log_rejection;

/// Gold received for everything sold by [`Shop::sell_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleReport {
    /// Gold earned from harvested crops.
    pub crops: u64,
    /// Gold earned from animal goods.
    pub produce: u64,
}

impl SaleReport {
    /// Total gold earned.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.crops + self.produce
    }
}

fn unit_price(produce: Option<&ProduceConfig>, name: &str) -> Result<u64> {
    produce
        .map(|p| u64::from(p.unit_price))
        .ok_or_else(|| FarmError::MissingConfig(name.to_string()))
}

/// Buy and sell against the configured prices.
#[derive(Debug, Clone, Copy)]
pub struct Shop<'a> {
    config: &'a GameConfig,
}

impl<'a> Shop<'a> {
    /// Create a shop over a resolved configuration.
    #[must_use]
    pub const fn new(config: &'a GameConfig) -> Self {
        Self { config }
    }

    /// Buy `quantity` individually priced seeds.
    pub fn try_buy_seeds(&self, farm: &mut Farm, crop: CropKind, quantity: u32) -> Result<u64> {
        let produce = self
            .config
            .crop(crop)
            .ok_or_else(|| FarmError::MissingConfig(crop.name().to_string()))?;
        let price = produce
            .purchase_price
            .ok_or_else(|| FarmError::NotForSale(format!("{crop} seeds are sold in bundles only")))?;
        let cost = price.saturating_mul(u64::from(quantity));

        farm.inventory.spend(cost)?;
        farm.inventory.add_seeds(crop, quantity);
        tracing::debug!(%crop, quantity, cost, "Bought seeds");
        Ok(cost)
    }

    /// Buy seeds. Returns `false` on rejection.
    pub fn buy_seeds(&self, farm: &mut Farm, crop: CropKind, quantity: u32) -> bool {
        self.try_buy_seeds(farm, crop, quantity)
            .map_err(|err| log_rejection("buy_seeds", &err))
            .is_ok()
    }

    /// Buy one bulk seed bundle. Returns the number of seeds added.
    pub fn try_buy_seed_bundle(&self, farm: &mut Farm, crop: CropKind) -> Result<u32> {
        let produce = self
            .config
            .crop(crop)
            .ok_or_else(|| FarmError::MissingConfig(crop.name().to_string()))?;
        let bundle = produce
            .bundle
            .ok_or_else(|| FarmError::NotForSale(format!("{crop} seeds are not sold in bundles")))?;

        farm.inventory.spend(bundle.price)?;
        farm.inventory.add_seeds(crop, bundle.size);
        tracing::debug!(%crop, size = bundle.size, cost = bundle.price, "Bought seed bundle");
        Ok(bundle.size)
    }

    /// Buy one seed bundle. Returns `false` on rejection.
    pub fn buy_seed_bundle(&self, farm: &mut Farm, crop: CropKind) -> bool {
        self.try_buy_seed_bundle(farm, crop)
            .map_err(|err| log_rejection("buy_seed_bundle", &err))
            .is_ok()
    }

    /// Buy one animal into storage.
    pub fn try_buy_animal(&self, farm: &mut Farm, animal: AnimalKind) -> Result<u64> {
        let produce = self
            .config
            .animal(animal)
            .ok_or_else(|| FarmError::MissingConfig(animal.name().to_string()))?;
        let price = produce
            .purchase_price
            .ok_or_else(|| FarmError::NotForSale(animal.name().to_string()))?;

        farm.inventory.spend(price)?;
        farm.inventory.add_livestock(animal, 1);
        tracing::debug!(%animal, cost = price, "Bought animal");
        Ok(price)
    }

    /// Buy one animal. Returns `false` on rejection.
    pub fn buy_animal(&self, farm: &mut Farm, animal: AnimalKind) -> bool {
        self.try_buy_animal(farm, animal)
            .map_err(|err| log_rejection("buy_animal", &err))
            .is_ok()
    }

    /// Sell harvested crop units. Returns the gold earned.
    pub fn try_sell_harvest(&self, farm: &mut Farm, crop: CropKind, quantity: u32) -> Result<u64> {
        let price = unit_price(self.config.crop(crop), crop.name())?;
        farm.inventory.take_harvest(crop, quantity)?;
        let earned = price.saturating_mul(u64::from(quantity));
        farm.inventory.add_gold(earned);
        tracing::debug!(%crop, quantity, earned, "Sold harvest");
        Ok(earned)
    }

    /// Sell harvested crop units. Returns `false` on rejection.
    pub fn sell_harvest(&self, farm: &mut Farm, crop: CropKind, quantity: u32) -> bool {
        self.try_sell_harvest(farm, crop, quantity)
            .map_err(|err| log_rejection("sell_harvest", &err))
            .is_ok()
    }

    /// Sell animal goods. Returns the gold earned.
    pub fn try_sell_produce(
        &self,
        farm: &mut Farm,
        animal: AnimalKind,
        quantity: u32,
    ) -> Result<u64> {
        let price = unit_price(self.config.animal(animal), animal.name())?;
        farm.inventory.take_produce(animal, quantity)?;
        let earned = price.saturating_mul(u64::from(quantity));
        farm.inventory.add_gold(earned);
        tracing::debug!(%animal, goods = animal.produce_name(), quantity, earned, "Sold goods");
        Ok(earned)
    }

    /// Sell animal goods. Returns `false` on rejection.
    pub fn sell_produce(&self, farm: &mut Farm, animal: AnimalKind, quantity: u32) -> bool {
        self.try_sell_produce(farm, animal, quantity)
            .map_err(|err| log_rejection("sell_produce", &err))
            .is_ok()
    }

    /// Sell every harvested crop and every unit of animal goods.
    ///
    /// Kinds without configuration are left in the inventory.
    pub fn sell_all(&self, farm: &mut Farm) -> SaleReport {
        let mut report = SaleReport::default();

        let crops: Vec<(CropKind, u32)> = farm
            .inventory
            .harvested
            .iter()
            .filter(|(_, &n)| n > 0)
            .map(|(&k, &n)| (k, n))
            .collect();
        for (crop, quantity) in crops {
            if let Ok(earned) = self.try_sell_harvest(farm, crop, quantity) {
                report.crops += earned;
            }
        }

        let goods: Vec<(AnimalKind, u32)> = farm
            .inventory
            .produce
            .iter()
            .filter(|(_, &n)| n > 0)
            .map(|(&k, &n)| (k, n))
            .collect();
        for (animal, quantity) in goods {
            if let Ok(earned) = self.try_sell_produce(farm, animal, quantity) {
                report.produce += earned;
            }
        }

        tracing::debug!(crops = report.crops, produce = report.produce, "Sold everything");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Timestamp;

    fn setup() -> (GameConfig, Farm) {
        let config = GameConfig::default();
        let farm = Farm::new("shop", &config, Timestamp::from_secs(1_700_000_000));
        (config, farm)
    }

    #[test]
    fn test_buy_seeds() {
        let (config, mut farm) = setup();
        let shop = Shop::new(&config);
        assert_eq!(shop.try_buy_seeds(&mut farm, CropKind::Tomato, 3), Ok(90));
        assert_eq!(farm.inventory.gold, 10);
        assert_eq!(farm.inventory.seed_count(CropKind::Tomato), 13);
        assert!(!shop.buy_seeds(&mut farm, CropKind::Tomato, 1));
        assert_eq!(farm.inventory.seed_count(CropKind::Tomato), 13);
    }

    #[test]
    fn test_strawberries_only_in_bundles() {
        let (config, mut farm) = setup();
        let shop = Shop::new(&config);
        farm.inventory.gold = 1_000;

        assert!(matches!(
            shop.try_buy_seeds(&mut farm, CropKind::Strawberry, 1),
            Err(FarmError::NotForSale(_))
        ));
        assert!(matches!(
            shop.try_buy_seed_bundle(&mut farm, CropKind::Tomato),
            Err(FarmError::NotForSale(_))
        ));
        assert_eq!(shop.try_buy_seed_bundle(&mut farm, CropKind::Strawberry), Ok(10));
        assert_eq!(farm.inventory.seed_count(CropKind::Strawberry), 10);
        assert_eq!(farm.inventory.gold, 700);
    }

    #[test]
    fn test_buy_animal() {
        let (config, mut farm) = setup();
        let shop = Shop::new(&config);
        assert!(shop.buy_animal(&mut farm, AnimalKind::DairyCow));
        assert_eq!(farm.inventory.livestock_count(AnimalKind::DairyCow), 3);
        assert_eq!(farm.inventory.gold, 0);
        assert!(!shop.buy_animal(&mut farm, AnimalKind::DairyCow));
    }

    #[test]
    fn test_sell_harvest_and_produce() {
        let (config, mut farm) = setup();
        let shop = Shop::new(&config);
        farm.inventory.add_harvest(CropKind::Blueberry, 4);
        farm.inventory.add_produce(AnimalKind::DairyCow, 2);

        assert!(!shop.sell_harvest(&mut farm, CropKind::Blueberry, 5));
        assert!(shop.sell_harvest(&mut farm, CropKind::Blueberry, 4));
        assert_eq!(farm.inventory.gold, 132);
        assert_eq!(shop.try_sell_produce(&mut farm, AnimalKind::DairyCow, 2), Ok(30));
        assert_eq!(farm.inventory.gold, 162);
    }

    #[test]
    fn test_sell_all() {
        let (config, mut farm) = setup();
        let shop = Shop::new(&config);
        farm.inventory.add_harvest(CropKind::Tomato, 10);
        farm.inventory.add_harvest(CropKind::Strawberry, 1);
        farm.inventory.add_produce(AnimalKind::DairyCow, 3);

        let report = shop.sell_all(&mut farm);
        assert_eq!(report.crops, 62);
        assert_eq!(report.produce, 45);
        assert_eq!(report.total(), 107);
        assert_eq!(farm.inventory.gold, 207);
        assert_eq!(farm.inventory.harvested_count(CropKind::Tomato), 0);
        assert_eq!(shop.sell_all(&mut farm), SaleReport::default());
    }
}
