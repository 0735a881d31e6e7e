//! Property tests for readiness and offline reconciliation.

use farm_core::prelude::*;
use farm_test_utils::determinism::compare_partitions;
use farm_test_utils::determinism::strategies::{
    arb_crop, arb_cycle_minutes, arb_offset_millis, arb_partition, arb_produce_config, arb_tier,
};
use farm_test_utils::fixtures::{busy_farm, fixed, fixed_f, t0};
use proptest::prelude::*;

fn at_millis(offset: i64) -> Timestamp {
    Timestamp::from_millis(t0().as_millis() + offset)
}

fn tomato(config: &ProduceConfig) -> ResourceEntity {
    ResourceEntity::new(EntityId(1), ResourceKind::Crop(CropKind::Tomato), t0(), config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_ready_count_is_monotonic_and_capped(
        produce in arb_produce_config(),
        tier in arb_tier(),
        a in arb_offset_millis(10_000),
        b in arb_offset_millis(10_000),
    ) {
        let entity = tomato(&produce);
        let bonus = EquipmentBonus::from_tier(tier);
        let (early, late) = if a <= b { (a, b) } else { (b, a) };

        let first = entity.ready_count(at_millis(early), bonus);
        let second = entity.ready_count(at_millis(late), bonus);
        prop_assert!(first <= second);
        prop_assert!(second <= entity.remaining_cycles());
    }

    #[test]
    fn prop_split_collection_matches_single(
        produce in arb_produce_config(),
        tier in arb_tier(),
        (cuts, end) in arb_partition(5_000, 6),
    ) {
        let bonus = EquipmentBonus::from_tier(tier);
        let mut whole = tomato(&produce);
        let single = whole.collect(end, bonus);

        let mut split = tomato(&produce);
        let mut sorted = cuts;
        sorted.sort_unstable();
        let mut total = 0;
        for cut in sorted {
            total += split.collect(cut, bonus);
        }
        total += split.collect(end, bonus);

        prop_assert_eq!(total, single);
        prop_assert_eq!(split, whole);
    }

    #[test]
    fn prop_reconcile_is_partition_independent(
        tier in arb_tier(),
        plots in 1u32..8,
        (cuts, end) in arb_partition(3_000, 5),
    ) {
        let config = GameConfig::default();
        let mut farm = busy_farm(&config, plots);
        farm.inventory.equipment_tier = tier;
        let scheduler = Scheduler::new(&config);
        scheduler.auto_queue_harvest_tasks(&mut farm, t0().add_minutes(30));
        scheduler.tick(&mut farm, t0().add_minutes(30));
        farm.last_observed_at = t0().add_minutes(30);

        let cuts = cuts.into_iter().filter(|c| *c > farm.last_observed_at).collect();
        let result = compare_partitions(&config, &farm, cuts, end);
        prop_assert!(result.is_idempotent());
        prop_assert_eq!(result.whole.state_hash(), result.split.state_hash());
    }

    #[test]
    fn prop_planting_consumes_one_seed(crop in arb_crop(), offset in arb_offset_millis(600)) {
        let config = GameConfig::default();
        let mut farm = Farm::new("prop", &config, t0());
        farm.inventory.add_seeds(crop, 1);
        let seeds = farm.inventory.seed_count(crop);
        let plot = farm.plots[0].id;

        prop_assert!(Production::new(&config).plant_crop(&mut farm, plot, crop, t0()));
        prop_assert_eq!(farm.inventory.seed_count(crop), seeds - 1);

        let entity = farm.plots[0].occupant.as_ref().expect("planted");
        let wait = entity.time_until_next_ready(at_millis(offset), EquipmentBonus::NONE);
        prop_assert!(wait <= entity.cycle_minutes);
    }

    #[test]
    fn prop_upgrade_never_adds_ready_units_or_spoilage(
        produce in arb_produce_config(),
        tier in arb_tier(),
        raise in 1u32..4,
        a in arb_offset_millis(3_000),
        b in arb_offset_millis(3_000),
        window in 0i32..120,
    ) {
        let (old, new) = (EquipmentBonus::from_tier(tier), EquipmentBonus::from_tier(tier + raise));
        let window = fixed(window);
        let (collected_at, upgraded_at) = if a <= b { (a, b) } else { (b, a) };
        let upgrade = at_millis(upgraded_at);

        let mut entity = tomato(&produce);
        entity.collect(at_millis(collected_at), old);
        let ready_before = entity.ready_count(upgrade, old);
        let spoiled_before = entity.has_spoiled(upgrade, window, old);

        entity.rebase(upgrade, old, new);
        prop_assert!(entity.ready_count(upgrade, new) <= ready_before);
        prop_assert!(spoiled_before || !entity.has_spoiled(upgrade, window, new));
        prop_assert!(entity.invariants_hold());

        // Readiness stays monotonic across the rebase.
        let later = at_millis(upgraded_at + 60_000);
        prop_assert!(entity.ready_count(later, new) >= entity.ready_count(upgrade, new));
    }

    #[test]
    fn prop_effective_duration_never_exceeds_base(
        cycle in arb_cycle_minutes(),
        tier in arb_tier(),
    ) {
        let base = fixed_f(cycle);
        let d = EquipmentBonus::from_tier(tier).effective_duration(base);
        prop_assert!(d > Fixed::ZERO);
        prop_assert!(d <= base);
    }
}

#[test]
fn test_lifespan_cap_at_long_offline_gap() {
    let produce = ProduceConfig::new(10.0, 1, 40, 5, 30);
    let mut entity = tomato(&produce);
    assert_eq!(
        entity.time_until_next_ready(t0().add_minutes(5), EquipmentBonus::NONE),
        fixed(5)
    );
    let later = t0().add_minutes(500);
    assert_eq!(entity.ready_count(later, EquipmentBonus::NONE), 40);
    assert_eq!(entity.collect(later, EquipmentBonus::NONE), 40);
    assert!(!entity.alive);

    let years = t0().add_minutes(60 * 24 * 365 * 30);
    assert_eq!(entity.ready_count(years, EquipmentBonus::NONE), 0);
}
