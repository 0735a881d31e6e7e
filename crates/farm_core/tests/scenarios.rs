//! End-to-end farm scenarios.

use farm_core::prelude::*;
use farm_test_utils::fixtures::{at_minute, config_with_tomato, t0, FarmBuilder};

#[test]
fn test_single_plot_lifecycle() {
    let (config, mut farm) = FarmBuilder::new(config_with_tomato(10.0, 1, 3, 5))
        .plots(1)
        .seeds(CropKind::Tomato, 1)
        .build(t0());
    let production = Production::new(&config);
    let plot = farm.plots[0].id;

    assert!(production.plant_crop(&mut farm, plot, CropKind::Tomato, t0()));
    assert_eq!(production.harvest_crop(&mut farm, plot, at_minute(5)), 0);

    assert_eq!(production.harvest_crop(&mut farm, plot, at_minute(25)), 2);
    let entity = farm.plots[0].occupant.as_ref().expect("crop still growing");
    assert_eq!(entity.cycles_completed, 2);
    assert!(entity.alive);

    assert_eq!(production.harvest_crop(&mut farm, plot, at_minute(35)), 1);
    assert_eq!(farm.plots[0].status(), PlotStatus::Empty);
    assert_eq!(farm.inventory.harvested_count(CropKind::Tomato), 3);
    assert_eq!(farm.inventory.seed_count(CropKind::Tomato), 0);
}

#[test]
fn test_plot_exclusivity() {
    let (config, mut farm) = FarmBuilder::new(GameConfig::default())
        .plots(1)
        .seeds(CropKind::Tomato, 2)
        .livestock(AnimalKind::DairyCow, 1)
        .build(t0());
    let production = Production::new(&config);
    let plot = farm.plots[0].id;

    assert!(production.plant_crop(&mut farm, plot, CropKind::Tomato, t0()));
    let occupant = farm.plots[0].occupant.clone();

    assert!(!production.plant_crop(&mut farm, plot, CropKind::Tomato, at_minute(1)));
    assert!(!production.place_animal(&mut farm, plot, AnimalKind::DairyCow, at_minute(1)));
    assert_eq!(farm.plots[0].occupant, occupant);
    assert_eq!(farm.inventory.seed_count(CropKind::Tomato), 1);
    assert_eq!(farm.inventory.livestock_count(AnimalKind::DairyCow), 1);
}

#[test]
fn test_scheduler_fairness() {
    let (config, mut farm) = FarmBuilder::new(GameConfig::default())
        .plots(3)
        .workers(2)
        .build(t0());
    let scheduler = Scheduler::new(&config);
    let plots: Vec<PlotId> = farm.plots.iter().map(|p| p.id).collect();
    let tasks: Vec<TaskId> = plots
        .iter()
        .map(|&p| scheduler.queue_harvest_task(&mut farm, p, t0()).expect("plot exists"))
        .collect();

    let report = scheduler.tick(&mut farm, t0());
    let assigned: Vec<TaskId> = report.assigned.iter().map(|&(task, _)| task).collect();
    assert_eq!(assigned, &tasks[..2]);
    assert_eq!(farm.task(tasks[2]).map(|t| t.status), Some(TaskStatus::Pending));

    // No idle worker: a second tick at the same instant assigns nothing.
    assert!(scheduler.tick(&mut farm, t0()).assigned.is_empty());
}

#[test]
fn test_worker_session_with_auto_queue() {
    let (config, mut farm) = FarmBuilder::new(config_with_tomato(10.0, 2, 40, 5))
        .plots(2)
        .workers(1)
        .seeds(CropKind::Tomato, 2)
        .build(t0());
    let production = Production::new(&config);
    let scheduler = Scheduler::new(&config);
    for plot in farm.plots.iter().map(|p| p.id).collect::<Vec<_>>() {
        production.plant_crop(&mut farm, plot, CropKind::Tomato, t0());
    }

    let mut completed = 0;
    for minute in 0..=20 {
        let now = at_minute(minute);
        scheduler.auto_queue_harvest_tasks(&mut farm, now);
        completed += scheduler.tick(&mut farm, now).completed.len();
    }

    // Both plots ready at +10; one worker serves them back to back.
    assert_eq!(completed, 2);
    assert_eq!(farm.inventory.harvested_count(CropKind::Tomato), 4);
    assert!(farm.check_invariants().is_ok());
}

#[test]
fn test_upgrade_speeds_up_production() {
    let (config, mut farm) = FarmBuilder::new(config_with_tomato(10.0, 1, 40, 5))
        .plots(1)
        .gold(500)
        .seeds(CropKind::Tomato, 1)
        .build(t0());
    let production = Production::new(&config);
    let plot = farm.plots[0].id;
    production.plant_crop(&mut farm, plot, CropKind::Tomato, t0());

    assert!(production.upgrade_equipment(&mut farm, t0()));
    // 10 / 1.1 minutes per cycle from planting on.
    assert_eq!(production.harvest_crop(&mut farm, plot, at_minute(28)), 3);
}

#[test]
fn test_upgrade_does_not_grant_unearned_cycles() {
    let (config, mut farm) = FarmBuilder::new(GameConfig::default())
        .plots(1)
        .gold(1_000)
        .seeds(CropKind::Tomato, 1)
        .build(t0());
    let production = Production::new(&config);
    let plot = farm.plots[0].id;
    production.plant_crop(&mut farm, plot, CropKind::Tomato, t0());

    assert_eq!(production.harvest_crop(&mut farm, plot, at_minute(200)), 20);
    assert!(production.upgrade_equipment(&mut farm, at_minute(200)));
    assert!(production.upgrade_equipment(&mut farm, at_minute(200)));
    assert_eq!(farm.inventory.equipment_tier, 3);

    assert_eq!(production.harvest_crop(&mut farm, plot, at_minute(201)), 0);
    // First cycle at the faster rate ends at +208.33.
    assert_eq!(production.harvest_crop(&mut farm, plot, at_minute(209)), 1);
}

#[test]
fn test_upgrade_never_triggers_spoilage() {
    let (config, mut farm) = FarmBuilder::new(GameConfig::default())
        .plots(1)
        .gold(2_000)
        .seeds(CropKind::Tomato, 1)
        .build(t0());
    let production = Production::new(&config);
    let plot = farm.plots[0].id;
    production.plant_crop(&mut farm, plot, CropKind::Tomato, t0());
    assert_eq!(production.harvest_crop(&mut farm, plot, at_minute(209)), 20);

    let now = at_minute(215);
    let mut old_tier = farm.clone();
    assert_eq!(production.sweep_spoilage(&mut old_tier, now), 0);

    for _ in 0..4 {
        assert!(production.upgrade_equipment(&mut farm, now));
    }
    assert_eq!(farm.inventory.equipment_tier, 5);
    assert_eq!(production.sweep_spoilage(&mut farm, now), 0);
    assert!(!farm.plots[0].is_empty());

    // The unit ready since +210 still spoils on its original schedule.
    assert_eq!(production.sweep_spoilage(&mut farm, at_minute(269)), 0);
    assert_eq!(production.sweep_spoilage(&mut farm, at_minute(271)), 1);
}

#[test]
fn test_starting_tier_applies_from_planting() {
    let (config, mut farm) = FarmBuilder::new(config_with_tomato(12.0, 1, 40, 5))
        .plots(1)
        .seeds(CropKind::Tomato, 1)
        .tier(3)
        .build(t0());
    let production = Production::new(&config);
    let plot = farm.plots[0].id;
    production.plant_crop(&mut farm, plot, CropKind::Tomato, t0());

    // 12 / 1.2 = 10 minutes per cycle.
    assert_eq!(production.ready_plot_count(&farm, at_minute(9)), 0);
    assert_eq!(production.harvest_crop(&mut farm, plot, at_minute(31)), 3);
}

#[test]
fn test_buy_sell_loop_reaches_goal() {
    let (config, mut farm) = FarmBuilder::new(GameConfig::default())
        .plots(1)
        .gold(300)
        .build(t0());
    let production = Production::new(&config);
    let shop = Shop::new(&config);
    let plot = farm.plots[0].id;

    assert!(shop.buy_seed_bundle(&mut farm, CropKind::Strawberry));
    assert_eq!(farm.inventory.gold, 0);
    assert!(production.plant_crop(&mut farm, plot, CropKind::Strawberry, t0()));
    assert_eq!(production.harvest_crop(&mut farm, plot, at_minute(60)), 3);

    let report = shop.sell_all(&mut farm);
    assert_eq!(report.total(), 36);
    assert!(farm.has_reached_goal(36));
    assert!(!farm.has_reached_goal(config.gold_target));
}

#[test]
fn test_offline_catch_up_then_resume() {
    let config = GameConfig::default();
    let mut farm = Farm::new("session", &config, t0());
    let production = Production::new(&config);
    let plot = farm.plots[0].id;
    production.plant_crop(&mut farm, plot, CropKind::Tomato, t0());

    let saved = FarmSnapshot::capture(&farm, at_minute(1))
        .to_bytes()
        .expect("encode");

    let (mut restored, report) = FarmSnapshot::from_bytes(&saved)
        .expect("decode")
        .restore(&config);
    assert!(report.is_clean());

    let summary = Reconciler::new(&config).reconcile(&mut restored, at_minute(95));
    assert_eq!(summary.crops_collected, 9);
    assert_eq!(restored.inventory.harvested_count(CropKind::Tomato), 9);
    assert_eq!(restored.last_observed_at, at_minute(95));

    // Interactive play continues on the same schedule.
    assert_eq!(production.harvest_crop(&mut restored, plot, at_minute(100)), 1);
}
