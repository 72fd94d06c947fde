//! Raid sessions through the engine.

use isles_core::{
    buildings::BuildingType,
    engine::IslandEngine,
    event::GameEvent,
    types::GroundPoint,
};

fn build() -> IslandEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    IslandEngine::build_test().expect("build test engine")
}

/// Three huts: 20 timber left and a rate (0.66) too low to accrue on the
/// idle path, so every timber change below comes from the raid.
fn build_with_three_huts() -> IslandEngine {
    let mut engine = build();
    for x in 0..3 {
        engine
            .place(BuildingType::Hut, GroundPoint { x: f64::from(x), z: 0.0 })
            .unwrap();
    }
    assert_eq!(engine.timber(), 20.0);
    engine
}

fn raid_endings(engine: &mut IslandEngine) -> Vec<(u64, u64)> {
    engine
        .drain_events()
        .into_iter()
        .filter_map(|e| match e.event {
            GameEvent::RaidEnded { score, reward } => Some((score, reward)),
            _ => None,
        })
        .collect()
}

#[test]
fn five_hits_with_three_buildings() {
    let mut engine = build_with_three_huts();

    assert!(engine.start_raid());
    for _ in 0..5 {
        assert!(engine.register_hit());
    }
    assert_eq!(engine.timber(), 30.0, "each hit pays 2 at once");

    engine.advance(21_000);
    assert!(!engine.raid().is_active());
    assert_eq!(raid_endings(&mut engine), vec![(5, 13)]);
    assert_eq!(engine.timber(), 43.0);
}

#[test]
fn raid_without_hits_pays_minimum() {
    let mut engine = build();
    engine.start_raid();
    engine.advance(20_200);
    assert_eq!(raid_endings(&mut engine), vec![(0, 5)]);
    assert_eq!(engine.timber(), 55.0);
}

#[test]
fn raid_ends_at_first_poll_after_end_time() {
    let mut engine = build();
    engine.advance(100);
    engine.start_raid();
    assert_eq!(engine.raid().end_time(), Some(20_100));

    engine.advance(20_000);
    assert!(engine.raid().is_active(), "poll at exactly the end time does not expire");
    engine.advance(200);
    assert!(!engine.raid().is_active());
}

#[test]
fn hit_after_expiry_is_ignored_even_before_poll() {
    let mut engine = build_with_three_huts();
    engine.start_raid();
    engine.register_hit();

    engine.advance(20_050);
    assert!(engine.raid().is_active());
    assert!(!engine.register_hit());
    assert_eq!(engine.timber(), 22.0);

    engine.advance(200);
    assert_eq!(raid_endings(&mut engine), vec![(1, 5)]);

    assert!(!engine.register_hit());
    assert_eq!(engine.timber(), 27.0);
    assert!(raid_endings(&mut engine).is_empty());
}

#[test]
fn start_while_active_keeps_score() {
    let mut engine = build();
    engine.start_raid();
    engine.register_hit();
    engine.register_hit();
    engine.advance(5_000);

    assert!(!engine.start_raid());
    assert_eq!(engine.raid().score(), Some(2));
    assert_eq!(engine.raid().end_time(), Some(20_000));
}

#[test]
fn raid_can_run_again_after_ending() {
    let mut engine = build();
    engine.start_raid();
    engine.advance(20_200);
    assert!(engine.start_raid());
    assert_eq!(engine.raid().score(), Some(0));
    assert_eq!(engine.raid().end_time(), Some(40_200));
}

#[test]
fn reward_counts_buildings_present_at_expiry() {
    let mut engine = build_with_three_huts();
    engine.start_raid();
    for _ in 0..4 {
        engine.register_hit();
    }
    engine.remove_most_recent();
    engine.advance(20_200);
    assert_eq!(raid_endings(&mut engine), vec![(4, 10)]);
}
