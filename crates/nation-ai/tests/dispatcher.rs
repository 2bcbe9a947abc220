//! Tick dispatcher scenarios against the grid world

mod common;

use nation_ai::{EngineError, GameView, Nation, NationAgent};
use nation_commands::{Cell, Command, PlayerType};

use common::{full_game, island, run, tuning};

fn westmark() -> Nation {
    Nation::new("nation_west", "Westmark", Cell::new(8, 8))
}

/// Search session ids until the rolled cadence is `rate` / `offset`
fn agent_with_cadence(rate: u64, offset: u64) -> NationAgent {
    (0..1_000_000)
        .map(|i| NationAgent::with_reference_behavior(westmark(), &format!("cadence-{i}"), tuning()))
        .find(|a| a.profile().attack_rate == rate && a.profile().attack_tick == offset)
        .expect("some session rolls the requested cadence")
}

#[test]
fn test_cadence_sixty_offset_thirteen() {
    let mut agent = agent_with_cadence(60, 13);
    agent.init();
    let mut world = island(20, 20);
    world.set_spawn_phase(true);

    let mut queue = Vec::new();
    agent.tick(&world, 13, &mut queue).unwrap();
    assert_eq!(queue.len(), 1, "slot 13 acts");

    for t in 14..73 {
        agent.tick(&world, t, &mut queue).unwrap();
    }
    assert_eq!(queue.len(), 1, "ticks 14..73 are idle");

    agent.tick(&world, 73, &mut queue).unwrap();
    assert_eq!(queue.len(), 2, "slot 73 acts again");
    assert!(queue.iter().all(|r| matches!(r.command, Command::Spawn { .. })));
}

#[test]
fn test_commands_only_on_own_slots() {
    let (_, agents, log) = full_game("session-slots", 150, 500);
    for agent in &agents {
        let profile = agent.profile();
        for record in log.iter().filter(|r| r.issuer == agent.nation().identity) {
            assert_eq!(
                record.tick % profile.attack_rate,
                profile.attack_tick,
                "{} acted off its slot at tick {}",
                record.issuer,
                record.tick
            );
        }
    }
}

#[test]
fn test_profile_ranges() {
    for i in 0..200 {
        let agent = NationAgent::with_reference_behavior(westmark(), &format!("range-{i}"), tuning());
        let p = agent.profile();
        assert!((40..80).contains(&p.attack_rate));
        assert!(p.attack_tick < p.attack_rate);
        for ratio in [p.trigger_ratio, p.reserve_ratio, p.expand_ratio] {
            assert!((0.0..=1.0).contains(&ratio));
        }
    }
}

#[test]
fn test_waits_for_faction_after_spawn_phase() {
    let mut agent = NationAgent::with_reference_behavior(westmark(), "session-wait", tuning());
    agent.init();
    let world = island(20, 20);
    let slot = agent.profile().attack_tick;

    let mut queue = Vec::new();
    agent.tick(&world, slot, &mut queue).unwrap();
    assert!(queue.is_empty());
    assert_eq!(agent.phase_name(), "awaiting_faction");
    assert_eq!(agent.player(), None);
}

#[test]
fn test_tick_before_init_is_an_error() {
    let mut agent = NationAgent::with_reference_behavior(westmark(), "session-early", tuning());
    let world = island(10, 10);
    let mut queue = Vec::new();
    assert_eq!(agent.tick(&world, 0, &mut queue), Err(EngineError::Uninitialized));
}

#[test]
fn test_elimination_deactivates() {
    let mut world = island(40, 24);
    world.set_spawn_phase_length(100);
    let mut agents = vec![{
        let mut a = NationAgent::with_reference_behavior(westmark(), "session-elim", tuning());
        a.init();
        a
    }];
    run(&mut world, &mut agents, 100);

    let player = world.find_player("nation_west").expect("spawned");
    world.set_troops(player, 1_000);
    run(&mut world, &mut agents, 80);
    assert!(agents[0].is_active());

    world.eliminate(player);
    let log = run(&mut world, &mut agents, 80);
    assert!(log.is_empty());
    assert!(!agents[0].is_active());
    assert_eq!(agents[0].phase_name(), "inactive");
}

#[test]
fn test_human_rival_draws_fire() {
    let (mut world, mut agents, _) = full_game("session-rival", 120, 0);
    let west = world.find_player("nation_west").expect("spawned");
    let human = world.add_player("human_1", "Rival", PlayerType::Human);
    // Surround the western nation's spawn so no free land remains nearby
    let cells: Vec<_> = world.owned_tiles(west);
    let (min_x, max_x) = cells.iter().map(|&t| world.cell(t).x).fold((i32::MAX, i32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
    let (min_y, max_y) = cells.iter().map(|&t| world.cell(t).y).fold((i32::MAX, i32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
    for y in (min_y - 3)..=(max_y + 3) {
        for x in (min_x - 3)..=(max_x + 3) {
            if world.is_valid_coord(x as i64, y as i64) {
                let t = world.tile_ref(x as i64, y as i64);
                if world.owner(t).is_none() {
                    world.claim(human, t);
                }
            }
        }
    }
    world.set_troops(human, 10);
    world.set_relation(west, human, -80);

    let log = run(&mut world, &mut agents, 400);
    let aimed_at_human = log.iter().any(|r| {
        r.issuer == "nation_west"
            && matches!(
                r.command,
                Command::Attack { target: Some(t), .. } | Command::TransportShip { target: Some(t), .. } if t == human
            )
    });
    assert!(aimed_at_human, "western nation should turn on its weak hostile neighbour");
}
