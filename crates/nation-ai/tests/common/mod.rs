//! Shared scenario harness for integration tests

#![allow(dead_code)]

use nation_ai::{EngineTuning, GameView, GridWorld, Nation, NationAgent};
use nation_commands::{Cell, CommandRecord};

/// Land rectangle `width` x `height` inside a one-tile ocean frame
pub fn island(width: usize, height: usize) -> GridWorld {
    let mut rows = vec!["~".repeat(width + 2)];
    for _ in 0..height {
        rows.push(format!("~{}~", ".".repeat(width)));
    }
    rows.push("~".repeat(width + 2));
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    GridWorld::from_rows(&rows)
}

pub fn tuning() -> EngineTuning {
    let mut tuning = EngineTuning::default();
    tuning.spawn.delta = 4;
    tuning
}

pub fn agents(game_id: &str) -> Vec<NationAgent> {
    [
        ("nation_west", "Westmark", Cell::new(8, 8)),
        ("nation_east", "Eastreach", Cell::new(32, 8)),
        ("nation_south", "Southvale", Cell::new(20, 18)),
    ]
    .into_iter()
    .map(|(identity, name, cell)| {
        let mut agent =
            NationAgent::with_reference_behavior(Nation::new(identity, name, cell), game_id, tuning());
        agent.init();
        agent
    })
    .collect()
}

/// Run `ticks` ticks: every agent decides, then the world applies the queue
pub fn run(world: &mut GridWorld, agents: &mut [NationAgent], ticks: u64) -> Vec<CommandRecord> {
    let mut log = Vec::new();
    for _ in 0..ticks {
        let now = world.ticks();
        let mut queue = Vec::new();
        for agent in agents.iter_mut() {
            agent.tick(&*world, now, &mut queue).unwrap();
        }
        for record in &queue {
            world.apply(record).unwrap();
        }
        log.extend(queue);
        world.advance_tick();
    }
    log
}

/// Spawn phase, then hand every faction an army and a treasury
pub fn full_game(game_id: &str, spawn_ticks: u64, active_ticks: u64) -> (GridWorld, Vec<NationAgent>, Vec<CommandRecord>) {
    let mut world = island(40, 24);
    world.set_spawn_phase_length(spawn_ticks);
    let mut agents = agents(game_id);

    let mut log = run(&mut world, &mut agents, spawn_ticks);
    for id in world.player_ids() {
        world.set_troops(id, 50_000);
        world.set_gold(id, 3_000_000);
    }
    log.extend(run(&mut world, &mut agents, active_ticks));
    (world, agents, log)
}
