//! Naval & Spawn Planner
//!
//! Bounded random searches for transport destinations, warship sites and the
//! initial territory claim.

use nation_commands::{Cell, Command, PlayerId, TerrainType, TileRef, UnitType};

use crate::config::SpawnTuning;
use crate::context::DecisionContext;
use crate::game::{closest_two_tiles, GameView};
use crate::rng::PseudoRandom;

/// Own border tiles touching the ocean
fn coastal_border<G: GameView + ?Sized>(game: &G, player: PlayerId) -> Vec<TileRef> {
    game.border_tiles(player)
        .into_iter()
        .filter(|&t| game.is_ocean_shore(t))
        .collect()
}

/// Draw a tile uniformly from the square window of half-width `radius` around `center`
fn random_offset<G: GameView + ?Sized>(
    game: &G,
    rng: &mut PseudoRandom,
    center: Cell,
    radius: i64,
) -> Option<TileRef> {
    let (x, y) = (center.x as i64, center.y as i64);
    let rx = rng.next_int(x - radius, x + radius);
    let ry = rng.next_int(y - radius, y + radius);
    game.is_valid_coord(rx, ry).then(|| game.tile_ref(rx, ry))
}

/// Land near `from` that is unclaimed or held by a non-friendly faction
pub fn random_boat_target<G: GameView + ?Sized>(
    ctx: &mut DecisionContext<'_, G>,
    from: TileRef,
) -> Option<TileRef> {
    let game = ctx.game;
    let me = ctx.player;
    let center = game.cell(from);
    let naval = &ctx.tuning.naval;
    let (radius, attempts) = (naval.raid_radius, naval.raid_attempts);

    for _ in 0..attempts {
        let Some(tile) = random_offset(game, ctx.rng, center, radius) else {
            continue;
        };
        if !game.is_land(tile) {
            continue;
        }
        match game.owner(tile) {
            None => return Some(tile),
            Some(owner) if owner != me && !game.is_friendly(owner, me) => return Some(tile),
            Some(_) => {}
        }
    }
    None
}

/// Send a transport from a random coastal border tile to a random reachable shore
pub fn send_boat_randomly<G: GameView + ?Sized>(ctx: &mut DecisionContext<'_, G>) -> bool {
    let game = ctx.game;
    let me = ctx.player;
    let shore = coastal_border(game, me);
    let Some(&src) = ctx.rng.rand_element(&shore) else {
        return false;
    };
    let Some(dst) = random_boat_target(ctx, src) else {
        return false;
    };
    ctx.emit(Command::TransportShip {
        target: game.owner(dst),
        dst,
        troops: game.troops(me) / ctx.tuning.naval.troop_divisor.max(1),
    });
    true
}

/// Ship troops to the closest pair of coastal tiles between us and `target`
pub fn maybe_send_boat_attack<G: GameView + ?Sized>(
    ctx: &mut DecisionContext<'_, G>,
    target: PlayerId,
) -> bool {
    let game = ctx.game;
    let me = ctx.player;
    if game.is_on_same_team(me, target) {
        return false;
    }
    let ours = coastal_border(game, me);
    let theirs = coastal_border(game, target);
    let Some((_, dst)) = closest_two_tiles(game, &ours, &theirs) else {
        return false;
    };
    ctx.emit(Command::TransportShip {
        target: Some(target),
        dst,
        troops: game.troops(me) / ctx.tuning.naval.troop_divisor.max(1),
    });
    true
}

/// Ocean tile within the warship radius of `port`
fn warship_spawn_tile<G: GameView + ?Sized>(
    ctx: &mut DecisionContext<'_, G>,
    port: TileRef,
) -> Option<TileRef> {
    let game = ctx.game;
    let center = game.cell(port);
    let naval = &ctx.tuning.naval;
    let (radius, attempts) = (naval.warship_radius, naval.warship_attempts);

    for _ in 0..attempts {
        match random_offset(game, ctx.rng, center, radius) {
            Some(tile) if game.is_ocean(tile) => return Some(tile),
            _ => continue,
        }
    }
    None
}

/// Keep exactly one warship at sea when there is a port to launch it from
pub fn maybe_spawn_warship<G: GameView + ?Sized>(ctx: &mut DecisionContext<'_, G>) -> bool {
    if !ctx.rng.chance(ctx.tuning.naval.warship_chance) {
        return false;
    }
    let game = ctx.game;
    let me = ctx.player;
    let ports: Vec<TileRef> = game
        .units(me, &[UnitType::Port])
        .into_iter()
        .map(|u| u.tile)
        .collect();
    if ports.is_empty()
        || game.units_owned(me, UnitType::Warship) > 0
        || game.gold(me) <= game.unit_cost(UnitType::Warship, me)
    {
        return false;
    }

    let Some(&port) = ctx.rng.rand_element(&ports) else {
        return false;
    };
    let Some(tile) = warship_spawn_tile(ctx, port) else {
        tracing::warn!(nation = %game.name(me), "no ocean tile for a warship");
        return false;
    };
    if !game.can_build(me, UnitType::Warship, tile) {
        tracing::warn!(nation = %game.name(me), tile, "cannot spawn warship");
        return false;
    }
    ctx.emit(Command::Construct {
        unit: UnitType::Warship,
        tile,
    });
    true
}

/// Unclaimed land near `spawn`, with a soft preference against mountains.
/// Runs before the nation's faction exists, so it takes no decision context.
pub fn random_land<G: GameView + ?Sized>(
    game: &G,
    rng: &mut PseudoRandom,
    tuning: &SpawnTuning,
    spawn: Cell,
) -> Option<TileRef> {
    for _ in 0..tuning.attempts {
        let Some(tile) = random_offset(game, rng, spawn, tuning.delta) else {
            continue;
        };
        if !game.is_land(tile) || game.has_owner(tile) {
            continue;
        }
        if game.terrain(tile) == TerrainType::Mountain && rng.chance(tuning.mountain_reject_chance) {
            continue;
        }
        return Some(tile);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentProfile, EngineTuning};
    use crate::grid::GridWorld;
    use nation_commands::{CommandRecord, PlayerType, Tick};

    fn profile() -> AgentProfile {
        AgentProfile {
            attack_rate: 60,
            attack_tick: 0,
            trigger_ratio: 0.7,
            reserve_ratio: 0.4,
            expand_ratio: 0.2,
        }
    }

    fn run_with<F, R>(
        w: &GridWorld,
        me: PlayerId,
        tuning: &EngineTuning,
        seed: u64,
        f: F,
    ) -> (R, Vec<CommandRecord>)
    where
        F: FnOnce(&mut DecisionContext<'_, GridWorld>) -> R,
    {
        let mut rng = PseudoRandom::new(seed);
        let prof = profile();
        let mut out = Vec::new();
        let tick: Tick = 0;
        let mut ctx = DecisionContext::new(w, me, &mut rng, &prof, tuning, "me", tick, &mut out);
        let r = f(&mut ctx);
        (r, out)
    }

    fn run<F, R>(w: &GridWorld, me: PlayerId, seed: u64, f: F) -> (R, Vec<CommandRecord>)
    where
        F: FnOnce(&mut DecisionContext<'_, GridWorld>) -> R,
    {
        run_with(w, me, &EngineTuning::default(), seed, f)
    }

    /// Two islands split by a strait
    fn archipelago() -> (GridWorld, PlayerId, PlayerId) {
        let mut w = GridWorld::from_rows(&[
            "~~~~~~~~~~~~", //
            "~...~~~~...~", //
            "~...~~~~...~", //
            "~...~~~~...~", //
            "~~~~~~~~~~~~",
        ]);
        let me = w.add_player("me", "Me", PlayerType::Nation);
        let them = w.add_player("them", "Them", PlayerType::Human);
        w.claim_rect(me, 1, 1, 3, 3);
        w.claim_rect(them, 8, 1, 10, 3);
        w.set_troops(me, 1000);
        (w, me, them)
    }

    #[test]
    fn test_boat_attack_targets_closest_shore() {
        let (w, me, them) = archipelago();
        let (sent, out) = run(&w, me, 1, |ctx| maybe_send_boat_attack(ctx, them));
        assert!(sent);
        assert_eq!(
            out[0].command,
            Command::TransportShip {
                target: Some(them),
                dst: w.tile_ref(8, 1),
                troops: 200
            }
        );
    }

    #[test]
    fn test_boat_attack_needs_coast_on_both_sides() {
        let mut w = GridWorld::from_rows(&[
            "~~~~~~~", //
            "~.....~", //
            "~.....~", //
            "~.....~", //
            "~~~~~~~",
        ]);
        let me = w.add_player("me", "Me", PlayerType::Nation);
        let them = w.add_player("them", "Them", PlayerType::Nation);
        w.claim_rect(me, 1, 1, 5, 3);
        w.claim(them, w.tile_ref(3, 2));
        let (sent, out) = run(&w, me, 1, |ctx| maybe_send_boat_attack(ctx, them));
        assert!(!sent);
        assert!(out.is_empty());
    }

    #[test]
    fn test_random_boat_lands_on_foreign_shore() {
        let (w, me, them) = archipelago();
        let mut tuning = EngineTuning::default();
        tuning.naval.raid_radius = 12;
        for seed in 0..10 {
            let (sent, out) = run_with(&w, me, &tuning, seed, |ctx| send_boat_randomly(ctx));
            assert!(sent);
            let Command::TransportShip { target, dst, troops } = out[0].command.clone() else {
                panic!("expected a transport");
            };
            assert_eq!(troops, 200);
            assert_eq!(target, Some(them));
            assert_eq!(w.owner(dst), Some(them));
        }
    }

    #[test]
    fn test_random_boat_skips_allies() {
        let (mut w, me, them) = archipelago();
        w.set_allied(me, them, true);
        for seed in 0..10 {
            let (sent, _) = run(&w, me, seed, |ctx| send_boat_randomly(ctx));
            assert!(!sent);
        }
    }

    #[test]
    fn test_landlocked_nation_sends_no_boats() {
        let mut w = GridWorld::from_rows(&["~~~~~~~", "~.....~", "~.....~", "~.....~", "~~~~~~~"]);
        let me = w.add_player("me", "Me", PlayerType::Nation);
        w.claim(me, w.tile_ref(3, 2));
        let (sent, out) = run(&w, me, 1, |ctx| send_boat_randomly(ctx));
        assert!(!sent);
        assert!(out.is_empty());
    }

    #[test]
    fn test_warship_only_with_port_and_gold() {
        let (mut w, me, _) = archipelago();
        let mut tuning = EngineTuning::default();
        tuning.naval.warship_chance = 1;
        tuning.naval.warship_radius = 6;

        let (built, _) = run_with(&w, me, &tuning, 1, |ctx| maybe_spawn_warship(ctx));
        assert!(!built, "no port yet");

        w.add_unit(me, UnitType::Port, w.tile_ref(3, 2));
        w.set_gold(me, 0);
        let (built, _) = run_with(&w, me, &tuning, 1, |ctx| maybe_spawn_warship(ctx));
        assert!(!built, "cannot afford");

        w.set_gold(me, 10_000_000);
        let (built, out) = run_with(&w, me, &tuning, 1, |ctx| maybe_spawn_warship(ctx));
        assert!(built);
        let Command::Construct { unit, tile } = out[0].command.clone() else {
            panic!("expected construction");
        };
        assert_eq!(unit, UnitType::Warship);
        assert!(w.is_ocean(tile));
    }

    #[test]
    fn test_at_most_one_warship() {
        let (mut w, me, _) = archipelago();
        let mut tuning = EngineTuning::default();
        tuning.naval.warship_chance = 1;
        w.set_gold(me, 10_000_000);
        w.add_unit(me, UnitType::Port, w.tile_ref(3, 2));
        w.add_unit(me, UnitType::Warship, w.tile_ref(5, 2));
        let (built, out) = run_with(&w, me, &tuning, 1, |ctx| maybe_spawn_warship(ctx));
        assert!(!built);
        assert!(out.is_empty());
    }

    fn spawn_search(w: &GridWorld, tuning: &SpawnTuning, seed: u64, at: Cell) -> Option<TileRef> {
        let mut rng = PseudoRandom::new(seed);
        random_land(w, &mut rng, tuning, at)
    }

    #[test]
    fn test_spawn_search_finds_unclaimed_land() {
        let rows: Vec<String> = (0..60).map(|_| ".".repeat(60)).collect();
        let rows: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        let mut w = GridWorld::from_rows(&rows);
        let other = w.add_player("other", "Other", PlayerType::Human);
        w.claim_rect(other, 25, 25, 34, 34);
        let tuning = SpawnTuning::default();

        for seed in 0..20 {
            let tile = spawn_search(&w, &tuning, seed, Cell::new(30, 30)).expect("plenty of free land");
            assert!(w.is_land(tile));
            assert!(!w.has_owner(tile));
            let c = w.cell(tile);
            assert!((5..55).contains(&c.x) && (5..55).contains(&c.y));
        }
    }

    #[test]
    fn test_spawn_search_fails_on_water() {
        let rows: Vec<String> = (0..10).map(|_| "~".repeat(10)).collect();
        let rows: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        let w = GridWorld::from_rows(&rows);
        assert_eq!(spawn_search(&w, &SpawnTuning::default(), 1, Cell::new(5, 5)), None);
    }

    #[test]
    fn test_spawn_search_rejects_mountains() {
        let mut rows: Vec<String> = (0..5).map(|_| "^".repeat(5)).collect();
        rows[2] = "^^.^^".to_string();
        let rows: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        let w = GridWorld::from_rows(&rows);
        let mut tuning = SpawnTuning {
            delta: 1,
            ..SpawnTuning::default()
        };

        // Rejection on every roll leaves only the plains tile
        tuning.mountain_reject_chance = 1;
        for seed in 0..20 {
            assert_eq!(spawn_search(&w, &tuning, seed, Cell::new(2, 2)), Some(w.tile_ref(2, 2)));
        }

        // With a soft preference mountains are still possible
        tuning.mountain_reject_chance = 2;
        let mountains = (0..20)
            .filter_map(|seed| spawn_search(&w, &tuning, seed, Cell::new(2, 2)))
            .filter(|&t| w.terrain(t) == TerrainType::Mountain)
            .count();
        assert!(mountains > 0);
    }
}
