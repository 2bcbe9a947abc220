//! Strategic Strike Planner
//!
//! Picks a strike site deep inside a rival's territory that maximises the
//! value of structures in the blast, avoids SAM cover, prefers short flights
//! from our own silos and never re-targets an area struck recently.

use std::collections::{HashSet, VecDeque};

use nation_commands::{Command, PlayerId, PlayerType, Tick, TileRef, UnitType};

use crate::config::StrikeTuning;
use crate::context::DecisionContext;
use crate::game::{bounding_box, closest_two_tiles, GameView, UnitView};

/// Payload used for strategic strikes
pub const STRIKE_PAYLOAD: UnitType = UnitType::AtomBomb;

/// Structure types considered worth striking
pub const STRIKE_TARGET_TYPES: &[UnitType] = &[
    UnitType::City,
    UnitType::DefensePost,
    UnitType::MissileSilo,
    UnitType::Port,
    UnitType::SamLauncher,
];

/// One launched strike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikeRecord {
    pub tick: Tick,
    pub tile: TileRef,
}

/// Recent strikes, oldest first
#[derive(Debug, Clone, Default)]
pub struct StrikeLog {
    entries: VecDeque<StrikeRecord>,
}

impl StrikeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strike. Ticks must not go backwards.
    pub fn record(&mut self, tick: Tick, tile: TileRef) {
        debug_assert!(self.entries.back().map_or(true, |e| e.tick <= tick));
        self.entries.push_back(StrikeRecord { tick, tile });
    }

    /// Drop entries older than `window` ticks. Prefix trim only.
    pub fn prune(&mut self, now: Tick, window: Tick) {
        while let Some(front) = self.entries.front() {
            if front.tick + window < now {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StrikeRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Value of striking `tile`.
///
/// `silos` are our launch sites (at least one required), `targets` the
/// rival's structures, `recent` our still-remembered strikes.
pub fn nuke_tile_score<G: GameView + ?Sized>(
    game: &G,
    tuning: &StrikeTuning,
    tile: TileRef,
    silos: &[TileRef],
    targets: &[UnitView],
    recent: &StrikeLog,
) -> f64 {
    let within = |other: TileRef, radius: u32| {
        game.euclidean_dist_squared(tile, other) <= (radius as u64) * (radius as u64)
    };

    // Potential damage inside the blast
    let mut value: f64 = targets
        .iter()
        .filter(|u| within(u.tile, tuning.damage_radius))
        .map(|u| match u.unit_type {
            UnitType::City => tuning.city_value,
            UnitType::DefensePost => tuning.defense_post_value,
            UnitType::MissileSilo => tuning.silo_value,
            UnitType::Port => tuning.port_value,
            _ => 0.0,
        })
        .sum();

    // Avoid areas defended by SAM launchers
    let sams = targets
        .iter()
        .filter(|u| u.unit_type == UnitType::SamLauncher && within(u.tile, tuning.sam_radius))
        .count();
    value -= tuning.sam_penalty * sams as f64;

    // Prefer tiles close to a silo
    if let Some((silo, _)) = closest_two_tiles(game, silos, &[tile]) {
        let distance = (game.euclidean_dist_squared(tile, silo) as f64).sqrt();
        value -= distance * tuning.silo_distance_weight;
    }

    // Don't target near recent targets
    let repeats = recent
        .iter()
        .filter(|s| within(s.tile, tuning.damage_radius))
        .count();
    value -= tuning.recent_strike_penalty * repeats as f64;

    value
}

/// Random tile owned by `target` inside the bounding box of its border
fn rand_territory_tile<G: GameView + ?Sized>(
    ctx: &mut DecisionContext<'_, G>,
    target: PlayerId,
    border: &[TileRef],
) -> Option<TileRef> {
    let game = ctx.game;
    let (min, max) = bounding_box(game, border)?;
    for _ in 0..ctx.tuning.strike.territory_sample_attempts {
        let x = ctx.rng.next_int(min.x as i64, max.x as i64);
        let y = ctx.rng.next_int(min.y as i64, max.y as i64);
        if !game.is_valid_coord(x, y) {
            continue;
        }
        let tile = game.tile_ref(x, y);
        if game.owner(tile) == Some(target) {
            return Some(tile);
        }
    }
    None
}

/// True when every tile within `radius` (manhattan, connected) belongs to `target`
fn is_deep_inside<G: GameView + ?Sized>(game: &G, tile: TileRef, target: PlayerId, radius: u32) -> bool {
    game.bfs(tile, &|t| game.manhattan_dist(tile, t) <= radius)
        .into_iter()
        .all(|t| game.owner(t) == Some(target))
}

/// Consider a strike on `target` and launch it when a worthwhile site exists.
/// Returns the struck tile.
pub fn maybe_send_nuke<G: GameView + ?Sized>(
    ctx: &mut DecisionContext<'_, G>,
    log: &mut StrikeLog,
    target: PlayerId,
) -> Option<TileRef> {
    let game = ctx.game;
    let me = ctx.player;

    let silos: Vec<TileRef> = game
        .units(me, &[UnitType::MissileSilo])
        .into_iter()
        .map(|u| u.tile)
        .collect();
    if silos.is_empty()
        || game.gold(me) < game.unit_cost(STRIKE_PAYLOAD, me)
        || game.player_type(target) == PlayerType::Bot
        || game.is_on_same_team(me, target)
    {
        return None;
    }

    let structures = game.units(target, STRIKE_TARGET_TYPES);
    let border = game.border_tiles(target);

    let mut candidates = Vec::new();
    for _ in 0..ctx.tuning.strike.random_candidates {
        if let Some(tile) = rand_territory_tile(ctx, target, &border) {
            candidates.push(tile);
        }
    }
    candidates.extend(structures.iter().map(|u| u.tile));

    let tuning = ctx.tuning;
    log.prune(ctx.tick(), tuning.strike.memory_window_ticks);

    let tuning = &tuning.strike;
    let mut seen = HashSet::new();
    let mut best: Option<(TileRef, f64)> = None;
    for tile in candidates {
        if !seen.insert(tile) {
            continue;
        }
        if !is_deep_inside(game, tile, target, tuning.depth_radius) {
            continue;
        }
        if !game.can_build(me, STRIKE_PAYLOAD, tile) {
            continue;
        }
        let value = nuke_tile_score(game, tuning, tile, &silos, &structures, log);
        if value > best.map_or(0.0, |(_, v)| v) {
            best = Some((tile, value));
        }
    }

    let (tile, value) = best?;
    tracing::debug!(nation = ctx.issuer(), %target, tile, value, "strike site chosen");
    send_nuke(ctx, log, tile);
    Some(tile)
}

fn send_nuke<G: GameView + ?Sized>(ctx: &mut DecisionContext<'_, G>, log: &mut StrikeLog, tile: TileRef) {
    let now = ctx.tick();
    log.record(now, tile);
    log.prune(now, ctx.tuning.strike.memory_window_ticks);
    ctx.emit(Command::Nuke {
        unit: STRIKE_PAYLOAD,
        tile,
    });
}
