//! Structure Placement Planner
//!
//! Walks the structure types in priority order and commissions at most one
//! per tick. Each type has its own candidate set and scoring; large candidate
//! sets are sampled down before scoring.

use std::collections::HashSet;

use nation_commands::{Command, PlayerId, Relation, TileRef, UnitType};

use crate::context::DecisionContext;
use crate::game::{closest_two_tiles, GameView};
use crate::naval::maybe_spawn_warship;
use crate::nuke::STRIKE_PAYLOAD;

/// Structures the planner knows how to place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureKind {
    City,
    /// Coastal hub
    Port,
    Factory,
    MissileSilo,
    DefensePost,
}

impl StructureKind {
    pub fn unit_type(self) -> UnitType {
        match self {
            StructureKind::City => UnitType::City,
            StructureKind::Port => UnitType::Port,
            StructureKind::Factory => UnitType::Factory,
            StructureKind::MissileSilo => UnitType::MissileSilo,
            StructureKind::DefensePost => UnitType::DefensePost,
        }
    }
}

/// Multiplier applied to the base cost when deciding affordability
pub fn perceived_cost_multiplier(kind: StructureKind, owned: usize, cap: u64) -> u64 {
    let multiplier = (owned as u64 + 1).min(cap);
    match kind {
        StructureKind::DefensePost => multiplier + 1,
        _ => multiplier,
    }
}

/// Production step: build the first affordable, viable structure.
/// Returns true when something was commissioned.
pub fn handle_units<G: GameView + ?Sized>(ctx: &mut DecisionContext<'_, G>) -> bool {
    maybe_spawn_structure(ctx, StructureKind::City)
        || maybe_spawn_structure(ctx, StructureKind::Port)
        || maybe_spawn_warship(ctx)
        || maybe_spawn_structure(ctx, StructureKind::Factory)
        || maybe_spawn_structure(ctx, StructureKind::MissileSilo)
        || maybe_spawn_structure(ctx, StructureKind::DefensePost)
}

pub fn maybe_spawn_structure<G: GameView + ?Sized>(
    ctx: &mut DecisionContext<'_, G>,
    kind: StructureKind,
) -> bool {
    let game = ctx.game;
    let me = ctx.player;
    let unit = kind.unit_type();
    let tuning = &ctx.tuning.structures;

    let multiplier =
        perceived_cost_multiplier(kind, game.units_owned(me, unit), tuning.max_cost_multiplier);
    let perceived_cost = game.unit_cost(unit, me).saturating_mul(multiplier);
    if game.gold(me) < perceived_cost {
        return false;
    }
    let fear_threshold = tuning.defense_fear_threshold;

    let Some(tile) = structure_spawn_tile(ctx, kind) else {
        return false;
    };
    if !game.can_build(me, unit, tile) {
        return false;
    }
    // Posts only once the nation has been under recent pressure
    if kind == StructureKind::DefensePost && game.fear(me) < fear_threshold {
        return false;
    }

    ctx.emit(Command::Construct { unit, tile });
    true
}

/// Best sampled site for `kind`, or `None` when nothing viable exists
fn structure_spawn_tile<G: GameView + ?Sized>(
    ctx: &mut DecisionContext<'_, G>,
    kind: StructureKind,
) -> Option<TileRef> {
    let game = ctx.game;
    let me = ctx.player;
    let unit = kind.unit_type();
    let sample_size = ctx.tuning.structures.sample_size;

    let tiles = candidate_tiles(ctx, kind);
    if tiles.is_empty() {
        return None;
    }
    let scorer = TileScorer::new(ctx, kind);
    let sampled = ctx.rng.sample(&tiles, sample_size);

    let mut best: Option<(TileRef, f64)> = None;
    for tile in sampled {
        let value = scorer.score(game, tile);
        if value == f64::NEG_INFINITY {
            return None;
        }
        if matches!(best, Some((_, v)) if value <= v) {
            continue;
        }
        if !game.can_build(me, unit, tile) {
            continue;
        }
        best = Some((tile, value));
    }
    best.map(|(tile, _)| tile)
}

fn candidate_tiles<G: GameView + ?Sized>(
    ctx: &mut DecisionContext<'_, G>,
    kind: StructureKind,
) -> Vec<TileRef> {
    let game = ctx.game;
    let me = ctx.player;
    match kind {
        StructureKind::Port => game
            .border_tiles(me)
            .into_iter()
            .filter(|&t| game.is_ocean_shore(t))
            .collect(),
        StructureKind::DefensePost => defense_candidates(ctx),
        StructureKind::City | StructureKind::Factory | StructureKind::MissileSilo => {
            game.owned_tiles(me)
        }
    }
}

/// Owned tiles whose nearest neighbouring faction is anything short of
/// friendly. Nearness is judged against one random tile of each neighbour.
fn defense_candidates<G: GameView + ?Sized>(ctx: &mut DecisionContext<'_, G>) -> Vec<TileRef> {
    let game = ctx.game;
    let me = ctx.player;

    let rivals: HashSet<PlayerId> = game
        .player_ids()
        .into_iter()
        .filter(|&p| p != me && game.relation(me, p) < Relation::Friendly)
        .collect();
    let neighbours: Vec<(PlayerId, Vec<TileRef>)> = game
        .neighbors_of(me)
        .into_iter()
        .map(|n| (n, game.owned_tiles(n)))
        .filter(|(_, tiles)| !tiles.is_empty())
        .collect();

    let mut out = Vec::new();
    for tile in game.owned_tiles(me) {
        let mut closest: Option<(PlayerId, u32)> = None;
        for (neighbour, tiles) in &neighbours {
            let Some(&probe) = ctx.rng.rand_element(tiles) else {
                continue;
            };
            let distance = game.manhattan_dist(tile, probe);
            if closest.map_or(true, |(_, d)| distance < d) {
                closest = Some((*neighbour, distance));
            }
        }
        if matches!(closest, Some((n, _)) if rivals.contains(&n)) {
            out.push(tile);
        }
    }
    out
}

/// Per-call scoring state for one structure kind
struct TileScorer {
    kind: StructureKind,
    border: Vec<TileRef>,
    /// Existing structures of the same kind
    others: Vec<TileRef>,
    border_spacing: u32,
    structure_spacing: u32,
    /// Sampled border tiles used by the defense post checks
    sampled_border: Vec<TileRef>,
    /// Some sampled border tile touches a hostile faction
    hostile_front: bool,
}

impl TileScorer {
    fn new<G: GameView + ?Sized>(ctx: &mut DecisionContext<'_, G>, kind: StructureKind) -> Self {
        let game = ctx.game;
        let me = ctx.player;
        let border = game.border_tiles(me);
        let others = game
            .units(me, &[kind.unit_type()])
            .into_iter()
            .map(|u| u.tile)
            .collect();
        let border_spacing = game.nuke_outer_radius(STRIKE_PAYLOAD);

        let (sampled_border, hostile_front) = match kind {
            StructureKind::DefensePost => {
                let sampled = ctx.rng.sample(&border, ctx.tuning.structures.sample_size);
                let front = sampled.iter().any(|&t| {
                    game.neighbors(t).into_iter().any(|n| match game.owner(n) {
                        Some(owner) if owner != me => game.relation(me, owner) <= Relation::Hostile,
                        _ => false,
                    })
                });
                (sampled, front)
            }
            _ => (Vec::new(), false),
        };

        Self {
            kind,
            border,
            others,
            border_spacing,
            structure_spacing: border_spacing * 2,
            sampled_border,
            hostile_front,
        }
    }

    /// Distance to the nearest same-kind structure, capped
    fn spacing<G: GameView + ?Sized>(&self, game: &G, tile: TileRef) -> f64 {
        let others: Vec<TileRef> = self.others.iter().copied().filter(|&t| t != tile).collect();
        closest_two_tiles(game, &others, &[tile])
            .map_or(0.0, |(other, _)| game.manhattan_dist(other, tile).min(self.structure_spacing) as f64)
    }

    fn score<G: GameView + ?Sized>(&self, game: &G, tile: TileRef) -> f64 {
        match self.kind {
            StructureKind::Port => self.spacing(game, tile),
            StructureKind::City | StructureKind::Factory | StructureKind::MissileSilo => {
                let mut w = game.magnitude(tile) as f64;
                if let Some((border, _)) = closest_two_tiles(game, &self.border, &[tile]) {
                    w += game.manhattan_dist(border, tile).min(self.border_spacing) as f64;
                }
                w + self.spacing(game, tile)
            }
            StructureKind::DefensePost => {
                if !self.hostile_front {
                    return f64::NEG_INFINITY;
                }
                let reach = (self.structure_spacing as u64).pow(2);
                let near_front = self
                    .sampled_border
                    .iter()
                    .any(|&b| game.euclidean_dist_squared(b, tile) <= reach);
                if !near_front {
                    return 0.0;
                }
                game.magnitude(tile) as f64 + self.spacing(game, tile)
            }
        }
    }
}
