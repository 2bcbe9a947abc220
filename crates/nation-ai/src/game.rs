//! Game Queries
//!
//! Read-only view of the simulation that the engine decides against. The host
//! simulation implements the required methods; distances, adjacency and the
//! bounded traversal have default implementations in terms of them.

use std::collections::{HashSet, VecDeque};

use nation_commands::{
    Cell, Difficulty, Gold, PlayerId, PlayerType, Relation, TerrainType, Tick, TileRef, UnitType,
};

/// A unit as seen by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitView {
    pub unit_type: UnitType,
    pub tile: TileRef,
    pub owner: PlayerId,
}

/// Read access to the simulation
pub trait GameView {
    // --- session ---

    fn ticks(&self) -> Tick;
    fn in_spawn_phase(&self) -> bool;
    fn difficulty(&self) -> Difficulty;
    /// Outer blast radius of a strike payload
    fn nuke_outer_radius(&self, payload: UnitType) -> u32;

    // --- map ---

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn terrain(&self, tile: TileRef) -> TerrainType;
    /// Elevation, higher is better for structures
    fn magnitude(&self, tile: TileRef) -> u8;
    /// Owning faction, `None` for unclaimed land and water
    fn owner(&self, tile: TileRef) -> Option<PlayerId>;

    fn is_valid_coord(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64
    }

    fn tile_ref(&self, x: i64, y: i64) -> TileRef {
        (y as u32) * self.width() + x as u32
    }

    fn cell(&self, tile: TileRef) -> Cell {
        let w = self.width();
        Cell::new((tile % w) as i32, (tile / w) as i32)
    }

    /// Orthogonal neighbours inside the map
    fn neighbors(&self, tile: TileRef) -> Vec<TileRef> {
        let c = self.cell(tile);
        let (x, y) = (c.x as i64, c.y as i64);
        [(x, y - 1), (x - 1, y), (x + 1, y), (x, y + 1)]
            .into_iter()
            .filter(|&(nx, ny)| self.is_valid_coord(nx, ny))
            .map(|(nx, ny)| self.tile_ref(nx, ny))
            .collect()
    }

    fn is_land(&self, tile: TileRef) -> bool {
        self.terrain(tile).is_land()
    }

    fn is_ocean(&self, tile: TileRef) -> bool {
        self.terrain(tile) == TerrainType::Ocean
    }

    fn has_owner(&self, tile: TileRef) -> bool {
        self.owner(tile).is_some()
    }

    /// Land tile touching the ocean
    fn is_ocean_shore(&self, tile: TileRef) -> bool {
        self.is_land(tile) && self.neighbors(tile).into_iter().any(|n| self.is_ocean(n))
    }

    fn manhattan_dist(&self, a: TileRef, b: TileRef) -> u32 {
        let (ca, cb) = (self.cell(a), self.cell(b));
        ca.x.abs_diff(cb.x) + ca.y.abs_diff(cb.y)
    }

    fn euclidean_dist_squared(&self, a: TileRef, b: TileRef) -> u64 {
        let (ca, cb) = (self.cell(a), self.cell(b));
        let dx = ca.x.abs_diff(cb.x) as u64;
        let dy = ca.y.abs_diff(cb.y) as u64;
        dx * dx + dy * dy
    }

    /// Breadth-first visitation from `start` through tiles accepted by `filter`.
    /// `start` is always visited.
    fn bfs(&self, start: TileRef, filter: &dyn Fn(TileRef) -> bool) -> Vec<TileRef> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        let mut visited = Vec::new();

        seen.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            visited.push(current);
            for n in self.neighbors(current) {
                if seen.insert(n) && filter(n) {
                    queue.push_back(n);
                }
            }
        }
        visited
    }

    // --- factions ---

    /// Every faction in a stable order
    fn player_ids(&self) -> Vec<PlayerId>;
    /// Resolve a nation's stable identity to its faction once it exists
    fn find_player(&self, identity: &str) -> Option<PlayerId>;
    fn player_type(&self, id: PlayerId) -> PlayerType;
    fn name(&self, id: PlayerId) -> String;
    fn is_alive(&self, id: PlayerId) -> bool;
    fn is_traitor(&self, id: PlayerId) -> bool;
    fn troops(&self, id: PlayerId) -> u64;
    fn gold(&self, id: PlayerId) -> Gold;
    /// Accrued recent threat
    fn fear(&self, id: PlayerId) -> f64;
    fn owned_tiles(&self, id: PlayerId) -> Vec<TileRef>;
    /// Owned tiles adjacent to at least one tile the faction does not own
    fn border_tiles(&self, id: PlayerId) -> Vec<TileRef>;
    /// Units of the listed types, all units when `types` is empty
    fn units(&self, id: PlayerId, types: &[UnitType]) -> Vec<UnitView>;

    fn units_owned(&self, id: PlayerId, unit_type: UnitType) -> usize {
        self.units(id, &[unit_type]).len()
    }

    // --- diplomacy ---

    /// Raw relation score of `id` toward `other`
    fn relation_score(&self, id: PlayerId, other: PlayerId) -> i32;
    fn is_on_same_team(&self, a: PlayerId, b: PlayerId) -> bool;
    fn is_allied(&self, a: PlayerId, b: PlayerId) -> bool;
    /// True when `a` currently embargoes `b`
    fn has_embargo_against(&self, a: PlayerId, b: PlayerId) -> bool;
    fn can_send_alliance_request(&self, from: PlayerId, to: PlayerId) -> bool;

    /// Factions that have asked `id` for an alliance and await a reply
    fn pending_alliance_requests(&self, _id: PlayerId) -> Vec<PlayerId> {
        Vec::new()
    }

    /// Allies of `id` whose alliance is about to expire
    fn expiring_alliances(&self, _id: PlayerId) -> Vec<PlayerId> {
        Vec::new()
    }

    fn relation(&self, id: PlayerId, other: PlayerId) -> Relation {
        Relation::from_score(self.relation_score(id, other))
    }

    fn is_friendly(&self, a: PlayerId, b: PlayerId) -> bool {
        self.is_on_same_team(a, b) || self.is_allied(a, b)
    }

    /// Factions owning land next to `id`'s border, in first-seen order
    fn neighbors_of(&self, id: PlayerId) -> Vec<PlayerId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for tile in self.border_tiles(id) {
            for n in self.neighbors(tile) {
                if let Some(owner) = self.owner(n) {
                    if owner != id && seen.insert(owner) {
                        out.push(owner);
                    }
                }
            }
        }
        out
    }

    fn shares_border_with(&self, a: PlayerId, b: PlayerId) -> bool {
        self.border_tiles(a)
            .into_iter()
            .any(|t| self.neighbors(t).into_iter().any(|n| self.owner(n) == Some(b)))
    }

    // --- economy ---

    fn unit_cost(&self, unit: UnitType, player: PlayerId) -> Gold;
    /// Build-feasibility check for placing `unit` at `tile`
    fn can_build(&self, player: PlayerId, unit: UnitType, tile: TileRef) -> bool;
}

/// The manhattan-closest pair `(x from xs, y from ys)`. `None` if either is empty.
pub fn closest_two_tiles<G: GameView + ?Sized>(
    game: &G,
    xs: &[TileRef],
    ys: &[TileRef],
) -> Option<(TileRef, TileRef)> {
    let mut best: Option<(TileRef, TileRef, u32)> = None;
    for &x in xs {
        for &y in ys {
            let d = game.manhattan_dist(x, y);
            if best.map_or(true, |(_, _, bd)| d < bd) {
                best = Some((x, y, d));
            }
        }
    }
    best.map(|(x, y, _)| (x, y))
}

/// Axis-aligned bounding box of a set of tiles, as `(min, max)` cells
pub fn bounding_box<G: GameView + ?Sized>(game: &G, tiles: &[TileRef]) -> Option<(Cell, Cell)> {
    let mut iter = tiles.iter().map(|&t| game.cell(t));
    let first = iter.next()?;
    Some(iter.fold((first, first), |(min, max), c| {
        (
            Cell::new(min.x.min(c.x), min.y.min(c.y)),
            Cell::new(max.x.max(c.x), max.y.max(c.y)),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridWorld;

    fn world() -> GridWorld {
        GridWorld::from_rows(&[
            "~~~~~~", //
            "~....~", //
            "~.^h.~", //
            "~....~", //
            "~~~~~~",
        ])
    }

    #[test]
    fn test_coordinates_round_trip() {
        let w = world();
        let t = w.tile_ref(3, 2);
        assert_eq!(t, 15);
        assert_eq!(w.cell(t), Cell::new(3, 2));
        assert!(!w.is_valid_coord(6, 0));
        assert!(!w.is_valid_coord(-1, 0));
    }

    #[test]
    fn test_neighbors_clip_at_edges() {
        let w = world();
        assert_eq!(w.neighbors(0).len(), 2);
        assert_eq!(w.neighbors(w.tile_ref(2, 2)).len(), 4);
    }

    #[test]
    fn test_ocean_shore() {
        let w = world();
        assert!(w.is_ocean_shore(w.tile_ref(1, 1)));
        assert!(!w.is_ocean_shore(w.tile_ref(2, 2)));
        assert!(!w.is_ocean_shore(w.tile_ref(0, 0)));
    }

    #[test]
    fn test_distances() {
        let w = world();
        let a = w.tile_ref(1, 1);
        let b = w.tile_ref(4, 3);
        assert_eq!(w.manhattan_dist(a, b), 5);
        assert_eq!(w.euclidean_dist_squared(a, b), 13);
    }

    #[test]
    fn test_bfs_respects_filter() {
        let w = world();
        let start = w.tile_ref(1, 1);
        let land = w.bfs(start, &|t| w.is_land(t));
        assert_eq!(land.len(), 12);
        assert_eq!(land[0], start);

        let near = w.bfs(start, &|t| w.manhattan_dist(start, t) <= 1);
        assert_eq!(near.len(), 5);
    }

    #[test]
    fn test_closest_two_tiles() {
        let w = world();
        let xs = [w.tile_ref(1, 1), w.tile_ref(4, 1)];
        let ys = [w.tile_ref(4, 3)];
        assert_eq!(closest_two_tiles(&w, &xs, &ys), Some((w.tile_ref(4, 1), ys[0])));
        assert_eq!(closest_two_tiles(&w, &[], &ys), None);
    }

    #[test]
    fn test_bounding_box() {
        let w = world();
        let tiles = [w.tile_ref(2, 1), w.tile_ref(4, 3), w.tile_ref(1, 2)];
        assert_eq!(
            bounding_box(&w, &tiles),
            Some((Cell::new(1, 1), Cell::new(4, 3)))
        );
        assert_eq!(bounding_box(&w, &[]), None);
    }
}
