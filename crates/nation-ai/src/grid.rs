//! Grid World
//!
//! A small in-memory simulation implementing [`GameView`]. It is the fixture
//! the planners are tested against and the world the scenario runner drives.
//! `apply` performs the bookkeeping side of each command; combat is not
//! simulated, so attacks, strikes and transports are only recorded.

use std::collections::{BTreeSet, HashMap};

use nation_commands::{
    Command, CommandRecord, Difficulty, EmbargoAction, Gold, PlayerId, PlayerType, Relation,
    TerrainType, Tick, TileRef, UnitType,
};
use thiserror::Error;

use crate::game::{GameView, UnitView};

/// Land claimed around a spawn tile (euclidean)
const SPAWN_RADIUS: u64 = 2;

/// Outer blast radius of an atom bomb
const ATOM_BOMB_OUTER_RADIUS: u32 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("command issued by unknown nation {0:?}")]
    UnknownIssuer(String),
}

/// Map glyphs: `~` ocean, `-` lake, `.` plains, `h` highland, `^` mountain
pub fn terrain_from_glyph(glyph: char) -> Option<TerrainType> {
    match glyph {
        '~' => Some(TerrainType::Ocean),
        '-' => Some(TerrainType::Lake),
        '.' => Some(TerrainType::Plains),
        'h' => Some(TerrainType::Highland),
        '^' => Some(TerrainType::Mountain),
        _ => None,
    }
}

fn default_magnitude(terrain: TerrainType) -> u8 {
    match terrain {
        TerrainType::Plains => 0,
        TerrainType::Highland => 10,
        TerrainType::Mountain => 20,
        TerrainType::Lake | TerrainType::Ocean => 0,
    }
}

/// Flat cost table
pub fn base_cost(unit: UnitType) -> Gold {
    match unit {
        UnitType::City => 125_000,
        UnitType::Port => 125_000,
        UnitType::Warship => 250_000,
        UnitType::Factory => 125_000,
        UnitType::MissileSilo => 1_000_000,
        UnitType::DefensePost => 50_000,
        UnitType::SamLauncher => 1_500_000,
        UnitType::AtomBomb => 750_000,
        UnitType::TransportShip => 0,
    }
}

#[derive(Debug, Clone)]
struct Faction {
    identity: String,
    name: String,
    player_type: PlayerType,
    troops: u64,
    gold: Gold,
    fear: f64,
    traitor: bool,
    team: Option<u32>,
}

fn pair(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Rectangular tile world with factions, units and diplomacy tables
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: u32,
    height: u32,
    terrain: Vec<TerrainType>,
    magnitude: Vec<u8>,
    owner: Vec<Option<PlayerId>>,
    factions: Vec<Faction>,
    units: Vec<UnitView>,
    relations: HashMap<(PlayerId, PlayerId), i32>,
    /// Unordered pairs
    alliances: BTreeSet<(PlayerId, PlayerId)>,
    expiring: BTreeSet<(PlayerId, PlayerId)>,
    /// `(from, against)`
    embargoes: BTreeSet<(PlayerId, PlayerId)>,
    /// `(from, to)` in arrival order
    alliance_requests: Vec<(PlayerId, PlayerId)>,
    /// Commands with no bookkeeping effect
    recorded: Vec<CommandRecord>,
    ticks: Tick,
    spawn_phase_until: Tick,
    difficulty: Difficulty,
}

impl GridWorld {
    /// Build from ASCII rows. Short rows are padded with ocean and unknown
    /// glyphs read as ocean; use [`terrain_from_glyph`] to validate input first.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let mut terrain = Vec::with_capacity((width * height) as usize);
        for row in rows {
            let mut glyphs = row.chars();
            for _ in 0..width {
                let t = glyphs
                    .next()
                    .and_then(terrain_from_glyph)
                    .unwrap_or(TerrainType::Ocean);
                terrain.push(t);
            }
        }
        let magnitude = terrain.iter().map(|&t| default_magnitude(t)).collect();
        let size = terrain.len();
        Self {
            width,
            height,
            terrain,
            magnitude,
            owner: vec![None; size],
            factions: Vec::new(),
            units: Vec::new(),
            relations: HashMap::new(),
            alliances: BTreeSet::new(),
            expiring: BTreeSet::new(),
            embargoes: BTreeSet::new(),
            alliance_requests: Vec::new(),
            recorded: Vec::new(),
            ticks: 0,
            spawn_phase_until: 0,
            difficulty: Difficulty::default(),
        }
    }

    fn faction(&self, id: PlayerId) -> Option<&Faction> {
        self.factions.get(id.0 as usize)
    }

    fn faction_mut(&mut self, id: PlayerId) -> Option<&mut Faction> {
        self.factions.get_mut(id.0 as usize)
    }

    fn in_bounds(&self, tile: TileRef) -> bool {
        (tile as usize) < self.terrain.len()
    }

    // --- setup ---

    pub fn add_player(&mut self, identity: &str, name: &str, player_type: PlayerType) -> PlayerId {
        let id = PlayerId(self.factions.len() as u32);
        self.factions.push(Faction {
            identity: identity.to_string(),
            name: name.to_string(),
            player_type,
            troops: 0,
            gold: 0,
            fear: 0.0,
            traitor: false,
            team: None,
        });
        id
    }

    pub fn claim(&mut self, player: PlayerId, tile: TileRef) {
        if self.in_bounds(tile) && self.terrain[tile as usize].is_land() {
            self.owner[tile as usize] = Some(player);
        }
    }

    /// Claim every land tile in the inclusive rectangle
    pub fn claim_rect(&mut self, player: PlayerId, x0: i64, y0: i64, x1: i64, y1: i64) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                if self.is_valid_coord(x, y) {
                    let tile = self.tile_ref(x, y);
                    self.claim(player, tile);
                }
            }
        }
    }

    pub fn add_unit(&mut self, owner: PlayerId, unit_type: UnitType, tile: TileRef) {
        self.units.push(UnitView {
            unit_type,
            tile,
            owner,
        });
    }

    pub fn set_magnitude(&mut self, tile: TileRef, magnitude: u8) {
        if self.in_bounds(tile) {
            self.magnitude[tile as usize] = magnitude;
        }
    }

    pub fn set_troops(&mut self, player: PlayerId, troops: u64) {
        if let Some(f) = self.faction_mut(player) {
            f.troops = troops;
        }
    }

    pub fn set_gold(&mut self, player: PlayerId, gold: Gold) {
        if let Some(f) = self.faction_mut(player) {
            f.gold = gold;
        }
    }

    pub fn set_fear(&mut self, player: PlayerId, fear: f64) {
        if let Some(f) = self.faction_mut(player) {
            f.fear = fear;
        }
    }

    pub fn set_traitor(&mut self, player: PlayerId, traitor: bool) {
        if let Some(f) = self.faction_mut(player) {
            f.traitor = traitor;
        }
    }

    pub fn set_team(&mut self, player: PlayerId, team: u32) {
        if let Some(f) = self.faction_mut(player) {
            f.team = Some(team);
        }
    }

    /// One-directional relation score, clamped to the valid range
    pub fn set_relation(&mut self, from: PlayerId, to: PlayerId, score: i32) {
        self.relations
            .insert((from, to), score.clamp(Relation::MIN_SCORE, Relation::MAX_SCORE));
    }

    pub fn set_allied(&mut self, a: PlayerId, b: PlayerId, allied: bool) {
        if allied {
            self.alliances.insert(pair(a, b));
            self.alliance_requests
                .retain(|&(from, to)| pair(from, to) != pair(a, b));
        } else {
            self.alliances.remove(&pair(a, b));
            self.expiring.remove(&pair(a, b));
        }
    }

    pub fn set_alliance_expiring(&mut self, a: PlayerId, b: PlayerId, expiring: bool) {
        if expiring && self.alliances.contains(&pair(a, b)) {
            self.expiring.insert(pair(a, b));
        } else {
            self.expiring.remove(&pair(a, b));
        }
    }

    pub fn set_embargo(&mut self, from: PlayerId, against: PlayerId, active: bool) {
        if active {
            self.embargoes.insert((from, against));
        } else {
            self.embargoes.remove(&(from, against));
        }
    }

    pub fn request_alliance(&mut self, from: PlayerId, to: PlayerId) {
        if !self.alliance_requests.contains(&(from, to)) {
            self.alliance_requests.push((from, to));
        }
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn set_spawn_phase(&mut self, on: bool) {
        self.spawn_phase_until = if on { Tick::MAX } else { 0 };
    }

    /// Spawn phase lasts until tick `ticks`
    pub fn set_spawn_phase_length(&mut self, ticks: Tick) {
        self.spawn_phase_until = ticks;
    }

    pub fn end_spawn_phase(&mut self) {
        self.spawn_phase_until = 0;
    }

    pub fn advance_tick(&mut self) {
        self.ticks += 1;
    }

    /// Remove a faction's territory and units
    pub fn eliminate(&mut self, player: PlayerId) {
        for owner in self.owner.iter_mut() {
            if *owner == Some(player) {
                *owner = None;
            }
        }
        self.units.retain(|u| u.owner != player);
    }

    /// Commands that had no bookkeeping effect, in arrival order
    pub fn recorded(&self) -> &[CommandRecord] {
        &self.recorded
    }

    pub fn tile_count(&self, player: PlayerId) -> usize {
        self.owner.iter().filter(|&&o| o == Some(player)).count()
    }

    // --- command application ---

    /// Apply one command's bookkeeping effect
    pub fn apply(&mut self, record: &CommandRecord) -> Result<(), GridError> {
        let issuer = match (self.find_player(&record.issuer), &record.command) {
            (Some(id), _) => id,
            (None, Command::Spawn { .. }) => {
                self.add_player(&record.issuer, &record.issuer, PlayerType::Nation)
            }
            (None, _) => return Err(GridError::UnknownIssuer(record.issuer.clone())),
        };

        match record.command {
            Command::Spawn { tile } => self.spawn_at(issuer, tile),
            Command::Construct { unit, tile } => {
                if self.can_build(issuer, unit, tile) {
                    let cost = self.unit_cost(unit, issuer);
                    if let Some(f) = self.faction_mut(issuer) {
                        f.gold -= cost;
                    }
                    self.add_unit(issuer, unit, tile);
                }
            }
            Command::UpdateRelation { other, delta } => {
                let score = self.relation_score(issuer, other).saturating_add(delta);
                self.set_relation(issuer, other, score);
            }
            Command::Embargo { target, action } => {
                self.set_embargo(issuer, target, action == EmbargoAction::Start);
            }
            Command::AllianceRequest { recipient } => {
                if self.can_send_alliance_request(issuer, recipient) {
                    self.request_alliance(issuer, recipient);
                }
            }
            Command::AllianceReply { requestor, accept } => {
                self.alliance_requests
                    .retain(|&r| r != (requestor, issuer));
                if accept {
                    self.set_allied(issuer, requestor, true);
                }
            }
            Command::AllianceExtension { ally } => {
                self.set_alliance_expiring(issuer, ally, false);
            }
            Command::AttenuateFear { factor } => {
                if let Some(f) = self.faction_mut(issuer) {
                    f.fear *= factor;
                }
            }
            Command::Attack { .. }
            | Command::Nuke { .. }
            | Command::TransportShip { .. }
            | Command::Emoji { .. } => self.recorded.push(record.clone()),
        }
        Ok(())
    }

    fn spawn_at(&mut self, player: PlayerId, tile: TileRef) {
        if !self.in_bounds(tile) {
            return;
        }
        // A repeated spawn moves the nation rather than growing it
        for owner in self.owner.iter_mut() {
            if *owner == Some(player) {
                *owner = None;
            }
        }
        let r = SPAWN_RADIUS as i64;
        let center = self.cell(tile);
        for dy in -r..=r {
            for dx in -r..=r {
                if (dx * dx + dy * dy) as u64 > SPAWN_RADIUS * SPAWN_RADIUS {
                    continue;
                }
                let (x, y) = (center.x as i64 + dx, center.y as i64 + dy);
                if !self.is_valid_coord(x, y) {
                    continue;
                }
                let t = self.tile_ref(x, y);
                if self.owner[t as usize].is_none() {
                    self.claim(player, t);
                }
            }
        }
    }
}

impl GameView for GridWorld {
    fn ticks(&self) -> Tick {
        self.ticks
    }

    fn in_spawn_phase(&self) -> bool {
        self.ticks < self.spawn_phase_until
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn nuke_outer_radius(&self, payload: UnitType) -> u32 {
        match payload {
            UnitType::AtomBomb => ATOM_BOMB_OUTER_RADIUS,
            _ => 0,
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn terrain(&self, tile: TileRef) -> TerrainType {
        self.terrain
            .get(tile as usize)
            .copied()
            .unwrap_or(TerrainType::Ocean)
    }

    fn magnitude(&self, tile: TileRef) -> u8 {
        self.magnitude.get(tile as usize).copied().unwrap_or(0)
    }

    fn owner(&self, tile: TileRef) -> Option<PlayerId> {
        self.owner.get(tile as usize).copied().flatten()
    }

    fn player_ids(&self) -> Vec<PlayerId> {
        (0..self.factions.len() as u32).map(PlayerId).collect()
    }

    fn find_player(&self, identity: &str) -> Option<PlayerId> {
        self.factions
            .iter()
            .position(|f| f.identity == identity)
            .map(|i| PlayerId(i as u32))
    }

    fn player_type(&self, id: PlayerId) -> PlayerType {
        self.faction(id).map_or(PlayerType::Bot, |f| f.player_type)
    }

    fn name(&self, id: PlayerId) -> String {
        self.faction(id).map_or_else(|| id.to_string(), |f| f.name.clone())
    }

    fn is_alive(&self, id: PlayerId) -> bool {
        self.faction(id).is_some() && self.owner.iter().any(|&o| o == Some(id))
    }

    fn is_traitor(&self, id: PlayerId) -> bool {
        self.faction(id).is_some_and(|f| f.traitor)
    }

    fn troops(&self, id: PlayerId) -> u64 {
        self.faction(id).map_or(0, |f| f.troops)
    }

    fn gold(&self, id: PlayerId) -> Gold {
        self.faction(id).map_or(0, |f| f.gold)
    }

    fn fear(&self, id: PlayerId) -> f64 {
        self.faction(id).map_or(0.0, |f| f.fear)
    }

    fn owned_tiles(&self, id: PlayerId) -> Vec<TileRef> {
        self.owner
            .iter()
            .enumerate()
            .filter(|(_, &o)| o == Some(id))
            .map(|(i, _)| i as TileRef)
            .collect()
    }

    fn border_tiles(&self, id: PlayerId) -> Vec<TileRef> {
        self.owned_tiles(id)
            .into_iter()
            .filter(|&t| self.neighbors(t).into_iter().any(|n| self.owner(n) != Some(id)))
            .collect()
    }

    fn units(&self, id: PlayerId, types: &[UnitType]) -> Vec<UnitView> {
        self.units
            .iter()
            .filter(|u| u.owner == id && (types.is_empty() || types.contains(&u.unit_type)))
            .copied()
            .collect()
    }

    fn relation_score(&self, id: PlayerId, other: PlayerId) -> i32 {
        self.relations.get(&(id, other)).copied().unwrap_or(0)
    }

    fn is_on_same_team(&self, a: PlayerId, b: PlayerId) -> bool {
        match (self.faction(a).and_then(|f| f.team), self.faction(b).and_then(|f| f.team)) {
            (Some(ta), Some(tb)) => ta == tb,
            _ => false,
        }
    }

    fn is_allied(&self, a: PlayerId, b: PlayerId) -> bool {
        self.alliances.contains(&pair(a, b))
    }

    fn has_embargo_against(&self, a: PlayerId, b: PlayerId) -> bool {
        self.embargoes.contains(&(a, b))
    }

    fn can_send_alliance_request(&self, from: PlayerId, to: PlayerId) -> bool {
        from != to
            && self.is_alive(from)
            && self.is_alive(to)
            && !self.is_allied(from, to)
            && !self.is_on_same_team(from, to)
            && !self.alliance_requests.contains(&(from, to))
    }

    fn pending_alliance_requests(&self, id: PlayerId) -> Vec<PlayerId> {
        self.alliance_requests
            .iter()
            .filter(|&&(_, to)| to == id)
            .map(|&(from, _)| from)
            .collect()
    }

    fn expiring_alliances(&self, id: PlayerId) -> Vec<PlayerId> {
        self.expiring
            .iter()
            .filter_map(|&(a, b)| match (a == id, b == id) {
                (true, _) => Some(b),
                (_, true) => Some(a),
                _ => None,
            })
            .collect()
    }

    fn unit_cost(&self, unit: UnitType, _player: PlayerId) -> Gold {
        base_cost(unit)
    }

    fn can_build(&self, player: PlayerId, unit: UnitType, tile: TileRef) -> bool {
        if !self.in_bounds(tile) || self.gold(player) < self.unit_cost(unit, player) {
            return false;
        }
        match unit {
            UnitType::AtomBomb => self.units_owned(player, UnitType::MissileSilo) > 0,
            UnitType::Warship => self.is_ocean(tile) && self.units_owned(player, UnitType::Port) > 0,
            UnitType::TransportShip => false,
            UnitType::City
            | UnitType::Port
            | UnitType::Factory
            | UnitType::MissileSilo
            | UnitType::DefensePost
            | UnitType::SamLauncher => {
                let occupied = self
                    .units
                    .iter()
                    .any(|u| u.tile == tile && u.unit_type.is_structure());
                self.owner(tile) == Some(player)
                    && self.is_land(tile)
                    && !occupied
                    && (unit != UnitType::Port || self.is_ocean_shore(tile))
            }
        }
    }
}
