//! The board: tiles, adjacency, teams and precomputed distances
//!
//! Tiles are stored row-major so `TileId` doubles as an index. Adjacency
//! skips obstacles; changing obstacles rebuilds adjacency and the distance
//! oracle once per call.

use ahash::AHashMap;
use glam::Vec2;

use crate::board::coord::TileCoord;
use crate::board::distance::{bfs, DistanceMap, DistanceOracle};
use crate::board::tile::Tile;
use crate::core::error::{InterceptError, Result};
use crate::core::types::{PlayerId, TeamId, TileId, Turn};
use crate::threat::path::TilePath;

#[derive(Debug, Clone)]
pub struct Board {
    pub width: u32,
    pub height: u32,
    pub turn: Turn,
    /// The player interceptions are planned for
    pub player: PlayerId,
    tiles: Vec<Tile>,
    adjacency: Vec<Vec<TileId>>,
    distances: DistanceOracle,
    distance_builds: u32,
    teams: AHashMap<PlayerId, TeamId>,
    last_moves: AHashMap<PlayerId, (TileId, TileId)>,
}

impl Board {
    /// Create an open board of empty neutral tiles
    pub fn new(width: u32, height: u32, player: PlayerId) -> Self {
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let id = TileId(tiles.len() as u32);
                tiles.push(Tile::new(id, TileCoord::new(x, y)));
            }
        }

        let mut board = Self {
            width,
            height,
            turn: 0,
            player,
            tiles,
            adjacency: Vec::new(),
            distances: DistanceOracle::default(),
            distance_builds: 0,
            teams: AHashMap::new(),
            last_moves: AHashMap::new(),
        };
        board.rebuild_adjacency();
        board
    }

    fn rebuild_adjacency(&mut self) {
        self.adjacency = self
            .tiles
            .iter()
            .map(|tile| {
                if tile.is_obstacle {
                    return Vec::new();
                }
                tile.coord
                    .neighbors()
                    .into_iter()
                    .filter_map(|c| self.id_at(c.x, c.y))
                    .filter(|id| !self.tiles[id.index()].is_obstacle)
                    .collect()
            })
            .collect();
        self.distances = DistanceOracle::build(&self.adjacency);
        self.distance_builds += 1;
    }

    /// Times the distance oracle has been built
    pub fn distance_builds(&self) -> u32 {
        self.distance_builds
    }

    pub fn id_at(&self, x: i32, y: i32) -> Option<TileId> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(TileId((y as u32) * self.width + x as u32))
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        self.id_at(x, y).map(|id| &self.tiles[id.index()])
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.index())
    }

    /// Tile lookup for ids that come from outside the board
    pub fn checked(&self, id: TileId) -> Result<&Tile> {
        self.get(id).ok_or(InterceptError::UnknownTile(id))
    }

    /// Tile by id. Ids handed out by this board are always valid.
    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.index()]
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Passable orthogonal neighbors
    pub fn neighbors(&self, id: TileId) -> &[TileId] {
        self.adjacency.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn adjacent(&self, a: TileId, b: TileId) -> bool {
        self.neighbors(a).contains(&b)
    }

    pub fn set_owner(&mut self, id: TileId, owner: Option<PlayerId>, army: i32) {
        if let Some(tile) = self.tiles.get_mut(id.index()) {
            tile.owner = owner;
            tile.army = army;
        }
    }

    pub fn set_army(&mut self, id: TileId, army: i32) {
        if let Some(tile) = self.tiles.get_mut(id.index()) {
            tile.army = army;
        }
    }

    pub fn set_city(&mut self, id: TileId, is_city: bool) {
        if let Some(tile) = self.tiles.get_mut(id.index()) {
            tile.is_city = is_city;
        }
    }

    /// Place a player's general
    pub fn set_general(&mut self, id: TileId, player: PlayerId, army: i32) {
        if let Some(tile) = self.tiles.get_mut(id.index()) {
            tile.owner = Some(player);
            tile.army = army;
            tile.is_general = true;
        }
    }

    pub fn set_obstacle(&mut self, id: TileId, is_obstacle: bool) {
        if let Some(tile) = self.tiles.get_mut(id.index()) {
            tile.is_obstacle = is_obstacle;
        }
        self.rebuild_adjacency();
    }

    /// Mark every tile in `ids` as an obstacle with a single rebuild
    pub fn set_obstacles(&mut self, ids: impl IntoIterator<Item = TileId>) {
        for id in ids {
            if let Some(tile) = self.tiles.get_mut(id.index()) {
                tile.is_obstacle = true;
            }
        }
        self.rebuild_adjacency();
    }

    pub fn set_team(&mut self, player: PlayerId, team: TeamId) {
        self.teams.insert(player, team);
    }

    /// Players without an explicit team are on a team of their own
    pub fn team_of(&self, player: PlayerId) -> TeamId {
        self.teams.get(&player).copied().unwrap_or(TeamId(player.0))
    }

    pub fn is_teammate(&self, a: PlayerId, b: PlayerId) -> bool {
        self.team_of(a) == self.team_of(b)
    }

    /// Whether `id` is owned by `player` or one of its teammates
    pub fn is_friendly_to(&self, id: TileId, player: PlayerId) -> bool {
        self.tile(id)
            .owner
            .is_some_and(|owner| self.is_teammate(owner, player))
    }

    /// Whether `id` belongs to the planning player's team
    pub fn is_friendly(&self, id: TileId) -> bool {
        self.is_friendly_to(id, self.player)
    }

    pub fn general_of(&self, player: PlayerId) -> Option<TileId> {
        self.tiles
            .iter()
            .find(|t| t.is_general && t.is_owned_by(player))
            .map(|t| t.id)
    }

    pub fn distance(&self, from: TileId, to: TileId) -> Option<u32> {
        self.distances.distance(from, to)
    }

    /// Distance lookup for callers whose invariants guarantee connectivity
    pub fn require_distance(&self, from: TileId, to: TileId) -> Result<u32> {
        self.distance(from, to)
            .ok_or(InterceptError::MissingDistance { from, to })
    }

    /// BFS over the board, optionally bounded
    pub fn distances_from(&self, sources: &[TileId], max_depth: Option<u32>) -> DistanceMap {
        bfs(&self.adjacency, sources, max_depth)
    }

    /// One shortest route from `from` to `to`, preferring lower tile ids on ties
    pub fn shortest_path(&self, from: TileId, to: TileId) -> Option<TilePath> {
        let to_goal = self.distances_from(&[to], None);
        let mut remaining = to_goal.get(from)?;
        let mut path = TilePath::new(from);
        let mut current = from;
        while remaining > 0 {
            let next = self
                .neighbors(current)
                .iter()
                .copied()
                .filter(|&n| to_goal.get(n) == Some(remaining - 1))
                .min()?;
            path.push(next);
            current = next;
            remaining -= 1;
        }
        Some(path)
    }

    pub fn position(&self, id: TileId) -> Vec2 {
        self.tile(id).coord.to_vec2()
    }

    pub fn euclidean(&self, a: TileId, b: TileId) -> f32 {
        self.tile(a).coord.euclidean(&self.tile(b).coord)
    }

    /// Whether `player`'s move resolves before `other`'s on `turn`.
    ///
    /// The lower player id moves first on even turns and the order flips on
    /// odd turns.
    pub fn has_move_priority(&self, player: PlayerId, other: PlayerId, turn: Turn) -> bool {
        if player == other {
            return true;
        }
        (turn % 2 == 0) == (player.0 < other.0)
    }

    pub fn record_move(&mut self, player: PlayerId, from: TileId, to: TileId) {
        self.last_moves.insert(player, (from, to));
    }

    pub fn last_move(&self, player: PlayerId) -> Option<(TileId, TileId)> {
        self.last_moves.get(&player).copied()
    }
}
