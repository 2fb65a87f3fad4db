//! Scenario files and seeded scenario generation
//!
//! A scenario is a board snapshot plus the threats a detector reported for
//! it. Scenarios load from JSON or TOML and can be generated from a seed.

use std::fs;
use std::path::Path;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::core::error::{InterceptError, Result};
use crate::core::types::{PlayerId, TeamId, ThreatId, TileId, Turn};
use crate::threat::{Threat, ThreatKind, TilePath};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSpec {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub owner: Option<PlayerId>,
    #[serde(default)]
    pub army: i32,
    #[serde(default)]
    pub general: bool,
    #[serde(default)]
    pub city: bool,
    #[serde(default)]
    pub obstacle: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatSpec {
    /// Defaults to the threat's position in the list
    #[serde(default)]
    pub id: Option<u32>,
    pub kind: ThreatKind,
    pub player: PlayerId,
    /// Tile coordinates, origin first
    pub path: Vec<[i32; 2]>,
    #[serde(default)]
    pub value: f32,
    #[serde(default)]
    pub save_tile: Option<[i32; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSpec {
    pub player: PlayerId,
    pub team: TeamId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSpec {
    pub player: PlayerId,
    pub from: [i32; 2],
    pub to: [i32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub turn: Turn,
    /// Player the interception is planned for
    #[serde(default)]
    pub player: PlayerId,
    #[serde(default)]
    pub teams: Vec<TeamSpec>,
    #[serde(default)]
    pub tiles: Vec<TileSpec>,
    #[serde(default)]
    pub threats: Vec<ThreatSpec>,
    #[serde(default)]
    pub last_moves: Vec<MoveSpec>,
}

fn tile_id(board: &Board, [x, y]: [i32; 2]) -> Result<TileId> {
    board.id_at(x, y).ok_or(InterceptError::OffBoard { x, y })
}

impl Scenario {
    pub fn from_json_str(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a scenario file; `.toml` files parse as TOML, anything else as JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Board with every tile override applied, without threats
    pub fn build_board(&self) -> Result<Board> {
        if self.width == 0 || self.height == 0 {
            return Err(InterceptError::InvalidConfig(format!(
                "board must not be empty ({}x{})",
                self.width, self.height
            )));
        }
        let mut board = Board::new(self.width, self.height, self.player);
        board.turn = self.turn;
        for team in &self.teams {
            board.set_team(team.player, team.team);
        }

        for spec in &self.tiles {
            let id = tile_id(&board, [spec.x, spec.y])?;
            if spec.general {
                let owner = spec.owner.ok_or_else(|| {
                    InterceptError::InvalidConfig(format!("general at ({}, {}) has no owner", spec.x, spec.y))
                })?;
                board.set_general(id, owner, spec.army);
            } else {
                board.set_owner(id, spec.owner, spec.army);
            }
            board.set_city(id, spec.city);
        }
        let obstacles = self
            .tiles
            .iter()
            .filter(|s| s.obstacle)
            .map(|s| tile_id(&board, [s.x, s.y]))
            .collect::<Result<Vec<_>>>()?;
        if !obstacles.is_empty() {
            board.set_obstacles(obstacles);
        }

        for mv in &self.last_moves {
            let from = tile_id(&board, mv.from)?;
            let to = tile_id(&board, mv.to)?;
            board.record_move(mv.player, from, to);
        }
        Ok(board)
    }

    pub fn build(&self) -> Result<(Board, Vec<Threat>)> {
        let board = self.build_board()?;
        let mut threats = Vec::with_capacity(self.threats.len());
        for (i, spec) in self.threats.iter().enumerate() {
            let tiles = spec
                .path
                .iter()
                .map(|&c| tile_id(&board, c))
                .collect::<Result<Vec<_>>>()?;
            if let Some(pair) = tiles.windows(2).find(|w| !board.adjacent(w[0], w[1])) {
                return Err(InterceptError::InvalidConfig(format!(
                    "threat {} steps from {} to non-adjacent {}",
                    i, pair[0], pair[1]
                )));
            }
            let path = TilePath::from_tiles(&tiles)?;
            let id = ThreatId(spec.id.unwrap_or(i as u32));
            let mut threat = Threat::new(id, spec.kind, spec.player, path, spec.value);
            if let Some(save) = spec.save_tile {
                threat = threat.with_save_tile(tile_id(&board, save)?);
            }
            threats.push(threat);
        }
        Ok((board, threats))
    }

    /// Seeded random scenario: an enemy stack on the west edge pushing into
    /// our territory on the east half, with our general on the east edge
    pub fn random_corridor(seed: u64, width: u32, height: u32) -> Result<Self> {
        if width < 6 || height < 3 {
            return Err(InterceptError::InvalidConfig(format!(
                "random corridor needs at least 6x3, got {}x{}",
                width, height
            )));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let us = PlayerId(0);
        let enemy = PlayerId(1);
        let (w, h) = (width as i32, height as i32);
        let lane = h / 2;
        let origin = [0, lane];
        let general = [w - 1, rng.gen_range(0..h)];

        let mut tiles = Vec::new();
        tiles.push(TileSpec {
            x: origin[0],
            y: origin[1],
            owner: Some(enemy),
            army: rng.gen_range(30..60),
            general: false,
            city: false,
            obstacle: false,
        });

        let stack = [rng.gen_range(w / 2..w - 1), rng.gen_range(0..h)];
        for y in 0..h {
            for x in 1..w {
                // The lane and the east edge stay open so the general is reachable
                let open = y == lane || x == w - 1 || [x, y] == stack;
                if !open && rng.gen_bool(0.15) {
                    tiles.push(TileSpec {
                        x,
                        y,
                        owner: None,
                        army: 0,
                        general: false,
                        city: false,
                        obstacle: true,
                    });
                    continue;
                }
                if x < w / 2 {
                    continue;
                }
                let army = if [x, y] == stack {
                    rng.gen_range(20..50)
                } else {
                    rng.gen_range(1..3)
                };
                tiles.push(TileSpec {
                    x,
                    y,
                    owner: Some(us),
                    army,
                    general: [x, y] == general,
                    city: [x, y] != general && [x, y] != stack && rng.gen_bool(0.05),
                    obstacle: false,
                });
            }
        }

        let mut scenario = Scenario {
            width,
            height,
            turn: rng.gen_range(0..50),
            player: us,
            teams: Vec::new(),
            tiles,
            threats: Vec::new(),
            last_moves: Vec::new(),
        };

        let board = scenario.build_board()?;
        let from = tile_id(&board, origin)?;
        let mut targets = vec![(ThreatKind::Kill, general)];
        for _ in 0..rng.gen_range(1..3) {
            targets.push((ThreatKind::Econ, [rng.gen_range(w / 2..w), rng.gen_range(0..h)]));
        }
        for (kind, target) in targets {
            let to = tile_id(&board, target)?;
            let Some(path) = board.shortest_path(from, to) else {
                continue;
            };
            if path.is_empty() {
                continue;
            }
            let coords = path
                .tiles()
                .map(|t| {
                    let c = board.tile(t).coord;
                    [c.x, c.y]
                })
                .collect();
            scenario.threats.push(ThreatSpec {
                id: None,
                kind,
                player: enemy,
                path: coords,
                value: rng.gen_range(10.0..100.0),
                save_tile: None,
            });
        }
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "width": 6,
        "height": 1,
        "player": 0,
        "tiles": [
            { "x": 0, "y": 0, "owner": 1, "army": 20 },
            { "x": 4, "y": 0, "owner": 0, "army": 8 },
            { "x": 5, "y": 0, "owner": 0, "army": 1, "general": true }
        ],
        "threats": [
            { "kind": "Kill", "player": 1, "value": 40.0,
              "path": [[0, 0], [1, 0], [2, 0], [3, 0], [4, 0], [5, 0]] }
        ]
    }"#;

    #[test]
    fn test_build_from_json() {
        let scenario = Scenario::from_json_str(JSON).unwrap();
        let (board, threats) = scenario.build().unwrap();

        assert_eq!(board.tile(TileId(0)).army, 20);
        assert_eq!(board.general_of(PlayerId(0)), Some(TileId(5)));
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].id, ThreatId(0));
        assert_eq!(threats[0].length(), 5);
        assert!(threats[0].is_kill());
    }

    #[test]
    fn test_build_from_toml() {
        let toml = r#"
            width = 4
            height = 2
            turn = 12

            [[tiles]]
            x = 1
            y = 1
            obstacle = true

            [[threats]]
            kind = "Econ"
            player = 1
            path = [[0, 0], [1, 0], [2, 0]]
            save_tile = [1, 0]
        "#;
        let (board, threats) = Scenario::from_toml_str(toml).unwrap().build().unwrap();
        assert_eq!(board.turn, 12);
        assert!(board.tile_at(1, 1).unwrap().is_obstacle);
        assert_eq!(threats[0].save_tile, board.id_at(1, 0));
    }

    #[test]
    fn test_obstacles_rebuild_distances_once() {
        let mut scenario = Scenario::from_json_str(JSON).unwrap();
        scenario.height = 3;
        for x in 1..4 {
            scenario.tiles.push(TileSpec {
                x,
                y: 1,
                owner: None,
                army: 0,
                general: false,
                city: false,
                obstacle: true,
            });
        }
        let board = scenario.build_board().unwrap();
        assert_eq!(board.distance_builds(), 2);
        assert!(board.tile_at(2, 1).unwrap().is_obstacle);
        assert_eq!(board.distance(board.id_at(2, 0).unwrap(), board.id_at(2, 2).unwrap()), Some(6));
    }

    #[test]
    fn test_off_board_tile_rejected() {
        let mut scenario = Scenario::from_json_str(JSON).unwrap();
        scenario.threats[0].path.push([6, 0]);
        assert!(matches!(scenario.build(), Err(InterceptError::OffBoard { x: 6, y: 0 })));
    }

    #[test]
    fn test_teleporting_threat_rejected() {
        let mut scenario = Scenario::from_json_str(JSON).unwrap();
        scenario.threats[0].path = vec![[0, 0], [2, 0]];
        assert!(matches!(scenario.build(), Err(InterceptError::InvalidConfig(_))));
    }

    #[test]
    fn test_random_corridor_is_seeded() {
        let a = Scenario::random_corridor(7, 16, 9).unwrap();
        let b = Scenario::random_corridor(7, 16, 9).unwrap();
        assert_eq!(a, b);

        let (board, threats) = a.build().unwrap();
        assert!(!threats.is_empty());
        let origin = threats[0].origin();
        assert!(threats.iter().all(|t| t.origin() == origin));
        assert!(board.general_of(PlayerId(0)).is_some());
    }

    #[test]
    fn test_random_corridor_too_small() {
        assert!(Scenario::random_corridor(1, 3, 3).is_err());
    }
}
