//! Corridor analysis of a single predicted path
//!
//! Built once per threat and never mutated. The corridor is every tile on a
//! shortest route between the path's start and tail, plus the path's own
//! tiles when the prediction detours.

use std::collections::BTreeSet;

use ahash::AHashMap;
use serde::Serialize;

use crate::board::{Board, DistanceMap};
use crate::core::error::{InterceptError, Result};
use crate::core::types::TileId;
use crate::threat::path::TilePath;

#[derive(Debug, Clone, Serialize)]
pub struct PathAnalysis {
    pub origin: TileId,
    pub target: TileId,
    /// Moves along the analysed path
    pub path_length: u32,
    /// Distances from the path start
    pub from_origin: DistanceMap,
    /// Distances from the path tail
    pub to_target: DistanceMap,
    pub shortest_pathway: BTreeSet<TileId>,
    #[serde(skip)]
    pub choke_widths: AHashMap<TileId, u32>,
    #[serde(skip)]
    pub intercept_turn_offsets: AHashMap<TileId, u32>,
    /// Corridor tiles grouped by distance from the start
    pub tiles_by_distance: Vec<Vec<TileId>>,
}

impl PathAnalysis {
    pub fn is_on_corridor(&self, tile: TileId) -> bool {
        self.shortest_pathway.contains(&tile)
    }

    pub fn choke_width(&self, tile: TileId) -> Option<u32> {
        self.choke_widths.get(&tile).copied()
    }

    pub fn intercept_turn_offset(&self, tile: TileId) -> Option<u32> {
        self.intercept_turn_offsets.get(&tile).copied()
    }

    /// Corridor tiles plus their passable neighbors, in id order
    pub fn corridor_with_neighbors(&self, board: &Board) -> BTreeSet<TileId> {
        let mut tiles = self.shortest_pathway.clone();
        for &tile in &self.shortest_pathway {
            tiles.extend(board.neighbors(tile).iter().copied());
        }
        tiles
    }
}

/// Analyse `path`, exploring at most `max_depth` moves from either end
pub fn analyze_path(board: &Board, path: &TilePath, max_depth: u32) -> Result<PathAnalysis> {
    if path.is_empty() {
        return Err(InterceptError::EmptyPath);
    }
    let origin = path.start;
    let target = path.tail();
    let depth = max_depth.max(path.length());

    let from_origin = board.distances_from(&[origin], Some(depth));
    let to_target = board.distances_from(&[target], Some(depth));
    let shortest = from_origin
        .get(target)
        .ok_or(InterceptError::MissingDistance {
            from: origin,
            to: target,
        })?;

    let mut shortest_pathway: BTreeSet<TileId> = from_origin
        .reached()
        .filter(|&(tile, fwd)| to_target.get(tile).is_some_and(|bwd| fwd + bwd == shortest))
        .map(|(tile, _)| tile)
        .collect();
    shortest_pathway.extend(path.tiles());

    let mut tiles_by_distance: Vec<Vec<TileId>> = Vec::new();
    for &tile in &shortest_pathway {
        let Some(fwd) = from_origin.get(tile) else {
            continue;
        };
        let fwd = fwd as usize;
        if tiles_by_distance.len() <= fwd {
            tiles_by_distance.resize(fwd + 1, Vec::new());
        }
        tiles_by_distance[fwd].push(tile);
    }

    let mut choke_widths = AHashMap::new();
    let mut intercept_turn_offsets = AHashMap::new();
    for group in &tiles_by_distance {
        let width = group.len() as u32;
        for &tile in group {
            choke_widths.insert(tile, width);
            // Wider layers need lateral moves to guarantee contact
            intercept_turn_offsets.insert(tile, width / 2);
        }
    }

    Ok(PathAnalysis {
        origin,
        target,
        path_length: path.length(),
        from_origin,
        to_target,
        shortest_pathway,
        choke_widths,
        intercept_turn_offsets,
        tiles_by_distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;

    fn path_on(board: &Board, coords: &[(i32, i32)]) -> TilePath {
        let ids: Vec<TileId> = coords
            .iter()
            .map(|&(x, y)| board.id_at(x, y).unwrap())
            .collect();
        TilePath::from_tiles(&ids).unwrap()
    }

    #[test]
    fn test_straight_corridor_has_width_one() {
        let board = Board::new(5, 1, PlayerId(0));
        let path = path_on(&board, &[(0, 0), (1, 0), (2, 0), (3, 0)]);
        let analysis = analyze_path(&board, &path, 6).unwrap();

        assert_eq!(analysis.shortest_pathway.len(), 4);
        for tile in path.tiles() {
            assert_eq!(analysis.choke_width(tile), Some(1));
            assert_eq!(analysis.intercept_turn_offset(tile), Some(0));
        }
        assert!(!analysis.is_on_corridor(TileId(4)));
        assert_eq!(analysis.tiles_by_distance.len(), 4);
    }

    #[test]
    fn test_open_board_corridor_widens() {
        let board = Board::new(3, 3, PlayerId(0));
        // Diagonal corner to corner: every tile lies on some shortest route
        let path = path_on(&board, &[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]);
        let analysis = analyze_path(&board, &path, 6).unwrap();

        assert_eq!(analysis.shortest_pathway.len(), 9);
        let middle = board.id_at(1, 1).unwrap();
        assert_eq!(analysis.choke_width(middle), Some(3));
        assert_eq!(analysis.intercept_turn_offset(middle), Some(1));
        assert_eq!(analysis.choke_width(board.id_at(0, 0).unwrap()), Some(1));
    }

    #[test]
    fn test_empty_path_rejected() {
        let board = Board::new(3, 3, PlayerId(0));
        let result = analyze_path(&board, &TilePath::new(TileId(0)), 6);
        assert!(matches!(result, Err(InterceptError::EmptyPath)));
    }

    #[test]
    fn test_corridor_with_neighbors() {
        let board = Board::new(5, 3, PlayerId(0));
        let path = path_on(&board, &[(0, 1), (1, 1), (2, 1)]);
        let analysis = analyze_path(&board, &path, 6).unwrap();
        let area = analysis.corridor_with_neighbors(&board);
        assert!(area.contains(&board.id_at(1, 0).unwrap()));
        assert!(area.contains(&board.id_at(3, 1).unwrap()));
        assert!(!area.contains(&board.id_at(4, 1).unwrap()));
    }
}
