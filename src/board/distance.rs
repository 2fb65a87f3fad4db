//! Breadth-first distance maps and the all-pairs distance oracle
//!
//! Distances are move counts over the board's adjacency. Unreachable tiles
//! are `None` rather than a large sentinel.

use std::collections::VecDeque;

use serde::Serialize;

use crate::core::types::TileId;

/// Distance from a set of source tiles to every tile on the board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMap {
    dist: Vec<Option<u32>>,
}

impl DistanceMap {
    pub fn get(&self, tile: TileId) -> Option<u32> {
        self.dist.get(tile.index()).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.dist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dist.is_empty()
    }

    /// Tiles with a known distance, in id order
    pub fn reached(&self) -> impl Iterator<Item = (TileId, u32)> + '_ {
        self.dist
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.map(|d| (TileId(i as u32), d)))
    }
}

/// Multi-source BFS. Stops expanding past `max_depth` when given.
pub fn bfs(adjacency: &[Vec<TileId>], sources: &[TileId], max_depth: Option<u32>) -> DistanceMap {
    let mut dist = vec![None; adjacency.len()];
    let mut queue = VecDeque::new();

    for &source in sources {
        if source.index() < adjacency.len() && dist[source.index()].is_none() {
            dist[source.index()] = Some(0);
            queue.push_back(source);
        }
    }

    while let Some(current) = queue.pop_front() {
        let Some(current_dist) = dist[current.index()] else {
            continue;
        };
        if max_depth.is_some_and(|max| current_dist >= max) {
            continue;
        }
        for &next in &adjacency[current.index()] {
            if dist[next.index()].is_none() {
                dist[next.index()] = Some(current_dist + 1);
                queue.push_back(next);
            }
        }
    }

    DistanceMap { dist }
}

/// Precomputed distance matrix, one BFS row per landmark tile
#[derive(Debug, Clone, Default)]
pub struct DistanceOracle {
    tile_count: usize,
    rows: Vec<Option<u16>>,
}

impl DistanceOracle {
    /// Build the matrix with every tile as a landmark
    pub fn build(adjacency: &[Vec<TileId>]) -> Self {
        let tile_count = adjacency.len();
        let mut rows = Vec::with_capacity(tile_count * tile_count);
        for landmark in 0..tile_count {
            let map = bfs(adjacency, &[TileId(landmark as u32)], None);
            rows.extend(map.dist.iter().map(|d| d.and_then(|d| u16::try_from(d).ok())));
        }
        Self { tile_count, rows }
    }

    /// O(1) distance lookup
    pub fn distance(&self, from: TileId, to: TileId) -> Option<u32> {
        if from.index() >= self.tile_count || to.index() >= self.tile_count {
            return None;
        }
        self.rows[from.index() * self.tile_count + to.index()].map(u32::from)
    }
}
