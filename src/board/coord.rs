//! Grid coordinates for the board (4-connected square grid)

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Column/row coordinate of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance, the move count on an open board
    pub fn manhattan(&self, other: &Self) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Straight-line distance in board units
    pub fn euclidean(&self, other: &Self) -> f32 {
        self.to_vec2().distance(other.to_vec2())
    }

    /// The 4 orthogonal neighbors (may lie off the board)
    pub fn neighbors(&self) -> [TileCoord; 4] {
        [
            TileCoord::new(self.x + 1, self.y),
            TileCoord::new(self.x, self.y - 1),
            TileCoord::new(self.x - 1, self.y),
            TileCoord::new(self.x, self.y + 1),
        ]
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = TileCoord::new(0, 0);
        let b = TileCoord::new(3, 4);
        assert_eq!(a.manhattan(&b), 7);
        assert_eq!(a.manhattan(&a), 0);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = TileCoord::new(0, 0);
        let b = TileCoord::new(3, 4);
        assert!((a.euclidean(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let center = TileCoord::new(5, 5);
        for n in center.neighbors() {
            assert_eq!(center.manhattan(&n), 1);
        }
    }
}
