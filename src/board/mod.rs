//! Board collaborator: grid, tiles, adjacency and distances
//!
//! Read-only to the interception engine.

pub mod coord;
pub mod distance;
pub mod grid;
pub mod tile;

pub use coord::TileCoord;
pub use distance::{bfs, DistanceMap, DistanceOracle};
pub use grid::Board;
pub use tile::Tile;
