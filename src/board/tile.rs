//! A single board tile

use serde::{Deserialize, Serialize};

use crate::board::coord::TileCoord;
use crate::core::types::{PlayerId, TileId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub coord: TileCoord,
    /// `None` for neutral tiles
    pub owner: Option<PlayerId>,
    pub army: i32,
    pub is_general: bool,
    pub is_city: bool,
    /// Mountains and other impassable terrain
    pub is_obstacle: bool,
}

impl Tile {
    pub fn new(id: TileId, coord: TileCoord) -> Self {
        Self {
            id,
            coord,
            owner: None,
            army: 0,
            is_general: false,
            is_city: false,
            is_obstacle: false,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.owner.is_none()
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    /// Neutral cities block movement the same way mountains do for planning
    pub fn is_neutral_obstacle(&self) -> bool {
        self.is_obstacle || (self.is_city && self.is_neutral())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tile_is_neutral() {
        let tile = Tile::new(TileId(0), TileCoord::new(0, 0));
        assert!(tile.is_neutral());
        assert_eq!(tile.army, 0);
        assert!(!tile.is_neutral_obstacle());
    }

    #[test]
    fn test_neutral_city_is_obstacle() {
        let mut tile = Tile::new(TileId(0), TileCoord::new(0, 0));
        tile.is_city = true;
        assert!(tile.is_neutral_obstacle());

        tile.owner = Some(PlayerId(1));
        assert!(!tile.is_neutral_obstacle());
        assert!(tile.is_owned_by(PlayerId(1)));
    }
}
