//! Predicted adversary paths

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::core::types::{PlayerId, ThreatId, TileId};
use crate::threat::path::TilePath;

/// Kill threats end on a general; econ threats only take territory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatKind {
    Kill,
    Econ,
}

/// What the threat's path ends on, used for per-class caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DestinationClass {
    General,
    City,
    Expansion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    pub id: ThreatId,
    pub kind: ThreatKind,
    pub player: PlayerId,
    pub path: TilePath,
    /// Raw value reported by the detector
    pub value: f32,
    /// Tile the defender has marked as the place to hold a kill threat
    pub save_tile: Option<TileId>,
}

impl Threat {
    pub fn new(
        id: ThreatId,
        kind: ThreatKind,
        player: PlayerId,
        path: TilePath,
        value: f32,
    ) -> Self {
        Self {
            id,
            kind,
            player,
            path,
            value,
            save_tile: None,
        }
    }

    pub fn with_save_tile(mut self, tile: TileId) -> Self {
        self.save_tile = Some(tile);
        self
    }

    pub fn origin(&self) -> TileId {
        self.path.start
    }

    pub fn target_tile(&self) -> TileId {
        self.path.tail()
    }

    /// Number of moves along the predicted path
    pub fn length(&self) -> u32 {
        self.path.length()
    }

    /// Army currently stacked on the origin tile
    pub fn army(&self, board: &Board) -> i32 {
        board.tile(self.origin()).army
    }

    pub fn is_kill(&self) -> bool {
        self.kind == ThreatKind::Kill
    }

    pub fn destination_class(&self, board: &Board) -> DestinationClass {
        let tail = board.tile(self.target_tile());
        if tail.is_general {
            DestinationClass::General
        } else if tail.is_city {
            DestinationClass::City
        } else {
            DestinationClass::Expansion
        }
    }

    /// Whether the first predicted move undoes the owner's last recorded move
    pub fn first_move_reverses(&self, board: &Board) -> bool {
        let Some(first) = self.path.moves.first() else {
            return false;
        };
        matches!(
            board.last_move(self.player),
            Some((from, to)) if to == self.origin() && from == first.to
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_threat(board: &Board, tiles: &[(i32, i32)]) -> Threat {
        let ids: Vec<TileId> = tiles
            .iter()
            .map(|&(x, y)| board.id_at(x, y).unwrap())
            .collect();
        Threat::new(
            ThreatId(1),
            ThreatKind::Econ,
            PlayerId(1),
            TilePath::from_tiles(&ids).unwrap(),
            10.0,
        )
    }

    #[test]
    fn test_destination_classes() {
        let mut board = Board::new(4, 1, PlayerId(0));
        let threat = line_threat(&board, &[(0, 0), (1, 0), (2, 0)]);
        assert_eq!(threat.destination_class(&board), DestinationClass::Expansion);

        board.set_city(TileId(2), true);
        assert_eq!(threat.destination_class(&board), DestinationClass::City);

        board.set_general(TileId(2), PlayerId(0), 5);
        assert_eq!(threat.destination_class(&board), DestinationClass::General);
    }

    #[test]
    fn test_origin_and_target() {
        let board = Board::new(4, 1, PlayerId(0));
        let threat = line_threat(&board, &[(0, 0), (1, 0), (2, 0)]);
        assert_eq!(threat.origin(), TileId(0));
        assert_eq!(threat.target_tile(), TileId(2));
        assert_eq!(threat.length(), 2);
        assert!(!threat.is_kill());
        assert_eq!(threat.army(&board), 0);
    }

    #[test]
    fn test_first_move_reversal() {
        let mut board = Board::new(4, 1, PlayerId(0));
        let threat = line_threat(&board, &[(1, 0), (2, 0), (3, 0)]);
        assert!(!threat.first_move_reverses(&board));

        board.record_move(PlayerId(1), TileId(2), TileId(1));
        assert!(threat.first_move_reverses(&board));

        board.record_move(PlayerId(1), TileId(0), TileId(1));
        assert!(!threat.first_move_reverses(&board));
    }
}
