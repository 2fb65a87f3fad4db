//! Tile paths shared by threats and intercept plans

use serde::{Deserialize, Serialize};

use crate::core::error::{InterceptError, Result};
use crate::core::types::TileId;

/// One step of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMove {
    pub to: TileId,
    /// Commit only half of the moving army on this step
    #[serde(default)]
    pub move_half: bool,
}

/// A start tile followed by a sequence of moves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePath {
    pub start: TileId,
    pub moves: Vec<PathMove>,
}

impl TilePath {
    pub fn new(start: TileId) -> Self {
        Self {
            start,
            moves: Vec::new(),
        }
    }

    /// Build from a tile sequence; the first tile is the start
    pub fn from_tiles(tiles: &[TileId]) -> Result<Self> {
        let (&start, rest) = tiles.split_first().ok_or(InterceptError::EmptyPath)?;
        Ok(Self {
            start,
            moves: rest
                .iter()
                .map(|&to| PathMove {
                    to,
                    move_half: false,
                })
                .collect(),
        })
    }

    pub fn push(&mut self, to: TileId) {
        self.moves.push(PathMove {
            to,
            move_half: false,
        });
    }

    /// Number of moves
    pub fn length(&self) -> u32 {
        self.moves.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn tail(&self) -> TileId {
        self.moves.last().map(|m| m.to).unwrap_or(self.start)
    }

    /// Start tile followed by every move destination
    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        std::iter::once(self.start).chain(self.moves.iter().map(|m| m.to))
    }

    /// Tile occupied after `index` moves; stays on the tail past the end
    pub fn tile_at(&self, index: usize) -> TileId {
        match index {
            0 => self.start,
            i => self
                .moves
                .get(i - 1)
                .map(|m| m.to)
                .unwrap_or_else(|| self.tail()),
        }
    }

    pub fn contains(&self, tile: TileId) -> bool {
        self.tiles().any(|t| t == tile)
    }

    pub fn index_of(&self, tile: TileId) -> Option<usize> {
        self.tiles().position(|t| t == tile)
    }

    pub fn has_half_move(&self) -> bool {
        self.moves.iter().any(|m| m.move_half)
    }

    /// Copy of this path with move `index` committing half the army
    pub fn with_half_move(&self, index: usize) -> Self {
        let mut path = self.clone();
        if let Some(step) = path.moves.get_mut(index) {
            step.move_half = true;
        }
        path
    }
}
