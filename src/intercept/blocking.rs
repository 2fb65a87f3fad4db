//! Cross-threat blocking hints
//!
//! For every friendly tile a threat would walk through while closing on our
//! territory, records how much army holds it and which neighbours stay safe
//! while it holds. Intercept paths that pull army off a tile protecting
//! another threat's destinations commit only half.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::board::Board;
use crate::core::types::{ThreatId, TileId};
use crate::threat::{Threat, TilePath};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreatBlockInfo {
    pub tile: TileId,
    /// Army needed on `tile` to hold against the strongest threat through it
    pub amount_required: i32,
    pub blocked_destinations: BTreeSet<TileId>,
    pub threats: BTreeSet<ThreatId>,
}

impl ThreatBlockInfo {
    fn new(tile: TileId) -> Self {
        Self {
            tile,
            amount_required: 0,
            blocked_destinations: BTreeSet::new(),
            threats: BTreeSet::new(),
        }
    }
}

pub type ThreatBlockTable = BTreeMap<TileId, ThreatBlockInfo>;

pub fn build_block_table(board: &Board, threats: &[Threat]) -> ThreatBlockTable {
    let mut table = ThreatBlockTable::new();
    let our_general = board.general_of(board.player);

    for threat in threats {
        let anchor = our_general.unwrap_or_else(|| threat.target_tile());
        let (Some(from_origin), Some(from_tail)) = (
            board.distance(threat.origin(), anchor),
            board.distance(threat.target_tile(), anchor),
        ) else {
            continue;
        };
        if from_tail >= from_origin {
            tracing::debug!("Threat {:?} moves away, no block hints", threat.id);
            continue;
        }

        let mut army = threat.army(board) - 1;
        for i in 1..=threat.length() as usize {
            if army <= 0 {
                break;
            }
            let prev = threat.path.tile_at(i - 1);
            let tile = threat.path.tile_at(i);
            let t = board.tile(tile);

            if board.is_friendly_to(tile, threat.player) {
                army += t.army;
                continue;
            }

            let closing = match (board.distance(tile, anchor), board.distance(prev, anchor)) {
                (Some(here), Some(before)) => here < before,
                _ => false,
            };
            if board.is_friendly(tile) && closing {
                let entry = table.entry(tile).or_insert_with(|| ThreatBlockInfo::new(tile));
                entry.amount_required = entry.amount_required.max(army);
                entry.threats.insert(threat.id);
                entry.blocked_destinations.extend(
                    board
                        .neighbors(tile)
                        .iter()
                        .copied()
                        .filter(|&n| n != prev && board.is_friendly(n)),
                );
            }
            army -= t.army + 1;
        }
    }
    table
}

/// Index of the first move whose destination another threat's block entry
/// protects
pub fn partial_commit_index(path: &TilePath, table: &ThreatBlockTable, intercepted: ThreatId) -> Option<usize> {
    path.moves.iter().position(|step| {
        table.values().any(|info| {
            info.blocked_destinations.contains(&step.to)
                && info.threats.iter().any(|&id| id != intercepted)
        })
    })
}

/// `path` with its first protected move committing half the army
pub fn apply_partial_commit(path: &TilePath, table: &ThreatBlockTable, intercepted: ThreatId) -> Option<TilePath> {
    partial_commit_index(path, table, intercepted).map(|i| path.with_half_move(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;
    use crate::threat::ThreatKind;

    const US: PlayerId = PlayerId(0);
    const ENEMY: PlayerId = PlayerId(1);

    fn strip() -> (Board, Threat) {
        let mut board = Board::new(10, 1, US);
        board.set_owner(TileId(0), Some(ENEMY), 20);
        for x in 3..9 {
            board.set_owner(TileId(x), Some(US), 2);
        }
        board.set_general(TileId(9), US, 2);
        let path = TilePath::from_tiles(&(0..10).map(TileId).collect::<Vec<_>>()).unwrap();
        let threat = Threat::new(ThreatId(1), ThreatKind::Kill, ENEMY, path, 50.0);
        (board, threat)
    }

    #[test]
    fn test_block_amounts_along_closing_path() {
        let (board, threat) = strip();
        let table = build_block_table(&board, &[threat]);

        assert_eq!(table[&TileId(3)].amount_required, 17);
        assert_eq!(table[&TileId(4)].amount_required, 14);
        assert_eq!(table[&TileId(8)].amount_required, 2);
        assert_eq!(
            table[&TileId(3)].blocked_destinations,
            BTreeSet::from([TileId(4)])
        );
        // Army runs out before the general
        assert!(!table.contains_key(&TileId(9)));
        assert!(table.values().all(|info| info.threats.contains(&ThreatId(1))));
    }

    #[test]
    fn test_retreating_threat_has_no_hints() {
        let (board, _) = strip();
        let path = TilePath::from_tiles(&[TileId(4), TileId(3)]).unwrap();
        let away = Threat::new(ThreatId(2), ThreatKind::Econ, ENEMY, path, 5.0);
        assert!(build_block_table(&board, &[away]).is_empty());
    }

    #[test]
    fn test_partial_commit_on_other_threats_destination() {
        let (board, threat) = strip();
        let table = build_block_table(&board, &[threat]);

        let path = TilePath::from_tiles(&[TileId(6), TileId(5), TileId(4)]).unwrap();
        // Tile 5 is protected by tile 4's hold against threat 1
        let adjusted = apply_partial_commit(&path, &table, ThreatId(7)).unwrap();
        assert!(adjusted.moves[0].move_half);
        assert!(!adjusted.moves[1].move_half);

        // No rewrite when the only protecting threat is the one being intercepted
        assert!(apply_partial_commit(&path, &table, ThreatId(1)).is_none());
    }
}
