//! Delay or split when an intercept starts two hops from the threats

use std::collections::BTreeSet;

use crate::board::Board;
use crate::core::types::TileId;
use crate::intercept::pruner::ThreatValueInfo;
use crate::threat::{Threat, TilePath};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitDecision {
    /// Commit half the stack on the first move to cover both branches
    pub split: bool,
    /// Wait a turn for the threats to commit to a branch
    pub requires_delay: bool,
}

/// Tile and army a threat presents after its next move
fn one_step_later(board: &Board, threat: &Threat) -> (TileId, i32) {
    let next = threat.path.tile_at(1);
    let mut army = threat.army(board) - 1;
    let tile = board.tile(next);
    if board.is_friendly_to(next, threat.player) {
        army += tile.army;
    } else {
        army -= tile.army + 1;
    }
    (next, army)
}

pub fn decide_delay_split(board: &Board, path: &TilePath, threats: &[ThreatValueInfo]) -> SplitDecision {
    let Some(first) = threats.first() else {
        return SplitDecision::default();
    };
    let start = path.start;
    if board.distance(start, first.threat.origin()) != Some(2) {
        return SplitDecision::default();
    }

    let steps: Vec<(TileId, i32)> = threats
        .iter()
        .filter(|t| !t.threat.path.is_empty())
        .map(|t| one_step_later(board, &t.threat))
        .collect();

    let half = board.tile(start).army / 2;
    let safe = steps.iter().all(|&(_, army)| half > army);

    let branches: BTreeSet<TileId> = steps.iter().map(|&(tile, _)| tile).collect();
    let branching = branches.len() >= 2 && branches.iter().all(|&b| board.adjacent(start, b));

    let requires_delay = branching && !safe;
    let decision = SplitDecision {
        split: branching && safe && !requires_delay,
        requires_delay,
    };
    if branching {
        tracing::debug!(
            "Threats branch at {} tiles next to {}: {:?}",
            branches.len(),
            start,
            decision
        );
    }
    decision
}
