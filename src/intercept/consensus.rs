//! Shared choke points across simultaneous threats
//!
//! Every kept threat votes for the tiles on and around its corridor that it
//! can reach in time. Tiles enough threats agree on become intercept points.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::board::Board;
use crate::core::types::TileId;
use crate::intercept::pruner::ThreatValueInfo;
use crate::threat::DestinationClass;

/// Per-tile intercept metadata agreed on by the kept threats
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterceptPointTileInfo {
    pub tile: TileId,
    /// Latest arrival, in turns, that still meets the threats here
    pub max_delay_turns: u32,
    /// Worst-case extra moves before contact
    pub max_extra_moves: u32,
    pub max_choke_width: u32,
    pub max_intercept_turn_offset: u32,
    /// Depth cap for the path search rooted here
    pub max_search_dist: u32,
}

/// Raw votes collected for one tile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChokeTally {
    /// Threats that see this tile, excluding the origin neighbourhood
    pub count: u32,
    pub min_delay: Option<u32>,
    pub max_extra: u32,
    pub max_offset: u32,
    pub width_by_class: BTreeMap<DestinationClass, u32>,
}

impl ChokeTally {
    fn record(&mut self, delay: u32, extra: u32, width: u32, offset: u32, class: DestinationClass) {
        self.min_delay = Some(self.min_delay.map_or(delay, |d| d.min(delay)));
        self.max_extra = self.max_extra.max(extra);
        self.max_offset = self.max_offset.max(offset);
        let entry = self.width_by_class.entry(class).or_insert(0);
        *entry = (*entry).max(width);
    }

    /// General-bound widths win when present
    fn width(&self) -> u32 {
        self.width_by_class
            .get(&DestinationClass::General)
            .copied()
            .or_else(|| self.width_by_class.values().copied().max())
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChokeConsensus {
    pub chokes: BTreeMap<TileId, InterceptPointTileInfo>,
    pub threshold: u32,
    /// Tiles seen by more than one threat
    pub multi_seen: usize,
    pub tallies: BTreeMap<TileId, ChokeTally>,
}

impl ChokeConsensus {
    /// Tiles whose tally meets `threshold` (at least one vote)
    pub fn qualifying(&self, threshold: u32) -> usize {
        let threshold = threshold.max(1);
        self.tallies.values().filter(|t| t.count >= threshold).count()
    }

    /// Only the origin survived
    pub fn is_degenerate(&self, origin: TileId) -> bool {
        self.chokes.len() == 1 && self.chokes.contains_key(&origin)
    }
}

/// Width, offset and extra moves a threat presents at `tile`
fn corridor_metrics(board: &Board, info: &ThreatValueInfo, tile: TileId) -> Option<(u32, u32, u32)> {
    let analysis = &info.analysis;
    if analysis.is_on_corridor(tile) {
        let width = analysis.choke_width(tile).unwrap_or(1);
        let offset = analysis.intercept_turn_offset(tile).unwrap_or(0);
        return Some((width, offset, offset));
    }

    // One hop off the corridor: contact needs a sideways step
    let adjacent = board
        .neighbors(tile)
        .iter()
        .filter(|&&n| analysis.is_on_corridor(n));
    let mut width: Option<u32> = None;
    let mut offset: Option<u32> = None;
    for &n in adjacent {
        let w = analysis.choke_width(n).unwrap_or(1);
        let o = analysis.intercept_turn_offset(n).unwrap_or(0);
        width = Some(width.map_or(w, |cur| cur.min(w)));
        offset = Some(offset.map_or(o, |cur| cur.min(o)));
    }
    let width = width? + 1;
    let offset = offset?;
    Some((width, offset, offset + 1))
}

/// Tile where a general-bound threat is best held: the explicit save tile,
/// or the width-1 path tile nearest the general
fn defensive_choke(info: &ThreatValueInfo) -> Option<TileId> {
    if let Some(save) = info.threat.save_tile {
        return Some(save);
    }
    let len = info.threat.path.length() as usize;
    (1..len)
        .rev()
        .map(|i| info.threat.path.tile_at(i))
        .find(|&t| info.analysis.choke_width(t) == Some(1))
}

pub fn find_shared_chokes(board: &Board, threats: &[ThreatValueInfo], origin: TileId) -> ChokeConsensus {
    let mut tallies: BTreeMap<TileId, ChokeTally> = BTreeMap::new();
    let origin_area: BTreeSet<TileId> = std::iter::once(origin)
        .chain(board.neighbors(origin).iter().copied())
        .collect();

    for info in threats {
        let class = info.threat.destination_class(board);
        let limit = info.turns.max(info.length()) + 1;
        for tile in info.analysis.corridor_with_neighbors(board) {
            let Some(delay) = info.analysis.from_origin.get(tile) else {
                continue;
            };
            if delay > limit {
                continue;
            }
            let Some((width, offset, extra)) = corridor_metrics(board, info, tile) else {
                continue;
            };
            let tally = tallies.entry(tile).or_default();
            tally.record(delay, extra, width, offset, class);
            if !origin_area.contains(&tile) {
                tally.count += 1;
            }
        }
    }

    let max_count = tallies.values().map(|t| t.count).max().unwrap_or(0);
    let multi_seen = tallies.values().filter(|t| t.count > 1).count();
    let mut consensus = ChokeConsensus {
        chokes: BTreeMap::new(),
        threshold: max_count,
        multi_seen,
        tallies,
    };

    while consensus.threshold > 0 && consensus.qualifying(consensus.threshold) * 3 <= multi_seen {
        consensus.threshold -= 1;
    }
    tracing::debug!(
        "Choke threshold {} (max {}, {} multi-seen, {} qualifying)",
        consensus.threshold,
        max_count,
        multi_seen,
        consensus.qualifying(consensus.threshold)
    );

    let longest = threats.iter().map(ThreatValueInfo::length).max().unwrap_or(0);
    let min_count = consensus.threshold.max(1);
    for (&tile, tally) in &consensus.tallies {
        if tile != origin && tally.count < min_count {
            continue;
        }
        let delay = tally.min_delay.unwrap_or(0);
        consensus.chokes.insert(
            tile,
            InterceptPointTileInfo {
                tile,
                max_delay_turns: delay,
                max_extra_moves: tally.max_extra,
                max_choke_width: tally.width(),
                max_intercept_turn_offset: tally.max_offset,
                max_search_dist: delay,
            },
        );
    }
    if !consensus.chokes.contains_key(&origin) {
        consensus.chokes.insert(
            origin,
            InterceptPointTileInfo {
                tile: origin,
                max_delay_turns: 0,
                max_extra_moves: 0,
                max_choke_width: 1,
                max_intercept_turn_offset: 0,
                max_search_dist: 0,
            },
        );
    }

    tighten_general_delays(board, threats, &mut consensus.chokes);

    for info in consensus.chokes.values_mut() {
        info.max_search_dist = (longest + 1).min(info.max_delay_turns);
    }
    consensus
}

/// Tiles behind a general's defensive choke must be reached a turn earlier
fn tighten_general_delays(
    board: &Board,
    threats: &[ThreatValueInfo],
    chokes: &mut BTreeMap<TileId, InterceptPointTileInfo>,
) {
    let mut adjusted: BTreeSet<TileId> = BTreeSet::new();
    for info in threats {
        if info.threat.destination_class(board) != DestinationClass::General {
            continue;
        }
        let general = info.threat.target_tile();
        let Some(choke) = defensive_choke(info) else {
            continue;
        };
        let Some(choke_dist) = board.distance(choke, general) else {
            continue;
        };
        for (tile, point) in chokes.iter_mut() {
            if adjusted.contains(tile) {
                continue;
            }
            if board.distance(*tile, general).is_some_and(|d| d > choke_dist) {
                point.max_delay_turns = point.max_delay_turns.saturating_sub(1);
                adjusted.insert(*tile);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::core::types::{PlayerId, ThreatId};
    use crate::threat::{analyze_path, Threat, ThreatKind, TilePath};

    const US: PlayerId = PlayerId(0);
    const ENEMY: PlayerId = PlayerId(1);

    fn strip_threat(board: &Board, id: u32, kind: ThreatKind, from: u32, to: u32) -> ThreatValueInfo {
        let tiles: Vec<TileId> = if from <= to {
            (from..=to).map(TileId).collect()
        } else {
            (to..=from).rev().map(TileId).collect()
        };
        let path = TilePath::from_tiles(&tiles).unwrap();
        let len = path.length();
        let analysis = Rc::new(analyze_path(board, &path, 12).unwrap());
        let threat = Threat::new(ThreatId(id), kind, ENEMY, path, 10.0);
        ThreatValueInfo::new(threat, analysis, 10.0, len)
    }

    #[test]
    fn test_single_threat_strip() {
        let board = Board::new(10, 1, US);
        let threat = strip_threat(&board, 1, ThreatKind::Econ, 0, 8);
        let consensus = find_shared_chokes(&board, &[threat], TileId(0));

        assert!(consensus.chokes.contains_key(&TileId(0)));
        // Origin neighbour is never tallied
        assert!(!consensus.chokes.contains_key(&TileId(1)));

        let mid = &consensus.chokes[&TileId(5)];
        assert_eq!(mid.max_delay_turns, 5);
        assert_eq!(mid.max_choke_width, 1);
        assert_eq!(mid.max_extra_moves, 0);
        assert_eq!(mid.max_search_dist, 5);

        // Past the tail: off the corridor
        let beyond = &consensus.chokes[&TileId(9)];
        assert_eq!(beyond.max_choke_width, 2);
        assert_eq!(beyond.max_extra_moves, 1);
        assert_eq!(beyond.max_search_dist, 9);
    }

    #[test]
    fn test_shared_prefix_wins_threshold() {
        let board = Board::new(10, 1, US);
        let long = strip_threat(&board, 1, ThreatKind::Econ, 0, 8);
        let short = strip_threat(&board, 2, ThreatKind::Econ, 0, 5);
        let consensus = find_shared_chokes(&board, &[long, short], TileId(0));

        assert_eq!(consensus.threshold, 2);
        assert_eq!(consensus.multi_seen, 5);
        let tiles: Vec<u32> = consensus.chokes.keys().map(|t| t.0).collect();
        assert_eq!(tiles, vec![0, 2, 3, 4, 5, 6]);

        // Tile 6 is the short threat's overshoot: width from the off-corridor vote
        let edge = &consensus.chokes[&TileId(6)];
        assert_eq!(edge.max_choke_width, 2);
        assert_eq!(edge.max_extra_moves, 1);
    }

    #[test]
    fn test_qualifying_grows_as_threshold_relaxes() {
        let board = Board::new(10, 1, US);
        let long = strip_threat(&board, 1, ThreatKind::Econ, 0, 8);
        let short = strip_threat(&board, 2, ThreatKind::Econ, 0, 5);
        let consensus = find_shared_chokes(&board, &[long, short], TileId(0));

        assert!(consensus.qualifying(2) <= consensus.qualifying(1));
        assert_eq!(consensus.qualifying(1), consensus.qualifying(0));
    }

    #[test]
    fn test_save_tile_tightens_delay() {
        let mut board = Board::new(10, 1, US);
        board.set_general(TileId(8), US, 5);
        let mut kill = strip_threat(&board, 1, ThreatKind::Kill, 0, 8);
        kill.threat = kill.threat.clone().with_save_tile(TileId(5));
        let consensus = find_shared_chokes(&board, &[kill], TileId(0));

        assert_eq!(consensus.chokes[&TileId(3)].max_delay_turns, 2);
        assert_eq!(consensus.chokes[&TileId(6)].max_delay_turns, 6);
        assert_eq!(consensus.chokes[&TileId(0)].max_delay_turns, 0);
    }

    #[test]
    fn test_nearest_narrow_tile_used_without_save_tile() {
        let mut board = Board::new(10, 1, US);
        board.set_general(TileId(8), US, 5);
        let kill = strip_threat(&board, 1, ThreatKind::Kill, 0, 8);
        let consensus = find_shared_chokes(&board, &[kill], TileId(0));

        // Choke falls on tile 7, so everything farther loses a turn
        assert_eq!(consensus.chokes[&TileId(6)].max_delay_turns, 5);
        assert_eq!(consensus.chokes[&TileId(7)].max_delay_turns, 7);
    }

    #[test]
    fn test_degenerate_when_only_origin_remains() {
        let board = Board::new(3, 1, US);
        let left = strip_threat(&board, 1, ThreatKind::Econ, 1, 0);
        let right = strip_threat(&board, 2, ThreatKind::Econ, 1, 2);
        let consensus = find_shared_chokes(&board, &[left, right], TileId(1));

        assert!(consensus.is_degenerate(TileId(1)));
        assert_eq!(consensus.threshold, 0);
    }
}
