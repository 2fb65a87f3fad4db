//! Best-first search from each choke back into friendly territory
//!
//! Searches run outward from the choke; a path found at depth `d` is walked
//! in reverse, so the source tile's army must reach the choke in `d` moves.
//! Node `d` is therefore where our army stands `d` turns before arrival, and
//! it is compared against where the threats are expected to be at that turn.

use std::cmp::Ordering;

use glam::Vec2;
use ordered_float::OrderedFloat;

use crate::board::Board;
use crate::core::config::{InterceptConfig, ValuationConfig};
use crate::core::error::Result;
use crate::core::types::{PlayerId, TileId};
use crate::intercept::aggregate::ArmyInterception;
use crate::intercept::blocking::{partial_commit_index, ThreatBlockTable};
use crate::intercept::consensus::InterceptPointTileInfo;
use crate::intercept::pruner::ThreatValueInfo;
use crate::intercept::valuator::tile_capture_value;
use crate::search::{bounded_best_first, SearchPolicy};
use crate::threat::{PathAnalysis, TilePath};

/// Expansion order for the intercept search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptPriority {
    pub distance: u32,
    /// Summed distance to the predicted threat centroid along the branch
    pub centroid_distance: OrderedFloat<f32>,
    /// Negative once our army covers the captures
    pub balance: i32,
    pub captures: u32,
    pub recapture_value: OrderedFloat<f32>,
    /// Distance to the centroid at this node's turn
    pub step_centroid_distance: OrderedFloat<f32>,
}

impl Ord for InterceptPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.centroid_distance.cmp(&other.centroid_distance))
            .then_with(|| self.balance.cmp(&other.balance))
            .then_with(|| other.captures.cmp(&self.captures))
            .then_with(|| other.recapture_value.cmp(&self.recapture_value))
            .then_with(|| self.step_centroid_distance.cmp(&other.step_centroid_distance))
    }
}

impl PartialOrd for InterceptPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Quality of an accepted source tile; larger is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct InterceptScore {
    pub recapture_value: OrderedFloat<f32>,
    pub captures: u32,
    /// Army left over after covering every capture
    pub surplus: i32,
}

/// A friendly path ending on a choke
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePath {
    pub choke: TileId,
    /// Source tile first, choke last
    pub path: TilePath,
    pub score: InterceptScore,
    /// Move forced to commit half the army by a block hint
    pub partial_commit: Option<usize>,
}

/// Average predicted threat position for each turn up to the longest path
pub fn centroid_curve(board: &Board, threats: &[ThreatValueInfo]) -> Vec<Vec2> {
    let longest = threats.iter().map(ThreatValueInfo::length).max().unwrap_or(0) as usize;
    (0..=longest)
        .map(|k| {
            let sum: Vec2 = threats
                .iter()
                .map(|t| board.position(t.threat.path.tile_at(k)))
                .sum();
            sum / threats.len().max(1) as f32
        })
        .collect()
}

/// Euclidean distance from `tile` to the nearest corridor tile
fn corridor_distance(board: &Board, analysis: &PathAnalysis, tile: TileId) -> f32 {
    analysis
        .shortest_pathway
        .iter()
        .map(|&p| board.euclidean(tile, p))
        .fold(f32::INFINITY, f32::min)
}

/// Whether a neighbouring choke sits closer to the corridor, or about as
/// close but narrower
fn has_better_neighbor(
    board: &Board,
    analysis: &PathAnalysis,
    point: &InterceptPointTileInfo,
    interception: &ArmyInterception,
) -> bool {
    let here = corridor_distance(board, analysis, point.tile);
    board.neighbors(point.tile).iter().any(|n| {
        interception.common_intercept_points.get(n).is_some_and(|other| {
            let there = corridor_distance(board, analysis, other.tile);
            there < here || (there <= here + 1.0 && other.max_choke_width < point.max_choke_width)
        })
    })
}

struct InterceptPolicy<'a> {
    centroid: &'a [Vec2],
    /// Turn the threat reaches the choke
    arrival: u32,
    threat_player: PlayerId,
    retreat_tolerance: f32,
    valuation: &'a ValuationConfig,
}

impl InterceptPolicy<'_> {
    fn step_distance(&self, board: &Board, tile: TileId, depth: u32) -> f32 {
        let turn = self.arrival.saturating_sub(depth) as usize;
        let target = self.centroid[turn.min(self.centroid.len().saturating_sub(1))];
        board.position(tile).distance(target)
    }

    /// Balance, captures and value after adding `tile` to the branch
    fn absorb(&self, board: &Board, tile: TileId, balance: i32, captures: u32, value: f32) -> (i32, u32, f32) {
        let t = board.tile(tile);
        if board.is_friendly(tile) {
            (balance - (t.army - 1), captures, value)
        } else {
            let gain = tile_capture_value(board, tile, self.threat_player, 0, self.valuation);
            (balance + t.army + 1, captures + 1, value + gain)
        }
    }
}

impl SearchPolicy for InterceptPolicy<'_> {
    type Priority = InterceptPriority;
    type Score = InterceptScore;

    fn seed(&self, board: &Board, start: TileId) -> Option<InterceptPriority> {
        let t = board.tile(start);
        let (balance, captures, value) = if board.is_friendly(start) {
            (-t.army, 0, 0.0)
        } else {
            self.absorb(board, start, 0, 0, 0.0)
        };
        let step = self.step_distance(board, start, 0);
        Some(InterceptPriority {
            distance: 0,
            centroid_distance: OrderedFloat(step),
            balance,
            captures,
            recapture_value: OrderedFloat(value),
            step_centroid_distance: OrderedFloat(step),
        })
    }

    fn step(
        &self,
        board: &Board,
        _from: TileId,
        to: TileId,
        depth: u32,
        prev: &InterceptPriority,
    ) -> Option<InterceptPriority> {
        if board.tile(to).is_neutral_obstacle() || depth > self.arrival {
            return None;
        }
        let step = self.step_distance(board, to, depth);
        // Walking forward from here would move away from the threats
        if prev.step_centroid_distance.0 - step > self.retreat_tolerance {
            return None;
        }
        let (balance, captures, value) =
            self.absorb(board, to, prev.balance, prev.captures, prev.recapture_value.0);
        Some(InterceptPriority {
            distance: depth,
            centroid_distance: OrderedFloat(prev.centroid_distance.0 + step),
            balance,
            captures,
            recapture_value: OrderedFloat(value),
            step_centroid_distance: OrderedFloat(step),
        })
    }

    fn score(&self, board: &Board, tile: TileId, depth: u32, priority: &InterceptPriority) -> Option<InterceptScore> {
        let t = board.tile(tile);
        if depth == 0 || !board.is_friendly(tile) || t.army <= 1 || priority.balance >= 0 {
            return None;
        }
        Some(InterceptScore {
            recapture_value: priority.recapture_value,
            captures: priority.captures,
            surplus: -priority.balance,
        })
    }
}

/// Candidate friendly paths into every common intercept point
pub fn search_intercept_paths(
    board: &Board,
    interception: &ArmyInterception,
    block_table: &ThreatBlockTable,
    config: &InterceptConfig,
) -> Result<Vec<CandidatePath>> {
    let Some(best) = interception.best() else {
        return Ok(Vec::new());
    };
    let centroid = centroid_curve(board, &interception.threats);
    let mut candidates = Vec::new();

    for point in interception.common_intercept_points.values() {
        let Some(arrival) = best.analysis.from_origin.get(point.tile) else {
            continue;
        };
        let mut depth = point.max_search_dist;
        if has_better_neighbor(board, &best.analysis, point, interception) {
            depth = depth.min(2u32.saturating_sub(point.max_choke_width));
        }
        if depth == 0 {
            continue;
        }

        let policy = InterceptPolicy {
            centroid: &centroid,
            arrival,
            threat_player: best.threat.player,
            retreat_tolerance: config.search.retreat_tolerance,
            valuation: &config.valuation,
        };
        let results = bounded_best_first(
            board,
            point.tile,
            depth,
            &policy,
            config.search.max_candidates_per_choke,
        );

        for result in results.into_values() {
            let tiles: Vec<TileId> = result.tiles.iter().rev().copied().collect();
            let path = TilePath::from_tiles(&tiles)?;
            let partial_commit = partial_commit_index(&path, block_table, best.threat.id);
            candidates.push(CandidatePath {
                choke: point.tile,
                path,
                score: result.score,
                partial_commit,
            });
        }
    }

    tracing::debug!(
        "{} intercept candidates over {} chokes",
        candidates.len(),
        interception.common_intercept_points.len()
    );
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::core::types::ThreatId;
    use crate::intercept::consensus::find_shared_chokes;
    use crate::intercept::blocking::build_block_table;
    use crate::threat::{analyze_path, Threat, ThreatKind};

    const US: PlayerId = PlayerId(0);
    const ENEMY: PlayerId = PlayerId(1);

    fn interception(board: &Board) -> ArmyInterception {
        let path = TilePath::from_tiles(&(0..=10).map(TileId).collect::<Vec<_>>()).unwrap();
        let analysis = Rc::new(analyze_path(board, &path, 16).unwrap());
        let threat = Threat::new(ThreatId(1), ThreatKind::Kill, ENEMY, path, 100.0).with_save_tile(TileId(3));
        let info = ThreatValueInfo::new(threat, analysis, 100.0, 10);
        let mut agg = ArmyInterception::new(TileId(0), vec![info], vec![]).unwrap();
        agg.common_intercept_points = find_shared_chokes(board, &agg.threats, TileId(0)).chokes;
        agg
    }

    fn strip() -> Board {
        let mut board = Board::new(12, 1, US);
        board.set_owner(TileId(0), Some(ENEMY), 50);
        for x in 4..10 {
            board.set_owner(TileId(x), Some(US), 1);
        }
        board.set_army(TileId(6), 40);
        board.set_general(TileId(10), US, 1);
        board
    }

    #[test]
    fn test_priority_order() {
        let base = InterceptPriority {
            distance: 2,
            centroid_distance: OrderedFloat(3.0),
            balance: -5,
            captures: 1,
            recapture_value: OrderedFloat(1.0),
            step_centroid_distance: OrderedFloat(1.0),
        };
        let nearer = InterceptPriority { distance: 1, ..base.clone() };
        let richer = InterceptPriority { balance: -9, ..base.clone() };
        let greedier = InterceptPriority { captures: 2, ..base.clone() };
        assert!(nearer < base);
        assert!(richer < base);
        assert!(greedier < base);
    }

    #[test]
    fn test_finds_stack_three_moves_out() {
        let board = strip();
        let agg = interception(&board);
        let table = build_block_table(&board, &[agg.threats[0].threat.clone()]);
        let candidates = search_intercept_paths(&board, &agg, &table, &InterceptConfig::default()).unwrap();

        let from_three: Vec<&CandidatePath> = candidates.iter().filter(|c| c.choke == TileId(3)).collect();
        assert_eq!(from_three.len(), 1);
        let tiles: Vec<TileId> = from_three[0].path.tiles().collect();
        assert_eq!(tiles, vec![TileId(6), TileId(5), TileId(4), TileId(3)]);
        assert_eq!(from_three[0].score.captures, 1);
        assert_eq!(from_three[0].score.surplus, 38);
    }

    #[test]
    fn test_every_candidate_starts_on_a_friendly_stack() {
        let board = strip();
        let agg = interception(&board);
        let candidates = search_intercept_paths(&board, &agg, &ThreatBlockTable::new(), &InterceptConfig::default()).unwrap();

        assert!(!candidates.is_empty());
        for c in &candidates {
            assert!(board.is_friendly(c.path.start));
            assert!(board.tile(c.path.start).army > 1);
            assert_eq!(c.path.tail(), c.choke);
            assert!(c.path.length() >= 1);
        }
    }

    #[test]
    fn test_no_threats_no_candidates() {
        let board = strip();
        let agg = ArmyInterception::new(TileId(0), vec![], vec![]).unwrap();
        let candidates = search_intercept_paths(&board, &agg, &ThreatBlockTable::new(), &InterceptConfig::default()).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_centroid_averages_threat_positions() {
        let board = Board::new(5, 5, US);
        let a = TilePath::from_tiles(&[TileId(12), TileId(13), TileId(14)]).unwrap();
        let b = TilePath::from_tiles(&[TileId(12), TileId(7), TileId(2)]).unwrap();
        let infos: Vec<ThreatValueInfo> = [a, b]
            .into_iter()
            .enumerate()
            .map(|(i, path)| {
                let analysis = Rc::new(analyze_path(&board, &path, 6).unwrap());
                let threat = Threat::new(ThreatId(i as u32), ThreatKind::Econ, ENEMY, path, 1.0);
                ThreatValueInfo::new(threat, analysis, 1.0, 2)
            })
            .collect();
        let curve = centroid_curve(&board, &infos);
        assert_eq!(curve.len(), 3);
        assert_eq!(curve[0], Vec2::new(2.0, 2.0));
        assert_eq!(curve[2], Vec2::new(3.0, 1.0));
    }
}
