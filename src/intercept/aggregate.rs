//! The per-call interception aggregate and its primary-threat selection

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::core::error::{InterceptError, Result};
use crate::core::types::TileId;
use crate::intercept::consensus::InterceptPointTileInfo;
use crate::intercept::options::InterceptionOptionInfo;
use crate::intercept::pruner::ThreatValueInfo;
use crate::threat::Threat;

/// Result of one planning call against threats from a single origin
#[derive(Debug, Clone)]
pub struct ArmyInterception {
    /// Origin tile shared by every threat
    pub target_tile: TileId,
    pub threats: Vec<ThreatValueInfo>,
    pub ignored_threats: Vec<Threat>,
    /// Index into `threats`
    pub kill_threat: Option<usize>,
    /// Index into `threats`
    pub best_threat: Option<usize>,
    pub common_intercept_points: BTreeMap<TileId, InterceptPointTileInfo>,
    /// Best option per turn count
    pub intercept_options: BTreeMap<u32, InterceptionOptionInfo>,
}

impl ArmyInterception {
    pub fn new(target_tile: TileId, threats: Vec<ThreatValueInfo>, ignored_threats: Vec<Threat>) -> Result<Self> {
        if let Some(mixed) = threats.iter().find(|t| t.threat.origin() != target_tile) {
            return Err(InterceptError::MixedOrigins {
                expected: target_tile,
                found: mixed.threat.origin(),
            });
        }

        let best_threat = select_best(&threats);
        let kill_threat = select_kill(&threats).or(best_threat);

        if let (Some(kill), Some(best)) = (select_kill(&threats), best_threat) {
            let (k, b) = (&threats[kill], &threats[best]);
            if kill != best && !b.threat.is_kill() && k.value_per_turn == b.value_per_turn {
                tracing::warn!(
                    "Kill threat {:?} displaced by non-kill threat {:?} at equal value/turn {:.3}",
                    k.threat.id,
                    b.threat.id,
                    b.value_per_turn
                );
            }
        }

        Ok(Self {
            target_tile,
            threats,
            ignored_threats,
            kill_threat,
            best_threat,
            common_intercept_points: BTreeMap::new(),
            intercept_options: BTreeMap::new(),
        })
    }

    pub fn best(&self) -> Option<&ThreatValueInfo> {
        self.best_threat.map(|i| &self.threats[i])
    }

    pub fn kill(&self) -> Option<&ThreatValueInfo> {
        self.kill_threat.map(|i| &self.threats[i])
    }

    pub fn longest_threat_length(&self) -> u32 {
        self.threats.iter().map(ThreatValueInfo::length).max().unwrap_or(0)
    }

    /// Option with the highest value per turn; ties go to fewer turns
    pub fn best_option(&self) -> Option<&InterceptionOptionInfo> {
        self.intercept_options
            .values()
            .fold(None, |best: Option<&InterceptionOptionInfo>, option| match best {
                Some(b) if option.value_per_turn() <= b.value_per_turn() => Some(b),
                _ => Some(option),
            })
    }

    pub fn has_options(&self) -> bool {
        !self.intercept_options.is_empty()
    }
}

/// Ordering for the best threat: value per turn, then kills over
/// non-kills, then longer non-kill paths or shorter kill paths
fn best_order(a: &ThreatValueInfo, b: &ThreatValueInfo) -> Ordering {
    a.value_per_turn
        .total_cmp(&b.value_per_turn)
        .then_with(|| a.threat.is_kill().cmp(&b.threat.is_kill()))
        .then_with(|| {
            if a.threat.is_kill() {
                b.length().cmp(&a.length())
            } else {
                a.length().cmp(&b.length())
            }
        })
}

fn select_best(threats: &[ThreatValueInfo]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, info) in threats.iter().enumerate() {
        match best {
            Some(b) if best_order(info, &threats[b]) != Ordering::Greater => {}
            _ => best = Some(i),
        }
    }
    best
}

fn select_kill(threats: &[ThreatValueInfo]) -> Option<usize> {
    let mut kill: Option<usize> = None;
    for (i, info) in threats.iter().enumerate() {
        if !info.threat.is_kill() || info.threat.value <= 0.0 {
            continue;
        }
        let better = match kill {
            None => true,
            Some(k) => {
                let current = &threats[k];
                info.value_per_turn
                    .total_cmp(&current.value_per_turn)
                    .then_with(|| current.length().cmp(&info.length()))
                    == Ordering::Greater
            }
        };
        if better {
            kill = Some(i);
        }
    }
    kill
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::board::Board;
    use crate::core::types::{PlayerId, ThreatId};
    use crate::threat::{analyze_path, ThreatKind, TilePath};

    fn info(board: &Board, id: u32, kind: ThreatKind, len: u32, value: f32) -> ThreatValueInfo {
        let tiles: Vec<TileId> = (0..=len).map(TileId).collect();
        let path = TilePath::from_tiles(&tiles).unwrap();
        let analysis = Rc::new(analyze_path(board, &path, 12).unwrap());
        let threat = Threat::new(ThreatId(id), kind, PlayerId(1), path, 10.0);
        ThreatValueInfo::new(threat, analysis, value, len)
    }

    #[test]
    fn test_kill_wins_equal_tie() {
        let board = Board::new(12, 1, PlayerId(0));
        let econ = info(&board, 1, ThreatKind::Econ, 5, 10.0);
        let kill = info(&board, 2, ThreatKind::Kill, 5, 10.0);

        let agg = ArmyInterception::new(TileId(0), vec![econ, kill], vec![]).unwrap();
        assert_eq!(agg.best_threat, Some(1));
        assert_eq!(agg.kill_threat, agg.best_threat);
    }

    #[test]
    fn test_longer_non_kill_wins_tie() {
        let board = Board::new(12, 1, PlayerId(0));
        let short = info(&board, 1, ThreatKind::Econ, 4, 8.0);
        let long = info(&board, 2, ThreatKind::Econ, 8, 16.0);

        let agg = ArmyInterception::new(TileId(0), vec![short, long], vec![]).unwrap();
        assert_eq!(agg.best().unwrap().threat.id, ThreatId(2));
        // No kill threats: kill falls back to best
        assert_eq!(agg.kill_threat, agg.best_threat);
    }

    #[test]
    fn test_shorter_kill_wins_kill_tie() {
        let board = Board::new(12, 1, PlayerId(0));
        let long = info(&board, 1, ThreatKind::Kill, 8, 16.0);
        let short = info(&board, 2, ThreatKind::Kill, 4, 8.0);

        let agg = ArmyInterception::new(TileId(0), vec![long, short], vec![]).unwrap();
        assert_eq!(agg.kill().unwrap().threat.id, ThreatId(2));
        assert_eq!(agg.best().unwrap().threat.id, ThreatId(2));
    }

    #[test]
    fn test_higher_value_non_kill_is_best() {
        let board = Board::new(12, 1, PlayerId(0));
        let kill = info(&board, 1, ThreatKind::Kill, 5, 10.0);
        let econ = info(&board, 2, ThreatKind::Econ, 5, 20.0);

        let agg = ArmyInterception::new(TileId(0), vec![kill, econ], vec![]).unwrap();
        assert_eq!(agg.best().unwrap().threat.id, ThreatId(2));
        assert_eq!(agg.kill().unwrap().threat.id, ThreatId(1));
    }

    #[test]
    fn test_zero_value_kill_is_not_kill_threat() {
        let board = Board::new(12, 1, PlayerId(0));
        let mut kill = info(&board, 1, ThreatKind::Kill, 5, 10.0);
        kill.threat.value = 0.0;
        let econ = info(&board, 2, ThreatKind::Econ, 5, 5.0);

        let agg = ArmyInterception::new(TileId(0), vec![kill, econ], vec![]).unwrap();
        // The kill still ranks best on value/turn, and becomes the fallback
        assert_eq!(agg.best_threat, Some(0));
        assert_eq!(agg.kill_threat, Some(0));
    }

    #[test]
    fn test_mixed_origin_rejected() {
        let board = Board::new(12, 1, PlayerId(0));
        let a = info(&board, 1, ThreatKind::Econ, 5, 10.0);
        let result = ArmyInterception::new(TileId(3), vec![a], vec![]);
        assert!(matches!(result, Err(InterceptError::MixedOrigins { .. })));
    }

    #[test]
    fn test_empty_aggregate() {
        let agg = ArmyInterception::new(TileId(0), vec![], vec![]).unwrap();
        assert!(agg.best().is_none());
        assert!(agg.kill().is_none());
        assert_eq!(agg.longest_threat_length(), 0);
        assert!(agg.best_option().is_none());
    }
}
