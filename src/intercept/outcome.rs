//! Collision between a candidate intercept path and a threat
//!
//! Walks both paths in lockstep to find where and when they meet, then
//! credits the captures the threat no longer makes as blocked damage.

use crate::board::Board;
use crate::core::config::ValuationConfig;
use crate::core::types::TileId;
use crate::intercept::pruner::ThreatValueInfo;
use crate::intercept::valuator::{growth_offset, tile_capture_value};
use crate::threat::{Threat, TilePath};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterceptOutcome {
    pub intercept_tile: TileId,
    /// Index into the threat's path where the collision happens
    pub threat_index: usize,
    pub blocked_value: f32,
    pub enemy_army_remaining: i32,
    pub enemy_army_collided: i32,
    /// Army we bring to the collision
    pub friendly_army: i32,
    pub best_case_moves: u32,
    pub worst_case_moves: u32,
}

/// How the two paths meet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Contact {
    threat_index: usize,
    moves: u32,
    /// We were waiting next to the threat; parity decides who strikes
    contested: bool,
    /// Priority turn of the contested exchange
    turn_offset: u32,
}

/// Army we carry after each move along `path`. A half move takes only half
/// the stack forward.
pub fn friendly_army_along(board: &Board, path: &TilePath) -> Vec<i32> {
    let mut carried = board.tile(path.start).army - 1;
    let mut armies = Vec::with_capacity(path.moves.len() + 1);
    armies.push(carried);
    for step in &path.moves {
        if step.move_half {
            carried /= 2;
        }
        let tile = board.tile(step.to);
        if board.is_friendly(step.to) {
            carried += tile.army - 1;
        } else {
            carried -= tile.army + 1;
        }
        armies.push(carried);
    }
    armies
}

/// Threat's army balance after each capture, continuing from `start_index`
/// with `army` in hand
fn threat_balance_from(board: &Board, threat: &Threat, start_index: usize, army: i32, config: &ValuationConfig) -> Vec<i32> {
    let len = threat.length() as usize;
    let mut balance = army;
    let mut out = vec![balance];
    for k in start_index + 1..=len {
        let tile_id = threat.path.tile_at(k);
        let tile = board.tile(tile_id);
        if board.is_friendly_to(tile_id, threat.player) {
            balance += tile.army;
        } else {
            let growth = if tile.is_neutral() {
                0
            } else {
                growth_offset(board.turn, k as u32, config)
            };
            balance -= tile.army + 1 + growth;
        }
        out.push(balance);
    }
    out
}

fn find_contact(board: &Board, path: &TilePath, threat: &Threat) -> Option<Contact> {
    let ours = path.length() as usize;
    let theirs = threat.length() as usize;
    let choke = path.tail();

    for t in 1..=ours.max(theirs) {
        let (p, p_prev) = (path.tile_at(t), path.tile_at(t - 1));
        let (q, q_prev) = (threat.path.tile_at(t), threat.path.tile_at(t - 1));

        if p == q {
            return Some(Contact {
                threat_index: t.min(theirs),
                moves: t as u32,
                contested: false,
                turn_offset: 0,
            });
        }
        if p == q_prev && p_prev == q {
            // Swap: whoever moves first catches the other on its old tile
            let ours_first = board.has_move_priority(board.player, threat.player, board.turn + t as u32 - 1);
            let threat_index = if ours_first { t - 1 } else { t };
            return Some(Contact {
                threat_index: threat_index.min(theirs),
                moves: t as u32,
                contested: false,
                turn_offset: 0,
            });
        }
        if t >= ours && t < theirs && board.adjacent(choke, q) {
            let threat_index = if threat.path.tile_at(t + 1) == choke { t + 1 } else { t };
            return Some(Contact {
                threat_index,
                moves: t as u32 + 1,
                contested: true,
                turn_offset: t as u32,
            });
        }
    }
    None
}

pub fn evaluate_outcome(
    board: &Board,
    path: &TilePath,
    info: &ThreatValueInfo,
    turns_left_in_cycle: u32,
    config: &ValuationConfig,
) -> InterceptOutcome {
    let threat = &info.threat;
    let ours = path.length();
    let theirs = threat.length() as usize;
    let choke = path.tail();

    let contact = find_contact(board, path, threat).unwrap_or_else(|| {
        let chase = board.distance(choke, threat.target_tile()).unwrap_or(0);
        tracing::warn!(
            "Threat {:?} path exhausted before contact with {}; chasing {} more moves",
            threat.id,
            choke,
            chase
        );
        Contact {
            threat_index: theirs,
            moves: ours.max(threat.length()) + chase,
            contested: false,
            turn_offset: 0,
        }
    });

    let offset = if info.analysis.is_on_corridor(choke) {
        info.analysis.intercept_turn_offset(choke).unwrap_or(0)
    } else {
        1
    };
    let mut worst = contact.moves + offset;
    if contact.contested
        && !board.has_move_priority(board.player, threat.player, board.turn + contact.turn_offset)
    {
        worst += 1;
    }

    let friendly = friendly_army_along(board, path);
    let friendly_army = friendly[(contact.moves as usize).min(friendly.len() - 1)];

    let balance = threat_balance_from(board, threat, 0, threat.army(board) - 1, config);
    let ci = contact.threat_index;
    let enemy_arriving = balance[ci.saturating_sub(1)].max(0);
    let enemy_army_collided = enemy_arriving.min(friendly_army.max(0));
    let enemy_army_remaining = (enemy_arriving - friendly_army.max(0)).max(0);

    // Last tile the unopposed threat still takes for free
    let mut free = theirs;
    while free > 0 && balance[free] <= 0 {
        free -= 1;
    }
    if free < ci {
        tracing::warn!(
            "Threat {:?} stalls at index {} before the collision at {}",
            threat.id,
            free,
            ci
        );
    }

    // Tiles the threat still takes after the collision are not blocked
    let first_blocked = if enemy_army_remaining > 0 {
        let resumed = threat_balance_from(board, threat, ci, enemy_army_remaining, config);
        let taken = resumed.iter().skip(1).take_while(|&&b| b > 0).count();
        ci + taken + 1
    } else {
        ci
    };

    let mut blocked_value = 0.0;
    for k in first_blocked..=free {
        if k as u32 > turns_left_in_cycle {
            break;
        }
        let tile_id = threat.path.tile_at(k);
        if board.is_friendly_to(tile_id, threat.player) {
            continue;
        }
        if board.tile(tile_id).is_general && !threat.is_kill() {
            continue;
        }
        let turns_left_after = turns_left_in_cycle - k as u32;
        blocked_value += tile_capture_value(board, tile_id, board.player, turns_left_after, config);
    }

    InterceptOutcome {
        intercept_tile: threat.path.tile_at(ci),
        threat_index: ci,
        blocked_value,
        enemy_army_remaining,
        enemy_army_collided,
        friendly_army,
        best_case_moves: contact.moves,
        worst_case_moves: worst,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::core::types::{PlayerId, ThreatId};
    use crate::threat::{analyze_path, ThreatKind};

    const US: PlayerId = PlayerId(0);
    const ENEMY: PlayerId = PlayerId(1);

    /// 12x1 strip: enemy 50 at 0, our 1-army tiles on 4..=10 with a 40 stack
    /// on 6 and the general on 10
    fn strip() -> (Board, ThreatValueInfo) {
        let mut board = Board::new(12, 1, US);
        board.set_owner(TileId(0), Some(ENEMY), 50);
        for x in 4..10 {
            board.set_owner(TileId(x), Some(US), 1);
        }
        board.set_army(TileId(6), 40);
        board.set_general(TileId(10), US, 1);

        let path = TilePath::from_tiles(&(0..=10).map(TileId).collect::<Vec<_>>()).unwrap();
        let analysis = Rc::new(analyze_path(&board, &path, 16).unwrap());
        let threat = Threat::new(ThreatId(1), ThreatKind::Kill, ENEMY, path, 100.0);
        (board, ThreatValueInfo::new(threat, analysis, 100.0, 10))
    }

    #[test]
    fn test_head_on_collision() {
        let (board, info) = strip();
        let path = TilePath::from_tiles(&[TileId(6), TileId(5), TileId(4), TileId(3)]).unwrap();
        let outcome = evaluate_outcome(&board, &path, &info, 50, &ValuationConfig::default());

        assert_eq!(outcome.intercept_tile, TileId(3));
        assert_eq!(outcome.best_case_moves, 3);
        assert_eq!(outcome.worst_case_moves, 3);
        assert_eq!(outcome.friendly_army, 38);
        assert_eq!(outcome.enemy_army_collided, 38);
        assert_eq!(outcome.enemy_army_remaining, 9);
        // Leftover enemy still takes 4 and 5; only 6 is saved
        assert!((outcome.blocked_value - 2.21).abs() < 1e-4);
    }

    #[test]
    fn test_waiting_at_choke_is_contested() {
        let (board, info) = strip();
        let path = TilePath::from_tiles(&[TileId(6), TileId(5)]).unwrap();
        let outcome = evaluate_outcome(&board, &path, &info, 50, &ValuationConfig::default());

        // Threat reaches 4 at t=4, next to our stack
        assert_eq!(outcome.best_case_moves, 5);
        assert_eq!(outcome.intercept_tile, TileId(5));
        assert!(outcome.worst_case_moves >= outcome.best_case_moves);
    }

    #[test]
    fn test_strong_intercept_blocks_everything_after_contact() {
        let (mut board, info) = strip();
        board.set_army(TileId(6), 100);
        let path = TilePath::from_tiles(&[TileId(6), TileId(5), TileId(4), TileId(3)]).unwrap();
        let outcome = evaluate_outcome(&board, &path, &info, 50, &ValuationConfig::default());

        assert_eq!(outcome.enemy_army_remaining, 0);
        assert_eq!(outcome.enemy_army_collided, 47);
        // Unopposed the threat would stall on the big stack, taking 3..=5
        let expected = 1.0 + 2.0 * 2.21;
        assert!((outcome.blocked_value - expected).abs() < 1e-3);
    }

    #[test]
    fn test_half_move_halves_carried_army() {
        let (board, _) = strip();
        let path = TilePath::from_tiles(&[TileId(6), TileId(5), TileId(4)]).unwrap();
        let full = friendly_army_along(&board, &path);
        let half = friendly_army_along(&board, &path.with_half_move(0));
        assert_eq!(full, vec![39, 39, 39]);
        assert_eq!(half, vec![39, 19, 19]);
    }
}
