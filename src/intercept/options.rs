//! Turn-indexed table of intercept options

use std::collections::BTreeMap;

use serde::Serialize;

use crate::board::Board;
use crate::core::config::InterceptConfig;
use crate::core::error::{InterceptError, Result};
use crate::core::types::TileId;
use crate::intercept::aggregate::ArmyInterception;
use crate::intercept::outcome::evaluate_outcome;
use crate::intercept::path_search::CandidatePath;
use crate::intercept::split::decide_delay_split;
use crate::intercept::valuator::{value_path, value_per_turn, ValuationParams};
use crate::threat::TilePath;

/// One way to meet the threat, valued over a fixed number of turns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterceptionOptionInfo {
    pub path: TilePath,
    pub value: f32,
    pub turns: u32,
    pub damage_blocked: f32,
    pub intercepting_army_remaining: i32,
    pub best_case_intercept_moves: u32,
    pub worst_case_intercept_moves: u32,
    pub recapture_turns: u32,
    pub requires_delay: bool,
    pub intercept_tile: TileId,
}

impl InterceptionOptionInfo {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        path: TilePath,
        value: f32,
        turns: u32,
        damage_blocked: f32,
        intercepting_army_remaining: i32,
        best_case_intercept_moves: u32,
        worst_case_intercept_moves: u32,
        recapture_turns: u32,
        requires_delay: bool,
        intercept_tile: TileId,
    ) -> Result<Self> {
        if path.is_empty() {
            return Err(InterceptError::EmptyPath);
        }
        Ok(Self {
            path,
            value,
            turns,
            damage_blocked,
            intercepting_army_remaining,
            best_case_intercept_moves,
            worst_case_intercept_moves,
            recapture_turns,
            requires_delay,
            intercept_tile,
        })
    }

    pub fn value_per_turn(&self) -> f32 {
        value_per_turn(self.value, self.turns)
    }
}

pub fn build_option_table(
    board: &Board,
    interception: &ArmyInterception,
    candidates: &[CandidatePath],
    turns_left_in_cycle: u32,
    config: &InterceptConfig,
) -> Result<BTreeMap<u32, InterceptionOptionInfo>> {
    let mut table: BTreeMap<u32, InterceptionOptionInfo> = BTreeMap::new();
    let Some(best) = interception.best() else {
        return Ok(table);
    };
    let threat = &best.threat;

    for candidate in candidates {
        let Some(point) = interception.common_intercept_points.get(&candidate.choke) else {
            continue;
        };
        let raw_len = candidate.path.length();
        let threat_now = threat.path.tile_at(raw_len as usize);
        let close_turns = board.require_distance(candidate.choke, threat_now)?.div_ceil(2);
        let extra = point.max_extra_moves;

        let mut absorb = threat.army(board);
        if candidate.path.contains(threat.target_tile()) {
            absorb -= board.tile(threat.target_tile()).army;
        }

        let decision = decide_delay_split(board, &candidate.path, &interception.threats);
        let delay = u32::from(decision.requires_delay);
        let mut path = candidate.path.clone();
        if decision.split {
            path = path.with_half_move(0);
        }
        if let Some(index) = candidate.partial_commit {
            path = path.with_half_move(index);
        }

        let outcome = evaluate_outcome(board, &path, best, turns_left_in_cycle, &config.valuation);
        let best_case = outcome.best_case_moves + delay;
        let worst_case = outcome.worst_case_moves + delay;

        let consumed = outcome
            .friendly_army
            .min(outcome.enemy_army_collided)
            .min(absorb)
            .max(0);
        let params = ValuationParams {
            army_offset: consumed,
            recapture_delay: close_turns + extra,
            ..ValuationParams::new(board.player, threat.player, turns_left_in_cycle)
        };
        let valued = value_path(board, &path, &params, &config.valuation);

        let effective = valued.turns + close_turns + extra;
        let total = (effective + delay + valued.recapture_turns).max(best_case);

        for turns in (raw_len + delay).max(best_case)..=total {
            let unused = (total - turns).min(valued.recapture_turns);
            let value = valued.value + outcome.blocked_value
                - unused as f32 * config.valuation.target_tile_value;

            if table.get(&turns).is_some_and(|existing| existing.value >= value) {
                continue;
            }
            let option = InterceptionOptionInfo::new(
                path.clone(),
                value,
                turns,
                outcome.blocked_value,
                outcome.friendly_army - outcome.enemy_army_collided,
                best_case,
                worst_case,
                valued.recapture_turns,
                decision.requires_delay,
                outcome.intercept_tile,
            )?;
            table.insert(turns, option);
        }
    }

    tracing::debug!("{} intercept options from {} candidates", table.len(), candidates.len());
    Ok(table)
}
