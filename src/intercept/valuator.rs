//! Turn-by-turn economic simulation of a path
//!
//! The mover walks the path with a signed army balance. Hostile tiles cost
//! their army plus one; friendly tiles add their army. Captures made while
//! the balance is still positive earn value by tile class. Leftover army
//! after the path ends keeps recapturing target tiles until the growth
//! cycle ends.

use crate::board::Board;
use crate::core::config::ValuationConfig;
use crate::core::types::{PlayerId, TileId};
use crate::threat::path::TilePath;

/// Who walks the path and how leftover army is credited
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationParams {
    pub mover: PlayerId,
    /// Player whose tiles earn the target rates
    pub target: PlayerId,
    pub turns_left_in_cycle: u32,
    /// Army already spent before the path starts
    pub army_offset: i32,
    /// Turns between the path end and the first recapture
    pub recapture_delay: u32,
    pub include_recapture: bool,
}

impl ValuationParams {
    pub fn new(mover: PlayerId, target: PlayerId, turns_left_in_cycle: u32) -> Self {
        Self {
            mover,
            target,
            turns_left_in_cycle,
            army_offset: 0,
            recapture_delay: 0,
            include_recapture: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathValue {
    pub value: f32,
    /// Turns spent walking the path, including split turns
    pub turns: u32,
    pub recapture_turns: u32,
    /// Signed balance left when the path ends
    pub army_remaining: i32,
    pub captured_general: bool,
}

impl PathValue {
    pub fn value_per_turn(&self) -> f32 {
        value_per_turn(self.value, self.turns)
    }
}

/// `value / max(1, turns)`
pub fn value_per_turn(value: f32, turns: u32) -> f32 {
    value / turns.max(1) as f32
}

/// Value of capturing `tile` from `target`'s point of view
pub fn tile_capture_value(
    board: &Board,
    tile: TileId,
    target: PlayerId,
    turns_left_after: u32,
    config: &ValuationConfig,
) -> f32 {
    let t = board.tile(tile);
    if t.is_neutral() {
        return config.neutral_tile_value;
    }
    if !board.is_friendly_to(tile, target) {
        return config.third_party_tile_value;
    }
    if t.is_general {
        config.general_capture_value
    } else if t.is_city {
        config.city_capture_value + config.city_held_turn_value * turns_left_after as f32
    } else {
        config.target_tile_value
    }
}

/// Extra army owned tiles gain between `turn` and `turn + elapsed`
pub fn growth_offset(turn: u32, elapsed: u32, config: &ValuationConfig) -> i32 {
    let interval = config.growth_interval.max(1);
    ((turn + elapsed) / interval - turn / interval) as i32
}

pub fn value_path(
    board: &Board,
    path: &TilePath,
    params: &ValuationParams,
    config: &ValuationConfig,
) -> PathValue {
    let mut balance = board.tile(path.start).army - 1 - params.army_offset;
    let mut value = 0.0;
    let mut turns = 0u32;
    let mut captured_general = false;

    for step in &path.moves {
        turns += 1;
        if step.move_half {
            // Splitting costs a turn; the reinforcement credit is not halved
            turns += 1;
        }

        let tile = board.tile(step.to);
        if board.is_friendly_to(step.to, params.mover) {
            balance += tile.army;
            continue;
        }

        let growth = if tile.is_neutral() {
            0
        } else {
            growth_offset(board.turn, turns, config)
        };
        balance -= tile.army + 1 + growth;
        if balance > 0 {
            let turns_left_after = params.turns_left_in_cycle.saturating_sub(turns);
            value += tile_capture_value(board, step.to, params.target, turns_left_after, config);
            if tile.is_general && board.is_friendly_to(step.to, params.target) {
                captured_general = true;
            }
        }
    }

    let mut recapture_turns = 0;
    if params.include_recapture && balance > 0 {
        let remaining = params
            .turns_left_in_cycle
            .saturating_sub(turns + params.recapture_delay);
        recapture_turns = remaining.min((balance / 2) as u32);
        value += recapture_turns as f32 * config.target_tile_value;
    }

    PathValue {
        value,
        turns,
        recapture_turns,
        army_remaining: balance,
        captured_general,
    }
}
