//! Planner configuration with documented constants
//!
//! Every tunable number the interception engine uses is collected here.
//! Sections default individually, so a TOML file only needs the keys it
//! changes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{InterceptError, Result};

/// Economic constants used by the path valuator and the outcome evaluator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Turns in one army-growth cycle. Recapture credit stops at the cycle end.
    pub cycle_length: u32,

    /// Absolute turns between increments of the per-tile capture cost
    pub growth_interval: u32,

    /// Value of capturing the target's general
    pub general_capture_value: f32,

    /// Flat value of capturing a target-owned city
    pub city_capture_value: f32,

    /// Extra city value per turn it is held until the cycle ends
    pub city_held_turn_value: f32,

    /// Value of capturing any other target-owned tile. Also the recapture rate.
    pub target_tile_value: f32,

    /// Value of capturing a tile owned by some other player
    pub third_party_tile_value: f32,

    /// Value of capturing a neutral tile
    pub neutral_tile_value: f32,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            cycle_length: 50,
            growth_interval: 50,
            general_capture_value: 25.0,
            city_capture_value: 5.0,
            city_held_turn_value: 0.2,
            target_tile_value: 2.21,
            third_party_tile_value: 0.5,
            neutral_tile_value: 1.0,
        }
    }
}

/// Limits applied while filtering raw threats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PruningConfig {
    /// Threats ending on a general kept per call
    pub max_general_threats: usize,

    /// Threats ending on a city kept per call
    pub max_city_threats: usize,

    /// Threats ending anywhere else kept per call
    pub max_expansion_threats: usize,

    /// Non-general threats at or below this fraction of the best value/turn are dropped
    pub value_per_turn_cutoff: f32,

    /// Base search depth for path analysis, before adding half the cycle turns left
    pub analysis_base_depth: u32,
}

impl Default for PruningConfig {
    fn default() -> Self {
        Self {
            max_general_threats: 2,
            max_city_threats: 2,
            max_expansion_threats: 3,
            value_per_turn_cutoff: 0.85,
            analysis_base_depth: 6,
        }
    }
}

/// Bounds on the intercept path search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// How far (board units) a step may move away from the predicted enemy
    /// centroid before it counts as a retreat
    pub retreat_tolerance: f32,

    /// Upper bound on accepted paths kept per choke tile
    pub max_candidates_per_choke: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            retreat_tolerance: 0.8,
            max_candidates_per_choke: 16,
        }
    }
}

/// Complete planner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterceptConfig {
    #[serde(default)]
    pub valuation: ValuationConfig,
    #[serde(default)]
    pub pruning: PruningConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl InterceptConfig {
    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: InterceptConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Turns remaining before the current growth cycle ends
    pub fn turns_left_in_cycle(&self, turn: u32) -> u32 {
        let cycle = self.valuation.cycle_length.max(1);
        cycle - turn % cycle
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.valuation.cycle_length == 0 {
            return Err(InterceptError::InvalidConfig(
                "cycle_length must be positive".into(),
            ));
        }
        if self.valuation.growth_interval == 0 {
            return Err(InterceptError::InvalidConfig(
                "growth_interval must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pruning.value_per_turn_cutoff) {
            return Err(InterceptError::InvalidConfig(format!(
                "value_per_turn_cutoff ({}) must be within 0..=1",
                self.pruning.value_per_turn_cutoff
            )));
        }
        if self.search.retreat_tolerance < 0.0 {
            return Err(InterceptError::InvalidConfig(
                "retreat_tolerance must not be negative".into(),
            ));
        }
        if self.search.max_candidates_per_choke == 0 {
            return Err(InterceptError::InvalidConfig(
                "max_candidates_per_choke must be positive".into(),
            ));
        }
        Ok(())
    }
}
