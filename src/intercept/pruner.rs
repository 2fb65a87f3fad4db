//! Threat pruning and valuation
//!
//! Filters the detector's raw threats down to the ones worth planning
//! against. Every input threat ends up either kept (with its valuation) or
//! ignored.

use std::rc::Rc;

use crate::board::Board;
use crate::core::config::InterceptConfig;
use crate::core::error::{InterceptError, Result};
use crate::intercept::valuator::{value_path, value_per_turn, ValuationParams};
use crate::threat::{AnalysisCache, DestinationClass, PathAnalysis, Threat};

/// How aggressively to drop weak threats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneMode {
    /// Class caps plus the length and value/turn cutoffs
    Strict,
    /// Class caps only, but drops threats whose first move reverses the
    /// owner's last move
    Permissive,
}

/// A kept threat with its economic valuation
#[derive(Debug, Clone)]
pub struct ThreatValueInfo {
    pub threat: Threat,
    pub analysis: Rc<PathAnalysis>,
    pub value: f32,
    pub turns: u32,
    pub value_per_turn: f32,
}

impl ThreatValueInfo {
    pub fn new(threat: Threat, analysis: Rc<PathAnalysis>, value: f32, turns: u32) -> Self {
        Self {
            threat,
            analysis,
            value,
            turns,
            value_per_turn: value_per_turn(value, turns),
        }
    }

    pub fn length(&self) -> u32 {
        self.threat.length()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrunedThreats {
    pub kept: Vec<ThreatValueInfo>,
    pub ignored: Vec<Threat>,
}

/// Depth bound used when a threat's analysis has to be built
pub fn analysis_depth(board: &Board, threat: &Threat, turns_left: u32, config: &InterceptConfig) -> u32 {
    let base = config.pruning.analysis_base_depth + turns_left / 2;
    let span = board
        .distance(threat.origin(), threat.target_tile())
        .unwrap_or(threat.length());
    base.max(span)
}

fn class_cap(class: DestinationClass, config: &InterceptConfig) -> usize {
    match class {
        DestinationClass::General => config.pruning.max_general_threats,
        DestinationClass::City => config.pruning.max_city_threats,
        DestinationClass::Expansion => config.pruning.max_expansion_threats,
    }
}

/// Value a single threat from the defender's point of view
pub fn value_threat(
    board: &Board,
    cache: &mut AnalysisCache,
    threat: &Threat,
    turns_left: u32,
    config: &InterceptConfig,
) -> Result<ThreatValueInfo> {
    let depth = analysis_depth(board, threat, turns_left, config);
    let analysis = cache.get_or_build(board, threat, depth)?;

    let params = ValuationParams::new(threat.player, board.player, turns_left);
    let valued = value_path(board, &threat.path, &params, &config.valuation);

    let mut value = valued.value;
    if valued.captured_general && !threat.is_kill() {
        // Only a genuine kill is allowed to count the general; otherwise the
        // defender gives up something cheaper first
        value -= config.valuation.general_capture_value;
    }
    Ok(ThreatValueInfo::new(threat.clone(), analysis, value, valued.turns))
}

pub fn prune_threats(
    board: &Board,
    cache: &mut AnalysisCache,
    threats: &[Threat],
    turns_left: u32,
    mode: PruneMode,
    config: &InterceptConfig,
) -> Result<PrunedThreats> {
    let first = threats.first().ok_or(InterceptError::EmptyThreatList)?;
    let origin = first.origin();
    if let Some(mixed) = threats.iter().find(|t| t.origin() != origin) {
        return Err(InterceptError::MixedOrigins {
            expected: origin,
            found: mixed.origin(),
        });
    }

    let mut pruned = PrunedThreats::default();
    let mut general_count = 0;
    let mut city_count = 0;
    let mut expansion_count = 0;

    for threat in threats {
        if threat.length() == 0 {
            tracing::debug!("Ignoring zero-length threat {:?}", threat.id);
            pruned.ignored.push(threat.clone());
            continue;
        }
        if mode == PruneMode::Permissive && threat.first_move_reverses(board) {
            tracing::debug!("Ignoring reversing threat {:?}", threat.id);
            pruned.ignored.push(threat.clone());
            continue;
        }

        let class = threat.destination_class(board);
        let count = match class {
            DestinationClass::General => &mut general_count,
            DestinationClass::City => &mut city_count,
            DestinationClass::Expansion => &mut expansion_count,
        };
        if *count >= class_cap(class, config) {
            tracing::debug!("Ignoring threat {:?}: {:?} cap reached", threat.id, class);
            pruned.ignored.push(threat.clone());
            continue;
        }
        *count += 1;

        pruned
            .kept
            .push(value_threat(board, cache, threat, turns_left, config)?);
    }

    if mode == PruneMode::Strict && !pruned.kept.is_empty() {
        apply_cutoffs(board, &mut pruned, turns_left, config);
    }

    Ok(pruned)
}

/// Drop short or low value/turn threats. General-bound threats always
/// survive; everything else may go, leaving `kept` empty.
fn apply_cutoffs(board: &Board, pruned: &mut PrunedThreats, turns_left: u32, config: &InterceptConfig) {
    let kept = std::mem::take(&mut pruned.kept);
    let count = kept.len() as f32;

    let max_len = kept.iter().map(ThreatValueInfo::length).max().unwrap_or(0);
    let avg_len = kept.iter().map(|t| t.length() as f32).sum::<f32>() / count;
    let avg_vpt = kept.iter().map(|t| t.value_per_turn).sum::<f32>() / count;
    let max_vpt = kept
        .iter()
        .map(|t| t.value_per_turn)
        .fold(f32::NEG_INFINITY, f32::max);

    let length_cutoff = (max_len as f32 / 4.0)
        .max(2.0 * avg_len / 3.0)
        .min(turns_left.saturating_sub(2) as f32);
    let vpt_cutoff = config.pruning.value_per_turn_cutoff * max_vpt;

    tracing::debug!(
        "Threat cutoffs: max_len {} avg_len {:.2} avg_vpt {:.2} max_vpt {:.2} -> len <= {:.2}, vpt <= {:.2}",
        max_len,
        avg_len,
        avg_vpt,
        max_vpt,
        length_cutoff,
        vpt_cutoff
    );

    for info in kept {
        let exempt = info.threat.destination_class(board) == DestinationClass::General;
        let too_short = info.length() as f32 <= length_cutoff;
        let too_cheap = info.value_per_turn <= vpt_cutoff;
        if !exempt && (too_short || too_cheap) {
            tracing::debug!(
                "Ignoring threat {:?}: len {} vpt {:.2}",
                info.threat.id,
                info.length(),
                info.value_per_turn
            );
            pruned.ignored.push(info.threat);
        } else {
            pruned.kept.push(info);
        }
    }
}
