//! Planning entry point
//!
//! Composes pruning, consensus, search and option building for one set of
//! threats sharing an origin. Path analyses are cached on the planner and
//! survive across calls.

use crate::board::Board;
use crate::core::config::InterceptConfig;
use crate::core::error::{InterceptError, Result};
use crate::core::types::TileId;
use crate::intercept::aggregate::ArmyInterception;
use crate::intercept::blocking::{build_block_table, ThreatBlockTable};
use crate::intercept::consensus::find_shared_chokes;
use crate::intercept::options::build_option_table;
use crate::intercept::path_search::search_intercept_paths;
use crate::intercept::pruner::{prune_threats, PruneMode, ThreatValueInfo};
use crate::threat::{AnalysisCache, Threat};

pub struct InterceptPlanner<'a> {
    board: &'a Board,
    config: InterceptConfig,
    cache: AnalysisCache,
}

impl<'a> InterceptPlanner<'a> {
    pub fn new(board: &'a Board, config: InterceptConfig) -> Self {
        Self {
            board,
            config,
            cache: AnalysisCache::new(),
        }
    }

    pub fn config(&self) -> &InterceptConfig {
        &self.config
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Blocking hints for every tracked threat, independent of any plan
    pub fn block_table(&self, threats: &[Threat]) -> ThreatBlockTable {
        build_block_table(self.board, threats)
    }

    /// Plan an interception. A strict pass that yields no options is retried
    /// once with permissive pruning; an empty table is a normal result.
    /// Blocking hints come from `threats` alone.
    pub fn plan(&mut self, threats: &[Threat]) -> Result<ArmyInterception> {
        self.check_tiles(threats)?;
        let block_table = self.block_table(threats);
        self.plan_checked(threats, &block_table)
    }

    /// Plan an interception against `threats` while honouring hints built
    /// from every tracked threat, including other origins
    pub fn plan_with_blocks(&mut self, threats: &[Threat], block_table: &ThreatBlockTable) -> Result<ArmyInterception> {
        self.check_tiles(threats)?;
        self.plan_checked(threats, block_table)
    }

    fn check_tiles(&self, threats: &[Threat]) -> Result<()> {
        for threat in threats {
            for tile in threat.path.tiles() {
                self.board.checked(tile)?;
            }
        }
        Ok(())
    }

    fn plan_checked(&mut self, threats: &[Threat], block_table: &ThreatBlockTable) -> Result<ArmyInterception> {
        let strict = self.plan_pass(threats, block_table, PruneMode::Strict)?;
        if strict.has_options() {
            return Ok(strict);
        }

        tracing::debug!("No intercept options from strict pass, retrying permissively");
        match self.plan_pass(threats, block_table, PruneMode::Permissive) {
            Ok(permissive) if permissive.has_options() || !permissive.threats.is_empty() => Ok(permissive),
            Ok(_) | Err(InterceptError::EmptyThreatList) => Ok(strict),
            Err(err) => Err(err),
        }
    }

    fn plan_pass(&mut self, threats: &[Threat], block_table: &ThreatBlockTable, mode: PruneMode) -> Result<ArmyInterception> {
        let turns_left = self.config.turns_left_in_cycle(self.board.turn);
        let pruned = prune_threats(self.board, &mut self.cache, threats, turns_left, mode, &self.config)?;
        tracing::debug!(
            "{:?} pruning kept {} and ignored {} threats",
            mode,
            pruned.kept.len(),
            pruned.ignored.len()
        );

        let origin = threats
            .first()
            .map(Threat::origin)
            .ok_or(InterceptError::EmptyThreatList)?;
        self.build(origin, pruned.kept, pruned.ignored, block_table, turns_left)
    }

    /// Build the aggregate for a fixed kept set, narrowing to the best threat
    /// when the threats agree on nothing but their origin
    fn build(
        &self,
        origin: TileId,
        kept: Vec<ThreatValueInfo>,
        ignored: Vec<Threat>,
        block_table: &ThreatBlockTable,
        turns_left: u32,
    ) -> Result<ArmyInterception> {
        let mut interception = ArmyInterception::new(origin, kept, ignored)?;
        let consensus = find_shared_chokes(self.board, &interception.threats, origin);

        if consensus.is_degenerate(origin) && interception.threats.len() > 1 {
            if let Some(best) = interception.best_threat {
                tracing::debug!(
                    "Chokes collapsed to the origin over {} threats, narrowing to {:?}",
                    interception.threats.len(),
                    interception.threats[best].threat.id
                );
                let ArmyInterception {
                    threats,
                    ignored_threats,
                    ..
                } = interception;
                let mut narrowed_ignored = ignored_threats;
                let mut narrowed = Vec::with_capacity(1);
                for (i, info) in threats.into_iter().enumerate() {
                    if i == best {
                        narrowed.push(info);
                    } else {
                        narrowed_ignored.push(info.threat);
                    }
                }
                return self.build(origin, narrowed, narrowed_ignored, block_table, turns_left);
            }
        }

        interception.common_intercept_points = consensus.chokes;
        let candidates = search_intercept_paths(self.board, &interception, block_table, &self.config)?;
        interception.intercept_options =
            build_option_table(self.board, &interception, &candidates, turns_left, &self.config)?;
        Ok(interception)
    }
}
