//! Per-threat analysis cache
//!
//! Analyses are keyed by threat id and built at most once. The planner owns
//! the cache, so entries survive across planning calls for as long as the
//! same threats keep being passed in.

use std::rc::Rc;

use ahash::AHashMap;

use crate::board::Board;
use crate::core::error::Result;
use crate::core::types::ThreatId;
use crate::threat::analysis::{analyze_path, PathAnalysis};
use crate::threat::threat::Threat;

#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: AHashMap<ThreatId, Rc<PathAnalysis>>,
    builds: usize,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ThreatId) -> Option<Rc<PathAnalysis>> {
        self.entries.get(&id).cloned()
    }

    /// Existing analysis for `threat`, or build one bounded to `max_depth`
    pub fn get_or_build(
        &mut self,
        board: &Board,
        threat: &Threat,
        max_depth: u32,
    ) -> Result<Rc<PathAnalysis>> {
        if let Some(existing) = self.entries.get(&threat.id) {
            return Ok(Rc::clone(existing));
        }
        let analysis = Rc::new(analyze_path(board, &threat.path, max_depth)?);
        self.builds += 1;
        self.entries.insert(threat.id, Rc::clone(&analysis));
        Ok(analysis)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of analyses built so far
    pub fn build_count(&self) -> usize {
        self.builds
    }
}
