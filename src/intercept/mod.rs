//! Interception planning engine

pub mod aggregate;
pub mod blocking;
pub mod consensus;
pub mod options;
pub mod outcome;
pub mod path_search;
pub mod planner;
pub mod pruner;
pub mod split;
pub mod valuator;

pub use aggregate::ArmyInterception;
pub use blocking::{apply_partial_commit, build_block_table, ThreatBlockInfo, ThreatBlockTable};
pub use consensus::{find_shared_chokes, ChokeConsensus, InterceptPointTileInfo};
pub use options::{build_option_table, InterceptionOptionInfo};
pub use outcome::{evaluate_outcome, InterceptOutcome};
pub use path_search::{search_intercept_paths, CandidatePath, InterceptPriority, InterceptScore};
pub use planner::InterceptPlanner;
pub use pruner::{prune_threats, PruneMode, PrunedThreats, ThreatValueInfo};
pub use split::{decide_delay_split, SplitDecision};
pub use valuator::{value_path, PathValue, ValuationParams};
