//! Threats produced by the detector and their cached corridor analysis

pub mod analysis;
pub mod cache;
pub mod path;
#[allow(clippy::module_inception)]
pub mod threat;

pub use analysis::{analyze_path, PathAnalysis};
pub use cache::AnalysisCache;
pub use path::{PathMove, TilePath};
pub use threat::{DestinationClass, Threat, ThreatKind};
