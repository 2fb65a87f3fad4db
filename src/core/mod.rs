pub mod config;
pub mod error;
pub mod types;

pub use config::{InterceptConfig, PruningConfig, SearchConfig, ValuationConfig};
pub use error::{InterceptError, Result};
pub use types::{PlayerId, TeamId, ThreatId, TileId, Turn};
