use thiserror::Error;

use crate::core::types::TileId;

#[derive(Error, Debug)]
pub enum InterceptError {
    #[error("Threat list is empty")]
    EmptyThreatList,

    #[error("Threats do not share an origin tile: expected {expected}, found {found}")]
    MixedOrigins { expected: TileId, found: TileId },

    #[error("Path is empty")]
    EmptyPath,

    #[error("No distance data between {from} and {to}")]
    MissingDistance { from: TileId, to: TileId },

    #[error("Tile not on board: {0}")]
    UnknownTile(TileId),

    #[error("Coordinate ({x}, {y}) is off the board")]
    OffBoard { x: i32, y: i32 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InterceptError>;
