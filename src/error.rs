use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Rejected placement of the player or an object.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("room '{0}' does not exist")]
    UnknownRoom(String),
    #[error("object '{0}' does not exist")]
    UnknownObject(String),
    #[error("position ({x}, {y}) does not fit in room '{room}' ({width} x {height})")]
    OutOfBounds {
        room: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read world file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse world file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid world: {0}")]
    Invalid(String),
}
