//! Error taxonomy for a single engine move request.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while asking an engine for a move.
///
/// Every variant is terminal for the request that produced it. The engine
/// process is torn down before any of these reaches the caller.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine executable is missing or cannot be executed.
    #[error("Failed to spawn engine {}: {source}", path.display())]
    ProcessSpawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading from or writing to the engine's pipes failed mid-session.
    #[error("Engine protocol error: {0}")]
    Protocol(#[from] std::io::Error),
    /// The engine produced no result line within the bound.
    #[error("No result from engine within {0:?}")]
    Timeout(Duration),
    /// The result line or its move text is malformed.
    #[error("Malformed engine result: {0}")]
    Parse(String),
    /// Well-formed move text that matches no legal move.
    #[error("Engine move {0} matches no legal move")]
    NoMatch(String),
    /// Skill level outside `0..=20`.
    #[error("Skill level {0} is outside 0..=20")]
    InvalidSkillLevel(i64),
}
