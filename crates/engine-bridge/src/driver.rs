//! The command sequence for one search and the bounded wait for its result.

use crate::position::RulesPosition;
use crate::process::EngineHandle;
use crate::{EngineError, SkillLevel};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;
use uci::{GoOptions, GuiCommand};

/// Name of the UCI option controlling playing strength.
pub const SKILL_LEVEL_OPTION: &str = "Skill Level";

/// Parameters of a single timed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    pub skill: SkillLevel,
    /// Time the engine is told to search.
    pub movetime: Duration,
    /// Extra time allowed for the engine to report after `movetime`.
    pub safety_margin: Duration,
}

impl SearchParams {
    /// Upper bound on the wait for the result line.
    pub fn deadline(&self) -> Duration {
        self.movetime + self.safety_margin
    }
}

/// Builds the commands for one search, in the order they are written.
///
/// Skill level first, then any extra options, then the position, then `go`.
pub fn search_commands(
    fen: &str,
    params: &SearchParams,
    options: &BTreeMap<String, String>,
) -> Vec<GuiCommand> {
    let mut commands = vec![GuiCommand::set_option(SKILL_LEVEL_OPTION, params.skill)];
    commands.extend(
        options
            .iter()
            .map(|(name, value)| GuiCommand::set_option(name.as_str(), value)),
    );
    commands.push(GuiCommand::position_fen(fen));
    commands.push(GuiCommand::Go(GoOptions::movetime(
        params.movetime.as_millis() as u64,
    )));
    commands
}

/// Asks the engine for its move in `position` and waits for the result line.
///
/// The wait ends the moment the reader hands over a `bestmove` line, and
/// never lasts longer than [`SearchParams::deadline`]. `quit` is not sent
/// here; that is part of terminating the handle.
///
/// # Errors
///
/// - [`EngineError::Protocol`] if a command cannot be written, or reading
///   the engine's output fails before a result arrives
/// - [`EngineError::Timeout`] if no result arrives in time, or the engine's
///   output closes without one
pub async fn request_move<P>(
    handle: &mut EngineHandle,
    position: &P,
    params: &SearchParams,
    options: &BTreeMap<String, String>,
) -> Result<String, EngineError>
where
    P: RulesPosition + ?Sized,
{
    let result = handle.take_result().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            "engine result already consumed by an earlier request",
        )
    })?;

    for command in search_commands(&position.engine_fen(), params, options) {
        handle.send(&command).await?;
    }
    debug!(skill = %params.skill, movetime = ?params.movetime, "search started");

    let deadline = params.deadline();
    match timeout(deadline, result).await {
        Ok(Ok(Ok(line))) => Ok(line),
        Ok(Ok(Err(e))) => {
            debug!(error = %e, "engine output failed before a result");
            Err(EngineError::Protocol(e))
        }
        Ok(Err(_)) => {
            debug!("engine output closed without a result");
            Err(EngineError::Timeout(deadline))
        }
        Err(_) => {
            debug!(?deadline, "engine result timed out");
            Err(EngineError::Timeout(deadline))
        }
    }
}
