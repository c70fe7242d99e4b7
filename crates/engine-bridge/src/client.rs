//! One engine move per request, each on a fresh subprocess.

use crate::config::ConfigError;
use crate::driver::{self, SearchParams};
use crate::position::{LegalMove, RulesPosition};
use crate::process::{EngineHandle, Shutdown};
use crate::{resolver, EngineConfig, EngineError, SkillLevel};
use std::time::Duration;
use tracing::{debug, warn};

/// Asks an external UCI engine for moves.
///
/// Each call to [`best_move`](Self::best_move) launches the configured
/// engine, runs one timed search, and tears the process down again before
/// returning, whatever the outcome.
///
/// # Example
///
/// ```no_run
/// use engine_bridge::{EngineClient, EngineConfig, LegalMove, SkillLevel};
/// use shakmaty::Chess;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = EngineClient::new(EngineConfig::new("/usr/bin/stockfish"))?;
/// let mv = client.best_move(&Chess::default(), SkillLevel::new(5)?).await?;
/// println!("engine plays {}", mv.uci_text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EngineClient {
    config: EngineConfig,
}

impl EngineClient {
    /// Creates a client after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine's move for `position` at the given raw skill level.
    ///
    /// The level is checked before anything is spawned.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSkillLevel`] for levels outside `0..=20`,
    /// otherwise as [`best_move`](Self::best_move).
    pub async fn best_move_at_level<P>(&self, position: &P, level: i64) -> Result<P::Move, EngineError>
    where
        P: RulesPosition + ?Sized,
    {
        let skill = SkillLevel::try_from(level)?;
        self.best_move(position, skill).await
    }

    /// Returns the engine's move for `position`, searched for the configured time.
    pub async fn best_move<P>(&self, position: &P, skill: SkillLevel) -> Result<P::Move, EngineError>
    where
        P: RulesPosition + ?Sized,
    {
        self.best_move_within(position, skill, self.config.movetime())
            .await
    }

    /// Returns the engine's move for `position`, searched for `movetime`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ProcessSpawn`] if the engine cannot be started
    /// - [`EngineError::Protocol`] if talking to the engine fails
    /// - [`EngineError::Timeout`] if no answer arrives within `movetime`
    ///   plus the configured safety margin
    /// - [`EngineError::Parse`] if the answer is malformed
    /// - [`EngineError::NoMatch`] if the answer is not a legal move
    pub async fn best_move_within<P>(
        &self,
        position: &P,
        skill: SkillLevel,
        movetime: Duration,
    ) -> Result<P::Move, EngineError>
    where
        P: RulesPosition + ?Sized,
    {
        let params = SearchParams {
            skill,
            movetime,
            safety_margin: self.config.safety_margin(),
        };

        let mut handle = EngineHandle::start(&self.config)?;
        let outcome =
            driver::request_move(&mut handle, position, &params, &self.config.options).await;

        let shutdown = if matches!(outcome, Err(EngineError::Timeout(_))) {
            Shutdown::Kill
        } else {
            Shutdown::Graceful
        };
        let termination = handle.terminate(shutdown).await;

        let line = match (outcome, termination) {
            (Ok(line), termination) => {
                termination?;
                line
            }
            (Err(e), Err(teardown)) => {
                warn!(error = %teardown, "engine teardown failed after {}", e);
                return Err(e);
            }
            (Err(e), Ok(_)) => return Err(e),
        };

        let mv = resolver::resolve(position.candidate_moves(), &line)?;
        debug!(mv = %mv.uci_text(), "engine move resolved");
        Ok(mv)
    }
}
