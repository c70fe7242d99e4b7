//! Engine bridge - legal moves from an external UCI engine.
//!
//! This crate launches a UCI chess engine as a subprocess, asks it for a move
//! in a given position, and validates the answer against the position's
//! legal moves.
//!
//! # Modules
//!
//! - [`process`] - Engine subprocess lifetime, pipes and output reader
//! - [`driver`] - Command sequence and the bounded wait for `bestmove`
//! - [`resolver`] - Move text parsing and legal-move lookup
//! - [`position`] - Traits the rules library implements (done for [`shakmaty::Chess`])
//! - [`config`] - TOML configuration
//!
//! Most callers only need [`EngineClient`].

pub mod client;
pub mod config;
pub mod driver;
mod error;
pub mod position;
pub mod process;
pub mod resolver;
mod skill;

pub use client::EngineClient;
pub use config::{ConfigError, EngineConfig};
pub use driver::SearchParams;
pub use error::EngineError;
pub use position::{LegalMove, RulesPosition};
pub use process::{EngineHandle, EngineResult, Shutdown, Termination};
pub use resolver::{parse_move_text, resolve, MoveText};
pub use skill::SkillLevel;
