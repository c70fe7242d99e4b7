//! engine-move - ask a UCI engine for moves from the command line.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use engine_bridge::{EngineClient, EngineConfig, LegalMove, RulesPosition, SkillLevel};
use serde::Serialize;
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "engine-move")]
#[command(about = "Ask a UCI chess engine for a legal move")]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Engine executable; overrides the path from the config file
    #[arg(short, long)]
    engine: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the engine's move for one position
    Best {
        /// Position in FEN notation; the starting position if omitted
        #[arg(long)]
        fen: Option<String>,
        /// Skill level 0-20; the configured level if omitted
        #[arg(short, long)]
        skill: Option<i64>,
        /// Search time in milliseconds; the configured time if omitted
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        movetime: Option<u64>,
        /// Print a JSON report instead of the bare move
        #[arg(long)]
        json: bool,
    },
    /// Let the engine play against itself from the starting position
    Play {
        /// Maximum number of half-moves
        #[arg(short, long, default_value = "20")]
        plies: u32,
        /// Skill level 0-20; the configured level if omitted
        #[arg(short, long)]
        skill: Option<i64>,
    },
}

/// JSON output of the `best` command.
#[derive(Debug, Serialize)]
struct MoveReport {
    uci: String,
    from: String,
    to: String,
    promotion: Option<char>,
    fen_after: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let config = load_config(cli.config, cli.engine)?;
    tracing::info!("Engine: {}", config.path.display());
    let client = EngineClient::new(config)?;

    match cli.command {
        Commands::Best {
            fen,
            skill,
            movetime,
            json,
        } => {
            let position = match fen {
                Some(fen) => parse_position(&fen)?,
                None => Chess::default(),
            };
            let skill = skill_or_default(skill, &client)?;
            let movetime = movetime
                .map(Duration::from_millis)
                .unwrap_or_else(|| client.config().movetime());

            let mv = client.best_move_within(&position, skill, movetime).await?;

            if json {
                let mut after = position.clone();
                after.play_unchecked(&mv);
                let report = MoveReport {
                    uci: mv.uci_text(),
                    from: mv.origin_square(),
                    to: mv.destination_square(),
                    promotion: mv.promotion_piece(),
                    fen_after: after.engine_fen(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", mv.uci_text());
            }
        }

        Commands::Play { plies, skill } => {
            let skill = skill_or_default(skill, &client)?;
            let mut position = Chess::default();

            for ply in 1..=plies {
                if position.is_game_over() {
                    println!("Game over after {} plies", ply - 1);
                    break;
                }
                // A failed request ends the game; no move is guessed in its place.
                let mv = client
                    .best_move(&position, skill)
                    .await
                    .with_context(|| format!("engine failed at ply {}", ply))?;
                println!("{:>3}. {}", ply, mv.uci_text());
                position.play_unchecked(&mv);
            }
            println!("{}", position.engine_fen());
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>, engine: Option<PathBuf>) -> anyhow::Result<EngineConfig> {
    let mut config = match (path, &engine) {
        (Some(path), _) => EngineConfig::load(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        (None, Some(engine)) => EngineConfig::new(engine.clone()),
        (None, None) => bail!("no engine configured; pass --engine or --config"),
    };
    if let Some(engine) = engine {
        config.path = engine;
    }
    Ok(config)
}

fn parse_position(fen: &str) -> anyhow::Result<Chess> {
    let setup: Fen = fen.parse().context("invalid FEN")?;
    setup
        .into_position(CastlingMode::Standard)
        .map_err(|e| anyhow!("illegal position: {}", e))
}

fn skill_or_default(level: Option<i64>, client: &EngineClient) -> anyhow::Result<SkillLevel> {
    Ok(match level {
        Some(level) => SkillLevel::try_from(level)?,
        None => client.config().skill(),
    })
}
