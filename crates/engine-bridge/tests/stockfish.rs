//! Tests against a real engine.
//!
//! These tests require Stockfish to be installed and available in PATH.
//! Run with: `cargo test -p engine-bridge --test stockfish -- --ignored`

use engine_bridge::{EngineClient, EngineConfig, LegalMove, SkillLevel};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position};

/// Check if Stockfish is available in PATH.
fn stockfish_available() -> bool {
    std::process::Command::new("stockfish")
        .arg("quit")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok()
}

#[tokio::test]
#[ignore = "requires Stockfish"]
async fn test_stockfish_opening_move() {
    if !stockfish_available() {
        eprintln!("Skipping test: Stockfish not available");
        return;
    }

    let client = EngineClient::new(EngineConfig::new("stockfish")).unwrap();
    let position = Chess::default();

    let mv = client
        .best_move(&position, SkillLevel::new(5).unwrap())
        .await
        .expect("Stockfish should answer");

    assert!(
        position.legal_moves().contains(&mv),
        "{} is not legal in the starting position",
        mv.uci_text()
    );
}

#[tokio::test]
#[ignore = "requires Stockfish"]
async fn test_stockfish_finds_mate_in_one() {
    if !stockfish_available() {
        eprintln!("Skipping test: Stockfish not available");
        return;
    }

    // Back-rank mate with Qd8.
    let position: Chess = "6k1/5ppp/8/8/8/8/5PPP/3Q2K1 w - - 0 1"
        .parse::<Fen>()
        .unwrap()
        .into_position(CastlingMode::Standard)
        .unwrap();
    let client = EngineClient::new(EngineConfig::new("stockfish")).unwrap();

    let mv = client
        .best_move(&position, SkillLevel::MAX)
        .await
        .expect("Stockfish should answer");

    let mut after = position.clone();
    after.play_unchecked(&mv);
    assert!(after.is_checkmate(), "{} does not mate", mv.uci_text());
}

#[tokio::test]
#[ignore = "requires Stockfish"]
async fn test_stockfish_every_skill_level() {
    if !stockfish_available() {
        eprintln!("Skipping test: Stockfish not available");
        return;
    }

    let mut config = EngineConfig::new("stockfish");
    config.movetime_ms = 100;
    let client = EngineClient::new(config).unwrap();

    for level in 0..=20 {
        let result = client.best_move_at_level(&Chess::default(), level).await;
        assert!(result.is_ok(), "level {} failed: {:?}", level, result.err());
    }
}
