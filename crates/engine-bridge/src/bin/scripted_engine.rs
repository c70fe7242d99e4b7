//! Scripted UCI engine - answers `go` with a fixed move.
//!
//! Stands in for a real engine in tests. Flags choose how long it "thinks",
//! what it answers, and how it misbehaves.

use clap::{Parser, ValueEnum};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use uci::{stdio_engine, GuiCommand};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Answer every search.
    Respond,
    /// Never answer a search, but exit on `quit`.
    Silent,
    /// Exit as soon as a search is requested, without answering.
    Exit,
    /// Answer searches but ignore `quit` and end of input.
    Stubborn,
    /// Exit at once, before reading any command.
    Vanish,
}

#[derive(Parser)]
#[command(name = "scripted-engine")]
#[command(about = "UCI engine with scripted answers, for tests")]
struct Args {
    /// Move text to answer with
    #[arg(long, default_value = "e2e4")]
    bestmove: String,

    /// Delay before answering a search, in milliseconds
    #[arg(long, default_value = "100")]
    delay_ms: u64,

    /// How the engine behaves
    #[arg(long, value_enum, default_value_t = Mode::Respond)]
    mode: Mode,

    /// Number of `info` lines to print before answering
    #[arg(long, default_value = "0")]
    info_lines: u32,

    /// Print an `info` line that is not valid UTF-8 before answering
    #[arg(long)]
    latin1_info: bool,

    /// File to append every received command to
    #[arg(long)]
    transcript: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.mode == Mode::Vanish {
        return Ok(());
    }
    let mut engine = stdio_engine();
    let mut transcript = match &args.transcript {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };

    loop {
        let cmd = match engine.read_command() {
            Ok(Some(cmd)) => cmd,
            Ok(None) if args.mode == Mode::Stubborn => hang(),
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error reading command: {}", e);
                continue;
            }
        };

        if let Some(file) = transcript.as_mut() {
            record(file, &cmd)?;
        }

        match cmd {
            GuiCommand::Uci => {
                engine.send_id("ScriptedEngine", "engine-bridge tests")?;
                engine.send_uciok()?;
            }

            GuiCommand::IsReady => {
                engine.send_readyok()?;
            }

            GuiCommand::Go(_) => match args.mode {
                Mode::Respond | Mode::Stubborn => {
                    for depth in 1..=args.info_lines {
                        engine.send_info(&format!("depth {} score cp 0 pv {}", depth, args.bestmove))?;
                    }
                    if args.latin1_info {
                        // "Café" in Latin-1.
                        let mut out = std::io::stdout().lock();
                        out.write_all(b"info string Caf\xe9 NNUE\n")?;
                        out.flush()?;
                    }
                    thread::sleep(Duration::from_millis(args.delay_ms));
                    engine.send_bestmove(&args.bestmove)?;
                }
                Mode::Silent => {}
                Mode::Exit | Mode::Vanish => break,
            },

            GuiCommand::Quit if args.mode == Mode::Stubborn => {}

            GuiCommand::Quit => break,

            GuiCommand::SetOption { .. }
            | GuiCommand::Position { .. }
            | GuiCommand::Stop
            | GuiCommand::Unknown(_) => {}
        }
    }

    Ok(())
}

fn record(file: &mut File, cmd: &GuiCommand) -> std::io::Result<()> {
    writeln!(file, "{}", cmd.to_uci())?;
    file.flush()
}

/// Blocks until killed.
fn hang() -> ! {
    loop {
        thread::sleep(Duration::from_secs(3600));
    }
}
