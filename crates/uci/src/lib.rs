//! UCI (Universal Chess Interface) protocol vocabulary.
//!
//! This crate provides the line formats exchanged between a controller and an
//! engine. A controller writes [`GuiCommand`]s and watches for the
//! [`BESTMOVE`] marker; an engine reads commands and answers with
//! [`EngineMessage`]s through [`UciEngine`].
//!
//! # Commands used by the engine bridge
//!
//! - `setoption name <name> value <value>` - Configure the engine
//! - `position fen <fen> [moves <move>...]` - Set position
//! - `go movetime <ms>` - Start a timed search
//! - `quit` - Exit engine
//!
//! The engine's answer to `go` is `bestmove <move> [ponder <move>]`.

mod command;

pub use command::{GoOptions, GuiCommand};

use std::io::{BufRead, Write};
use thiserror::Error;

/// First token of the line an engine emits when its search is finished.
pub const BESTMOVE: &str = "bestmove";

#[derive(Error, Debug)]
pub enum UciError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Engine identification.
    Id { name: Option<String>, author: Option<String> },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Free-form search information; everything after `info `.
    Info(String),
    /// Best move found.
    BestMove { mv: String, ponder: Option<String> },
}

impl EngineMessage {
    /// Format message for output.
    pub fn to_uci(&self) -> String {
        match self {
            EngineMessage::Id { name, author } => {
                let mut parts = Vec::new();
                if let Some(n) = name {
                    parts.push(format!("id name {}", n));
                }
                if let Some(a) = author {
                    parts.push(format!("id author {}", a));
                }
                parts.join("\n")
            }
            EngineMessage::UciOk => "uciok".to_string(),
            EngineMessage::ReadyOk => "readyok".to_string(),
            EngineMessage::Info(text) => format!("info {}", text),
            EngineMessage::BestMove { mv, ponder } => match ponder {
                Some(p) => format!("{} {} ponder {}", BESTMOVE, mv, p),
                None => format!("{} {}", BESTMOVE, mv),
            },
        }
    }
}

/// Returns true if an engine output line carries the search result.
pub fn is_best_move_line(line: &str) -> bool {
    line.starts_with(BESTMOVE)
}

/// Simple UCI engine wrapper for writing bots.
pub struct UciEngine<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> UciEngine<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read and parse the next command from GUI.
    ///
    /// Returns `Ok(None)` once the GUI has closed its end of the pipe.
    pub fn read_command(&mut self) -> Result<Option<GuiCommand>, UciError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        GuiCommand::parse(&line).map(Some)
    }

    /// Send a message to the GUI.
    pub fn send(&mut self, msg: &EngineMessage) -> Result<(), UciError> {
        writeln!(self.writer, "{}", msg.to_uci())?;
        self.writer.flush()?;
        Ok(())
    }

    /// Send engine identification.
    pub fn send_id(&mut self, name: &str, author: &str) -> Result<(), UciError> {
        self.send(&EngineMessage::Id {
            name: Some(name.to_string()),
            author: Some(author.to_string()),
        })
    }

    /// Send uciok.
    pub fn send_uciok(&mut self) -> Result<(), UciError> {
        self.send(&EngineMessage::UciOk)
    }

    /// Send readyok.
    pub fn send_readyok(&mut self) -> Result<(), UciError> {
        self.send(&EngineMessage::ReadyOk)
    }

    /// Send best move.
    pub fn send_bestmove(&mut self, mv: &str) -> Result<(), UciError> {
        self.send(&EngineMessage::BestMove {
            mv: mv.to_string(),
            ponder: None,
        })
    }

    /// Send search info.
    pub fn send_info(&mut self, text: &str) -> Result<(), UciError> {
        self.send(&EngineMessage::Info(text.to_string()))
    }
}

/// Create a UCI engine using stdin/stdout.
pub fn stdio_engine() -> UciEngine<std::io::BufReader<std::io::Stdin>, std::io::Stdout> {
    UciEngine::new(
        std::io::BufReader::new(std::io::stdin()),
        std::io::stdout(),
    )
}
