//! Engine process supervision.
//!
//! An [`EngineHandle`] owns one engine subprocess for the duration of one
//! move request: the child itself, the write half of its stdin, and a reader
//! task that drains stdout from the moment the process starts. The first
//! `bestmove` line the reader sees is handed over through a oneshot channel.
//!
//! # Lifecycle
//!
//! 1. [`EngineHandle::start`] spawns the process and the reader task
//! 2. Commands are written with [`EngineHandle::send`]
//! 3. [`EngineHandle::terminate`] sends `quit`, reaps the process (killing it
//!    after the grace period) and joins the reader task
//!
//! A handle that is dropped without being terminated kills its process and
//! aborts its reader.

use crate::{EngineConfig, EngineError};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, trace, warn};
use uci::GuiCommand;

/// How long to wait for the reader task once the process has exited.
///
/// The task normally ends as soon as stdout closes; it can only outlive the
/// process if something else inherited the pipe.
const READER_JOIN_TIMEOUT: Duration = Duration::from_millis(500);

/// How to bring the engine down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Send `quit` and wait for the grace period before killing.
    Graceful,
    /// Kill right away.
    Kill,
}

/// Outcome of tearing an engine down.
#[derive(Debug, Clone, Copy)]
pub struct Termination {
    /// Exit status of the reaped process.
    pub status: ExitStatus,
    /// True if the process had to be killed.
    pub forced: bool,
}

/// A live engine subprocess owned by a single move request.
pub struct EngineHandle {
    /// The child process handle.
    child: Child,
    /// Command channel into the engine; `None` once closed.
    stdin: Option<ChildStdin>,
    /// Task draining the engine's stdout.
    reader: Option<JoinHandle<()>>,
    /// Receives the first `bestmove` line; taken by the driver.
    result: Option<oneshot::Receiver<EngineResult>>,
    grace_period: Duration,
}

impl EngineHandle {
    /// Spawns the engine described by `config`.
    ///
    /// Must be called from within a tokio runtime, since the stdout reader
    /// is spawned as a task.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProcessSpawn`] if the executable is missing or
    /// cannot be executed.
    pub fn start(config: &EngineConfig) -> Result<Self, EngineError> {
        let spawn_error = |source| EngineError::ProcessSpawn {
            path: config.path.clone(),
            source,
        };

        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        let missing = |pipe: &str| {
            spawn_error(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("engine {} was not captured", pipe),
            ))
        };
        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;

        let (result_tx, result_rx) = oneshot::channel();
        let reader = tokio::spawn(drain_output(BufReader::new(stdout), result_tx));

        debug!(path = %config.path.display(), pid = ?child.id(), "engine started");

        Ok(Self {
            child,
            stdin: Some(stdin),
            reader: Some(reader),
            result: Some(result_rx),
            grace_period: config.grace_period(),
        })
    }

    /// OS process id, while the process is still running.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Writes one command line to the engine.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Protocol`] if the pipe is closed or the write fails.
    pub async fn send(&mut self, command: &GuiCommand) -> Result<(), EngineError> {
        let stdin = self.stdin.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "engine stdin already closed")
        })?;
        write_command(stdin, command).await
    }

    /// Takes the receiving end of the result handoff.
    ///
    /// Returns `None` if it was already taken for this handle.
    pub fn take_result(&mut self) -> Option<oneshot::Receiver<EngineResult>> {
        self.result.take()
    }

    /// Stops the engine, reaps it and joins the reader task.
    ///
    /// With [`Shutdown::Graceful`] the engine gets `quit` and the configured
    /// grace period to exit on its own before it is killed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Protocol`] if waiting for or killing the
    /// process fails.
    pub async fn terminate(mut self, shutdown: Shutdown) -> Result<Termination, EngineError> {
        let mut forced = shutdown == Shutdown::Kill;

        if !forced {
            if let Err(e) = self.send(&GuiCommand::Quit).await {
                debug!(error = %e, "could not send quit, engine may already be gone");
            }
        }
        // Closing stdin gives engines that ignore `quit` an EOF as well.
        drop(self.stdin.take());

        let status = if forced {
            self.kill().await?
        } else {
            match timeout(self.grace_period, self.child.wait()).await {
                Ok(status) => status?,
                Err(_) => {
                    warn!(grace_period = ?self.grace_period, "engine ignored quit, killing it");
                    forced = true;
                    self.kill().await?
                }
            }
        };

        self.join_reader().await;
        debug!(%status, forced, "engine terminated");
        Ok(Termination { status, forced })
    }

    async fn kill(&mut self) -> Result<ExitStatus, EngineError> {
        if let Some(status) = self.child.try_wait()? {
            return Ok(status);
        }
        self.child.kill().await?;
        Ok(self.child.wait().await?)
    }

    async fn join_reader(&mut self) {
        let Some(mut reader) = self.reader.take() else {
            return;
        };
        match timeout(READER_JOIN_TIMEOUT, &mut reader).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "engine output reader failed"),
            Err(_) => {
                warn!("engine output still open after exit, aborting reader");
                reader.abort();
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        // The child itself is covered by kill_on_drop.
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Writes a command followed by a newline and flushes it.
pub(crate) async fn write_command<W>(writer: &mut W, command: &GuiCommand) -> Result<(), EngineError>
where
    W: AsyncWrite + Unpin,
{
    let line = command.to_uci();
    trace!("> {}", line);
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// What the reader hands over: the first `bestmove` line, or the error that
/// ended reading before one arrived.
pub type EngineResult = std::io::Result<String>;

/// Reads engine output until EOF, forwarding the first `bestmove` line.
///
/// Lines are split on raw bytes and decoded lossily, so output that is not
/// valid UTF-8 is skipped like any other diagnostic line. A read error before
/// the result is forwarded in its place. Dropping `result` unsent tells the
/// receiver that the output closed without a result.
pub(crate) async fn drain_output<R>(mut reader: R, result: oneshot::Sender<EngineResult>)
where
    R: AsyncBufRead + Unpin,
{
    let mut result = Some(result);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let decoded = String::from_utf8_lossy(&buf);
                let line = decoded.trim_end_matches(['\r', '\n']);
                trace!("< {}", line);
                if uci::is_best_move_line(line) {
                    if let Some(tx) = result.take() {
                        debug!(line = %line, "engine result received");
                        // The receiver may have given up already; the line is then moot.
                        let _ = tx.send(Ok(line.to_string()));
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to read engine output");
                if let Some(tx) = result.take() {
                    let _ = tx.send(Err(e));
                }
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

    #[tokio::test]
    async fn drain_forwards_first_result_only() {
        let (mut engine_side, our_side) = tokio::io::duplex(1024);
        let (tx, rx) = oneshot::channel();
        let reader = tokio::spawn(drain_output(BufReader::new(our_side), tx));

        engine_side
            .write_all(b"info depth 1 score cp 20\nbestmove e2e4 ponder e7e5\nbestmove d2d4\n")
            .await
            .unwrap();
        drop(engine_side);

        assert_eq!(rx.await.unwrap().unwrap(), "bestmove e2e4 ponder e7e5");
        reader.await.unwrap();
    }

    #[tokio::test]
    async fn drain_skips_lines_that_are_not_utf8() {
        let (mut engine_side, our_side) = tokio::io::duplex(1024);
        let (tx, rx) = oneshot::channel();
        let reader = tokio::spawn(drain_output(BufReader::new(our_side), tx));

        engine_side
            .write_all(b"info string Caf\xe9 NNUE\r\n\xff\xfe\nbestmove e2e4\r\n")
            .await
            .unwrap();
        drop(engine_side);

        assert_eq!(rx.await.unwrap().unwrap(), "bestmove e2e4");
        reader.await.unwrap();
    }

    /// Output that fails on every read.
    struct BrokenOutput;

    impl AsyncRead for BrokenOutput {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "engine pipe reset",
            )))
        }
    }

    #[tokio::test]
    async fn drain_forwards_read_error_before_result() {
        let output = (&b"info depth 1\n"[..]).chain(BrokenOutput);
        let (tx, rx) = oneshot::channel();

        drain_output(BufReader::new(output), tx).await;

        let err = rx.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset);
    }

    #[tokio::test]
    async fn drain_drops_sender_when_output_closes_without_result() {
        let (mut engine_side, our_side) = tokio::io::duplex(1024);
        let (tx, rx) = oneshot::channel();
        let reader = tokio::spawn(drain_output(BufReader::new(our_side), tx));

        engine_side.write_all(b"info string thinking\n").await.unwrap();
        drop(engine_side);

        assert!(rx.await.is_err());
        reader.await.unwrap();
    }

    #[tokio::test]
    async fn write_command_appends_newline() {
        let (mut ours, mut engine_side) = tokio::io::duplex(1024);
        write_command(&mut ours, &GuiCommand::set_option("Skill Level", 5))
            .await
            .unwrap();
        write_command(&mut ours, &GuiCommand::Quit).await.unwrap();
        drop(ours);

        let mut received = String::new();
        engine_side.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "setoption name Skill Level value 5\nquit\n");
    }

    #[tokio::test]
    async fn write_command_to_closed_pipe_is_protocol_error() {
        let (mut ours, engine_side) = tokio::io::duplex(1024);
        drop(engine_side);

        let result = write_command(&mut ours, &GuiCommand::Quit).await;
        assert!(matches!(result, Err(EngineError::Protocol(_))));
    }

    #[tokio::test]
    async fn start_nonexistent_executable_is_spawn_error() {
        let config = EngineConfig::new("/nonexistent/path/to/engine");
        match EngineHandle::start(&config) {
            Err(EngineError::ProcessSpawn { path, .. }) => {
                assert_eq!(path, config.path);
            }
            Err(other) => panic!("Expected ProcessSpawn, got {:?}", other),
            Ok(_) => panic!("Expected ProcessSpawn, got a running engine"),
        }
    }
}
