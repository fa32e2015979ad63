//! One UCI engine process per session, driven over a line protocol.
//!
//! The worker process streams output asynchronously; a dedicated reader
//! thread forwards every stdout line into a channel, and each query blocks on
//! that channel with a deadline until its matching response line arrives.
//! Queries take `&mut self`, so at most one protocol exchange is in flight
//! per process; independent sessions run in parallel, each owning its own
//! worker.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use coach_core::poll::{poll_until, PollError};
use thiserror::Error;

use crate::tier::SkillTier;

/// Deadline for handshake and readiness responses.
pub const READY_TIMEOUT: Duration = Duration::from_secs(5);
/// Deadline for a depth-bounded best-move search.
pub const BEST_MOVE_TIMEOUT: Duration = Duration::from_secs(30);
/// Deadline for a scored evaluation line to appear.
pub const EVALUATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between readiness checks while draining engine output.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Errors that can occur when working with an engine session.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine executable does not exist at the configured path.
    #[error("engine executable not found at {0}")]
    Unavailable(PathBuf),
    /// The engine process has exited or the session was closed.
    #[error("engine process is not running")]
    NotRunning,
    /// No matching response line arrived before the deadline, or the engine
    /// sent something the protocol does not allow.
    #[error("engine protocol error: {0}")]
    Protocol(String),
    /// No scored analysis line appeared within [`EVALUATION_TIMEOUT`].
    #[error("evaluation timed out waiting for a scored line")]
    EvaluationTimeout,
    /// Process spawn or pipe I/O failed.
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where to find the engine executable.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the UCI engine executable.
    pub path: PathBuf,
}

impl EngineConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolves the engine path from the environment.
    ///
    /// `STOCKFISH_PATH` wins when set; otherwise the executable is expected
    /// at `engine/stockfish` (with an `.exe` suffix on Windows) relative to
    /// the working directory.
    pub fn discover() -> Self {
        if let Ok(path) = std::env::var("STOCKFISH_PATH") {
            return Self::new(path);
        }
        let name = if cfg!(windows) {
            "stockfish.exe"
        } else {
            "stockfish"
        };
        Self::new(Path::new("engine").join(name))
    }
}

/// Outcome of a best-move query.
#[derive(Debug, Clone)]
pub struct MoveResult {
    /// The proposed move in UCI notation; `None` when the engine reports no
    /// legal move (`bestmove (none)` on checkmate/stalemate positions).
    pub best_move: Option<String>,
    /// Raw engine output lines observed during the search.
    pub trace: Vec<String>,
}

/// Outcome of an evaluation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationResult {
    /// Score in centipawns, relative to the side to move.
    pub centipawns: i32,
    /// The search depth the score was reported at.
    pub depth: u32,
}

/// Owns one spawned engine process and its protocol stream.
///
/// Opened with a [`SkillTier`], queried via [`best_move`](Self::best_move)
/// and [`evaluate`](Self::evaluate), and released with
/// [`close`](Self::close). Closing also happens on drop, so scoped ownership
/// guarantees the worker is terminated on every exit path.
pub struct EngineSession {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
    tier: SkillTier,
    closed: bool,
}

impl EngineSession {
    /// Spawns the engine, performs the UCI handshake, and applies the tier's
    /// skill level.
    ///
    /// # Errors
    ///
    /// [`EngineError::Unavailable`] when the executable is missing,
    /// [`EngineError::Io`] when spawning fails, and
    /// [`EngineError::Protocol`] when the handshake does not complete in
    /// time.
    pub fn open(config: &EngineConfig, tier: SkillTier) -> Result<Self, EngineError> {
        if !config.path.exists() {
            return Err(EngineError::Unavailable(config.path.clone()));
        }

        let mut child = Command::new(&config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child.stdin.take().ok_or(EngineError::NotRunning)?;
        let stdout = child.stdout.take().ok_or(EngineError::NotRunning)?;

        // The worker streams lines at its own pace; a dedicated reader thread
        // turns that stream into a channel the queries can wait on with a
        // deadline. The thread exits when the process closes stdout or the
        // session is dropped.
        let (tx, rx) = channel();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                let Ok(line) = line else { break };
                if tx.send(line.trim().to_string()).is_err() {
                    break;
                }
            }
        });

        let mut session = Self {
            child,
            stdin,
            lines: rx,
            tier,
            closed: false,
        };

        session.handshake()?;
        session.send(&format!(
            "setoption name Skill Level value {}",
            tier.skill_level()
        ))?;
        tracing::debug!("Engine session opened at tier {}", tier);
        Ok(session)
    }

    /// The tier this session was opened with.
    pub fn tier(&self) -> SkillTier {
        self.tier
    }

    /// Asks the engine for the best move in `fen` at the tier's search depth.
    ///
    /// Blocks the calling thread until the engine emits a `bestmove` line or
    /// [`BEST_MOVE_TIMEOUT`] elapses. A `(none)` move token maps to `None`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Protocol`] when no `bestmove` line arrives in time,
    /// [`EngineError::NotRunning`] when the process has already exited.
    pub fn best_move(&mut self, fen: &str) -> Result<MoveResult, EngineError> {
        self.ensure_running()?;
        self.begin_query(fen)?;
        self.send(&format!("go depth {}", self.tier.search_depth()))?;

        let mut trace = Vec::new();
        let started = Instant::now();
        loop {
            let line = self.recv_before(started, BEST_MOVE_TIMEOUT, "bestmove")?;
            let parsed = parse_bestmove(&line);
            trace.push(line);
            if let Some(best_move) = parsed {
                tracing::debug!("Engine best move: {:?}", best_move);
                return Ok(MoveResult { best_move, trace });
            }
        }
    }

    /// Evaluates `fen` at the requested depth.
    ///
    /// Consumes scored search-info lines until one at or beyond `depth`
    /// arrives, then stops the search and keeps reading until its terminating
    /// `bestmove`, so no search output from this exchange can bleed into the
    /// next query. When the search terminates early with `bestmove`, the last
    /// scored line wins. The score is in centipawns relative to the side to
    /// move.
    ///
    /// # Errors
    ///
    /// [`EngineError::EvaluationTimeout`] when no scored line appears within
    /// [`EVALUATION_TIMEOUT`], or when the search ends without one (mate
    /// announcements carry no centipawn score); [`EngineError::NotRunning`]
    /// when the process has exited.
    pub fn evaluate(&mut self, fen: &str, depth: u32) -> Result<EvaluationResult, EngineError> {
        self.ensure_running()?;
        self.begin_query(fen)?;
        self.send(&format!("go depth {depth}"))?;

        // The search is only finished once its bestmove has been consumed;
        // returning before that would leave the line for the next exchange.
        let mut satisfying: Option<EvaluationResult> = None;
        let mut last_scored: Option<EvaluationResult> = None;
        let started = Instant::now();
        loop {
            let elapsed = started.elapsed();
            if elapsed >= EVALUATION_TIMEOUT {
                return Err(EngineError::EvaluationTimeout);
            }
            let line = match self.lines.recv_timeout(EVALUATION_TIMEOUT - elapsed) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => return Err(EngineError::EvaluationTimeout),
                Err(RecvTimeoutError::Disconnected) => return Err(EngineError::NotRunning),
            };

            if let Some(scored) = parse_score_line(&line) {
                if scored.depth >= depth && satisfying.is_none() {
                    satisfying = Some(scored);
                    self.send("stop")?;
                } else {
                    last_scored = Some(scored);
                }
            } else if line.starts_with("bestmove") {
                return satisfying
                    .or(last_scored)
                    .ok_or(EngineError::EvaluationTimeout);
            }
        }
    }

    /// Releases the worker process: graceful `quit`, then kill and reap.
    ///
    /// Idempotent. Killing the process also unblocks any pending read, which
    /// is the only cancellation mechanism for an in-flight query.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = writeln!(self.stdin, "quit");
        let _ = self.stdin.flush();
        let _ = self.child.kill();
        let _ = self.child.wait();
        tracing::debug!("Engine session closed");
    }

    /// Resets the engine and loads a position; shared preamble of every query.
    fn begin_query(&mut self, fen: &str) -> Result<(), EngineError> {
        self.drain_stale_lines();
        self.send("ucinewgame")?;
        self.await_ready()?;
        self.send(&format!("position fen {fen}"))?;
        Ok(())
    }

    fn handshake(&mut self) -> Result<(), EngineError> {
        self.send("uci")?;
        let started = Instant::now();
        loop {
            let line = self.recv_before(started, READY_TIMEOUT, "uciok")?;
            if line == "uciok" {
                break;
            }
        }
        self.await_ready()
    }

    /// Sends `isready` and polls the line channel until `readyok` arrives.
    fn await_ready(&mut self) -> Result<(), EngineError> {
        self.send("isready")?;
        let lines = &self.lines;
        poll_until(READY_POLL_INTERVAL, READY_TIMEOUT, || loop {
            match lines.try_recv() {
                Ok(line) if line == "readyok" => return Ok(Some(())),
                Ok(_) => continue,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(EngineError::NotRunning),
            }
        })
        .map_err(|err| match err {
            PollError::Attempt(inner) => inner,
            PollError::DeadlineExceeded => {
                EngineError::Protocol("engine did not report readyok".to_string())
            }
        })
    }

    /// Receives the next line, bounded by `deadline` measured from `started`.
    fn recv_before(
        &mut self,
        started: Instant,
        deadline: Duration,
        expected: &str,
    ) -> Result<String, EngineError> {
        let elapsed = started.elapsed();
        if elapsed >= deadline {
            return Err(EngineError::Protocol(format!(
                "no {expected} line within {}s",
                deadline.as_secs()
            )));
        }
        match self.lines.recv_timeout(deadline - elapsed) {
            Ok(line) => Ok(line),
            Err(RecvTimeoutError::Timeout) => Err(EngineError::Protocol(format!(
                "no {expected} line within {}s",
                deadline.as_secs()
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(EngineError::NotRunning),
        }
    }

    /// Discards responses left over from a previous exchange so the next
    /// query only sees its own output.
    fn drain_stale_lines(&mut self) {
        while self.lines.try_recv().is_ok() {}
    }

    fn send(&mut self, command: &str) -> Result<(), EngineError> {
        let write = writeln!(self.stdin, "{command}").and_then(|()| self.stdin.flush());
        write.map_err(|err| {
            if err.kind() == std::io::ErrorKind::BrokenPipe {
                EngineError::NotRunning
            } else {
                EngineError::Io(err)
            }
        })
    }

    fn ensure_running(&mut self) -> Result<(), EngineError> {
        if self.closed {
            return Err(EngineError::NotRunning);
        }
        match self.child.try_wait() {
            Ok(Some(_)) => Err(EngineError::NotRunning),
            Ok(None) => Ok(()),
            Err(err) => Err(EngineError::Io(err)),
        }
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Parses a `bestmove <move>` line.
///
/// Outer `None` means the line is not a bestmove line at all; `Some(None)`
/// means the engine reported `(none)` (no legal move).
fn parse_bestmove(line: &str) -> Option<Option<String>> {
    let rest = line.strip_prefix("bestmove ")?;
    let token = rest.split_whitespace().next()?;
    if token == "(none)" {
        Some(None)
    } else {
        Some(Some(token.to_string()))
    }
}

/// Extracts `(depth, score cp)` from a UCI search-info line.
///
/// Lines without both a depth and a centipawn score (including mate-score
/// lines) yield `None`.
fn parse_score_line(line: &str) -> Option<EvaluationResult> {
    if !line.starts_with("info") {
        return None;
    }
    let parts: Vec<&str> = line.split_whitespace().collect();

    let mut depth: Option<u32> = None;
    let mut centipawns: Option<i32> = None;
    let mut i = 0;
    while i < parts.len() {
        match parts[i] {
            "depth" => {
                depth = parts.get(i + 1).and_then(|t| t.parse().ok());
                i += 1;
            }
            "score" => {
                if parts.get(i + 1) == Some(&"cp") {
                    centipawns = parts.get(i + 2).and_then(|t| t.parse().ok());
                    i += 2;
                }
            }
            _ => {}
        }
        i += 1;
    }

    Some(EvaluationResult {
        centipawns: centipawns?,
        depth: depth?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bestmove_plain() {
        assert_eq!(
            parse_bestmove("bestmove e2e4"),
            Some(Some("e2e4".to_string()))
        );
    }

    #[test]
    fn test_parse_bestmove_with_ponder() {
        assert_eq!(
            parse_bestmove("bestmove g1f3 ponder b8c6"),
            Some(Some("g1f3".to_string()))
        );
    }

    #[test]
    fn test_parse_bestmove_none_token_is_no_legal_move() {
        assert_eq!(parse_bestmove("bestmove (none)"), Some(None));
    }

    #[test]
    fn test_parse_bestmove_ignores_other_lines() {
        assert_eq!(parse_bestmove("info depth 10 score cp 12"), None);
        assert_eq!(parse_bestmove("readyok"), None);
    }

    #[test]
    fn test_parse_score_line_centipawns() {
        let result = parse_score_line("info depth 15 seldepth 20 score cp 35 nodes 50000 pv e2e4");
        assert_eq!(
            result,
            Some(EvaluationResult {
                centipawns: 35,
                depth: 15
            })
        );
    }

    #[test]
    fn test_parse_score_line_negative() {
        let result = parse_score_line("info depth 10 score cp -150 nodes 25000");
        assert_eq!(
            result,
            Some(EvaluationResult {
                centipawns: -150,
                depth: 10
            })
        );
    }

    #[test]
    fn test_parse_score_line_mate_is_not_scored() {
        assert_eq!(parse_score_line("info depth 12 score mate 3 pv d1h5"), None);
    }

    #[test]
    fn test_parse_score_line_requires_depth() {
        assert_eq!(parse_score_line("info score cp 35"), None);
    }

    #[test]
    fn test_open_missing_executable() {
        let config = EngineConfig::new("/nonexistent/path/to/stockfish");
        match EngineSession::open(&config, SkillTier::Intermediate) {
            Err(EngineError::Unavailable(path)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/path/to/stockfish"));
            }
            other => panic!("expected Unavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_config_discover_default_is_engine_dir() {
        // Only meaningful when the override is not set in the environment.
        if std::env::var("STOCKFISH_PATH").is_err() {
            let config = EngineConfig::discover();
            assert!(config.path.starts_with("engine"));
        }
    }
}
