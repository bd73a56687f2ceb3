//! UCI engine process used for computer replies.
//!
//! Architecture:
//! - Engine I/O runs on OS threads (reader/writer)
//! - Requests are synchronous: drain to `readyok`, send `position` +
//!   `go movetime`, then wait on the event channel for `bestmove`, bounded by
//!   the search time plus a grace period. A missed deadline sends `stop` and
//!   swallows the late `bestmove`
//! - Callers keep the blocking wait off the UI thread (see `SearchRequest`)

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use crate::domain::engine::EngineError;
use crate::domain::uci::{UciCommand, UciOutputKind};

/// Extra time allowed on top of the requested search time
const REPLY_GRACE: Duration = Duration::from_secs(5);

/// Time allowed for the `uci`/`isready` handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Messages sent from the engine reader thread
#[derive(Debug)]
pub enum EngineEvent {
    /// A line of output from the engine
    Output(String),
    /// Engine process exited
    Exited,
    /// Error occurred
    Error(String),
}

/// A running UCI engine
pub struct UciEngine {
    /// Program name, for logging
    label: String,
    /// Extra time allowed on top of the requested search time
    reply_grace: Duration,
    /// Channel receiver for engine events
    event_receiver: Receiver<EngineEvent>,
    /// Channel sender for commands to engine writer thread
    command_sender: Sender<String>,
    /// Handle to the engine process
    process: Child,
}

impl UciEngine {
    /// Spawn the engine binary at `path` and complete the UCI handshake
    pub fn start(path: &Path) -> Result<Self, EngineError> {
        Self::launch(Command::new(path), path.display().to_string())
    }

    fn launch(mut command: Command, label: String) -> Result<Self, EngineError> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: label.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(EngineError::Disconnected)?;
        let stdout = child.stdout.take().ok_or(EngineError::Disconnected)?;

        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
        let (cmd_tx, cmd_rx) = mpsc::channel::<String>();

        // Spawn reader thread (OS thread for blocking I/O)
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(text) => {
                        if event_tx.send(EngineEvent::Output(text)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = event_tx.send(EngineEvent::Error(e.to_string()));
                        break;
                    }
                }
            }
            let _ = event_tx.send(EngineEvent::Exited);
        });

        // Spawn writer thread (OS thread for blocking I/O)
        thread::spawn(move || {
            let mut writer = stdin;
            while let Ok(cmd) = cmd_rx.recv() {
                if writeln!(writer, "{}", cmd).is_err() {
                    break;
                }
                if writer.flush().is_err() {
                    break;
                }
            }
        });

        let engine = Self {
            label,
            reply_grace: REPLY_GRACE,
            event_receiver: event_rx,
            command_sender: cmd_tx,
            process: child,
        };

        engine.send_command(UciCommand::Uci)?;
        engine.wait_for(HANDSHAKE_TIMEOUT, |kind| matches!(kind, UciOutputKind::UciOk))?;
        engine.ready()?;
        info!("engine started: {}", engine.label);
        Ok(engine)
    }

    /// Reset the engine for a new game
    pub fn new_game(&self, use_opening_book: bool) -> Result<(), EngineError> {
        self.send_command(UciCommand::SetOption {
            name: "OwnBook".to_string(),
            value: use_opening_book.to_string(),
        })?;
        self.send_command(UciCommand::UciNewGame)?;
        self.ready()
    }

    /// Search `fen` for `movetime` and return the best move in UCI notation,
    /// or `None` when the engine reports no legal move.
    ///
    /// Output left over from an earlier search is drained first, so a late
    /// `bestmove` is never taken as the answer for this position.
    pub fn best_move(&self, fen: &str, movetime: Duration) -> Result<Option<String>, EngineError> {
        self.ready()?;
        self.send_command(UciCommand::Position {
            fen: Some(fen.to_string()),
            moves: vec![],
        })?;
        self.send_command(UciCommand::GoMoveTime(movetime.as_millis() as u64))?;

        let reply = self.wait_for(movetime + self.reply_grace, |kind| {
            matches!(kind, UciOutputKind::BestMove(_))
        });
        match reply {
            Ok(UciOutputKind::BestMove(mv)) => {
                debug!("bestmove {:?}", mv);
                Ok(mv)
            }
            Ok(other) => Err(EngineError::Protocol(format!("{:?}", other))),
            Err(EngineError::Timeout(waited)) => {
                warn!("engine {} missed its deadline, stopping search", self.label);
                self.send_command(UciCommand::Stop)?;
                if let Err(e) = self.wait_for(self.reply_grace, |kind| {
                    matches!(kind, UciOutputKind::BestMove(_))
                }) {
                    debug!("no bestmove after stop: {}", e);
                }
                Err(EngineError::Timeout(waited))
            }
            Err(e) => Err(e),
        }
    }

    fn ready(&self) -> Result<(), EngineError> {
        self.send_command(UciCommand::IsReady)?;
        self.wait_for(HANDSHAKE_TIMEOUT, |kind| matches!(kind, UciOutputKind::ReadyOk))?;
        Ok(())
    }

    /// Send a UCI command to the engine
    fn send_command(&self, cmd: UciCommand) -> Result<(), EngineError> {
        let cmd_str = cmd.to_uci_string();
        trace!("> {}", cmd_str);
        self.command_sender
            .send(cmd_str)
            .map_err(|_| EngineError::Disconnected)
    }

    /// Drain engine output until a line matches `wanted` or `timeout` passes
    fn wait_for(
        &self,
        timeout: Duration,
        wanted: impl Fn(&UciOutputKind) -> bool,
    ) -> Result<UciOutputKind, EngineError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.event_receiver.recv_timeout(remaining) {
                Ok(EngineEvent::Output(line)) => {
                    trace!("< {}", line);
                    let kind = UciOutputKind::parse(&line);
                    if wanted(&kind) {
                        return Ok(kind);
                    }
                }
                Ok(EngineEvent::Error(e)) => {
                    warn!("engine read error: {}", e);
                    return Err(EngineError::Disconnected);
                }
                Ok(EngineEvent::Exited) | Err(RecvTimeoutError::Disconnected) => {
                    return Err(EngineError::Disconnected);
                }
                Err(RecvTimeoutError::Timeout) => return Err(EngineError::Timeout(timeout)),
            }
        }
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = self.send_command(UciCommand::Quit);
        if let Err(e) = self.process.kill() {
            debug!("engine {} already gone: {}", self.label, e);
        }
        let _ = self.process.wait();
    }
}

/// Scripted engines run through `sh`, for tests here and in `local_engine`
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Answers the handshake, records `setoption`/`ucinewgame` by echoing
    /// them as info lines, and replies to `go` with `$BEST`.
    pub(crate) const ECHO_ENGINE: &str = r#"
        while read -r line; do
            case "$line" in
                uci) echo "id name Scripted"; echo "uciok" ;;
                isready) echo "readyok" ;;
                setoption*|ucinewgame) echo "info string got $line" ;;
                go*) echo "info depth 1"; echo "bestmove $BEST" ;;
                quit) exit 0 ;;
            esac
        done
    "#;

    pub(crate) fn scripted(script: &str, best: &str) -> UciEngine {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script).env("BEST", best);
        let mut engine =
            UciEngine::launch(command, "scripted".to_string()).expect("scripted engine starts");
        engine.reply_grace = Duration::from_millis(300);
        engine
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ECHO_ENGINE, scripted};
    use super::*;

    /// The first search answers only after a pause, later ones at once.
    const SLOW_FIRST_ENGINE: &str = r#"
        searches=0
        while read -r line; do
            case "$line" in
                uci) echo "uciok" ;;
                isready) echo "readyok" ;;
                go*)
                    searches=$((searches + 1))
                    if [ "$searches" -eq 1 ]; then
                        sleep 1
                        echo "bestmove e7e5"
                    else
                        echo "bestmove d7d5"
                    fi
                    ;;
                quit) exit 0 ;;
            esac
        done
    "#;

    /// Handshakes, then never answers a search.
    const SILENT_ENGINE: &str = r#"
        while read -r line; do
            case "$line" in
                uci) echo "uciok" ;;
                isready) echo "readyok" ;;
                quit) exit 0 ;;
            esac
        done
    "#;

    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

    #[test]
    fn test_missing_binary_reports_spawn_error() {
        let result = UciEngine::start(Path::new("/nonexistent/engine-binary"));
        match result {
            Err(EngineError::Spawn { path, .. }) => assert!(path.contains("engine-binary")),
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("engine should not start"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_handshake_and_new_game() {
        let engine = scripted(ECHO_ENGINE, "e7e5");
        assert!(engine.new_game(false).is_ok());
        assert!(engine.new_game(true).is_ok());
    }

    #[test]
    #[cfg(unix)]
    fn test_best_move_round_trip() {
        let engine = scripted(ECHO_ENGINE, "e7e5");
        let best = engine.best_move(AFTER_E4, Duration::from_millis(10));
        assert_eq!(best.expect("bestmove"), Some("e7e5".to_string()));
        // a second search on the same process still lines up
        let best = engine.best_move(AFTER_E4, Duration::from_millis(10));
        assert_eq!(best.expect("bestmove"), Some("e7e5".to_string()));
    }

    #[test]
    #[cfg(unix)]
    fn test_no_legal_move_is_none() {
        let engine = scripted(ECHO_ENGINE, "(none)");
        let best = engine.best_move(AFTER_E4, Duration::from_millis(10));
        assert_eq!(best.expect("bestmove"), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_silent_engine_times_out() {
        let engine = scripted(SILENT_ENGINE, "");
        let result = engine.best_move(AFTER_E4, Duration::from_millis(10));
        assert!(matches!(result, Err(EngineError::Timeout(_))));
    }

    #[test]
    #[cfg(unix)]
    fn test_late_bestmove_not_taken_for_next_search() {
        let engine = scripted(SLOW_FIRST_ENGINE, "");
        let first = engine.best_move(AFTER_E4, Duration::from_millis(10));
        assert!(matches!(first, Err(EngineError::Timeout(_))));

        let second = engine.best_move(AFTER_E4, Duration::from_millis(10));
        assert_eq!(second.expect("bestmove"), Some("d7d5".to_string()));
    }
}
