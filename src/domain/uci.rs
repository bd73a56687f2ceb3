//! UCI (Universal Chess Interface) protocol types for computer replies.
//!
//! Only the subset needed to ask an engine for a single move is modelled:
//! handshake, options, position, a time-limited search and its `bestmove`.
//! Process handling lives in the models layer.

/// UCI commands sent to the reply engine
#[derive(Debug, Clone, PartialEq)]
pub enum UciCommand {
    /// Initialize UCI mode
    Uci,
    /// Check if engine is ready
    IsReady,
    /// Forget state from a previous game
    UciNewGame,
    SetOption { name: String, value: String },
    /// Set position (startpos or FEN, with optional moves)
    Position { fen: Option<String>, moves: Vec<String> },
    /// Search for a fixed number of milliseconds
    GoMoveTime(u64),
    /// Stop the current search; the engine still answers with `bestmove`
    Stop,
    Quit,
}

impl UciCommand {
    /// Convert command to UCI protocol string
    pub fn to_uci_string(&self) -> String {
        match self {
            UciCommand::Uci => "uci".to_string(),
            UciCommand::IsReady => "isready".to_string(),
            UciCommand::UciNewGame => "ucinewgame".to_string(),
            UciCommand::SetOption { name, value } => {
                format!("setoption name {} value {}", name, value)
            }
            UciCommand::Position { fen, moves } => {
                let mut cmd = String::from("position ");
                match fen {
                    Some(f) => {
                        cmd.push_str("fen ");
                        cmd.push_str(f);
                    }
                    None => cmd.push_str("startpos"),
                }
                if !moves.is_empty() {
                    cmd.push_str(" moves ");
                    cmd.push_str(&moves.join(" "));
                }
                cmd
            }
            UciCommand::GoMoveTime(ms) => format!("go movetime {}", ms),
            UciCommand::Stop => "stop".to_string(),
            UciCommand::Quit => "quit".to_string(),
        }
    }
}

/// Categorized engine output line
#[derive(Debug, Clone, PartialEq)]
pub enum UciOutputKind {
    /// "uciok" - engine is ready for UCI
    UciOk,
    /// "readyok" - engine is ready
    ReadyOk,
    /// "bestmove <move> [ponder <move>]"; `None` when the engine has no move
    BestMove(Option<String>),
    /// Anything else (id, option, info, ...)
    Other(String),
}

impl UciOutputKind {
    /// Parse a raw UCI output line into a categorized type
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if line == "uciok" {
            UciOutputKind::UciOk
        } else if line == "readyok" {
            UciOutputKind::ReadyOk
        } else if let Some(rest) = line.strip_prefix("bestmove") {
            // "(none)" and "0000" both mean no legal move
            let mv = rest
                .split_whitespace()
                .next()
                .filter(|m| *m != "(none)" && *m != "0000")
                .map(str::to_string);
            UciOutputKind::BestMove(mv)
        } else {
            UciOutputKind::Other(line.to_string())
        }
    }
}
