//! `ChessEngine` implementation over a `shakmaty` position.
//!
//! The human side is fixed per game. Computer replies come from a UCI engine
//! when one is configured, otherwise from a small greedy mover.
//!
//! A UCI search blocks for the whole reply budget, so the host takes a
//! [`SearchRequest`], runs it on a background thread and hands the
//! [`SearchResult`] back before asking for the reply.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, EnPassantMode, File, Move, Position, Role, Square as SSquare};

use crate::domain::chess::{
    BoardSnapshot, Cell, GameStatus, Move as BoardMove, PieceColor, PieceKind, from_shakmaty_color,
    from_square, kind_to_role, shakmaty_to_piece, to_square,
};
use crate::domain::engine::{ChessEngine, EngineError, MoveOutcome};
use crate::domain::transform::Orientation;
use crate::models::engine::UciEngine;

/// Default search time handed to the UCI engine
pub const DEFAULT_REPLY_BUDGET: Duration = Duration::from_millis(1000);

/// Halfmove clock value that ends the game under the 50 move rule
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Where computer replies come from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplySource {
    Uci,
    /// Greedy mover; ignores the reply time and the opening book
    Builtin,
}

impl fmt::Display for ReplySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplySource::Uci => write!(f, "UCI engine"),
            ReplySource::Builtin => write!(f, "built-in mover (no time limit or book)"),
        }
    }
}

/// One UCI search, detached from the engine state so it can run on any thread
pub struct SearchRequest {
    uci: Arc<Mutex<UciEngine>>,
    fen: String,
    movetime: Duration,
    /// Opening book setting, when the engine still has to be reset first
    new_game: Option<bool>,
}

impl SearchRequest {
    /// Block until the engine answers, times out or goes away
    pub fn run(self) -> SearchResult {
        let best = match self.uci.lock() {
            Ok(uci) => {
                if let Some(book) = self.new_game {
                    if let Err(e) = uci.new_game(book) {
                        warn!("engine rejected new game: {}", e);
                    }
                }
                uci.best_move(&self.fen, self.movetime)
            }
            Err(_) => Err(EngineError::Disconnected),
        };
        SearchResult {
            fen: self.fen,
            best,
        }
    }
}

/// Answer to a [`SearchRequest`], tied to the position it was asked for
#[derive(Debug)]
pub struct SearchResult {
    fen: String,
    best: Result<Option<String>, EngineError>,
}

pub struct LocalEngine {
    position: Chess,
    player: PieceColor,
    promotion: PieceKind,
    last_move: Option<BoardMove>,
    reply_budget: Duration,
    use_opening_book: bool,
    uci: Option<Arc<Mutex<UciEngine>>>,
    /// Book setting for a `ucinewgame` not yet sent
    pending_new_game: Option<bool>,
    /// Search finished off-thread, waiting for `computer_reply`
    searched: Option<SearchResult>,
    /// Occurrences of each (board, side to move, castling, en passant) seen
    /// this game
    repetitions: HashMap<String, u32>,
}

impl LocalEngine {
    pub fn new() -> Self {
        let position = Chess::default();
        let mut repetitions = HashMap::new();
        repetitions.insert(repetition_key(&position), 1);
        Self {
            position,
            player: PieceColor::White,
            promotion: PieceKind::Queen,
            last_move: None,
            reply_budget: DEFAULT_REPLY_BUDGET,
            use_opening_book: true,
            uci: None,
            pending_new_game: None,
            searched: None,
            repetitions,
        }
    }

    /// Use a UCI engine for computer replies
    pub fn with_uci(mut self, uci: UciEngine) -> Self {
        self.uci = Some(Arc::new(Mutex::new(uci)));
        self.pending_new_game = Some(self.use_opening_book);
        self
    }

    pub fn reply_source(&self) -> ReplySource {
        if self.uci.is_some() {
            ReplySource::Uci
        } else {
            ReplySource::Builtin
        }
    }

    /// The UCI search for the computer's next move, if one is due
    pub fn search_request(&mut self) -> Option<SearchRequest> {
        let uci = self.uci.as_ref()?;
        if self.turn() == self.player || !self.status().is_in_progress() {
            return None;
        }
        Some(SearchRequest {
            uci: Arc::clone(uci),
            fen: fen_string(&self.position),
            movetime: self.reply_budget,
            new_game: self.pending_new_game.take(),
        })
    }

    /// Keep a finished search for the next `computer_reply`. Returns false when
    /// the board moved on while it ran and the result was dropped.
    pub fn supply_search(&mut self, result: SearchResult) -> bool {
        if result.fen != fen_string(&self.position) {
            debug!("dropping search for {}", result.fen);
            return false;
        }
        self.searched = Some(result);
        true
    }

    /// Status string for the current position, empty while the game goes on
    pub fn status(&self) -> GameStatus {
        let pos = &self.position;
        if pos.is_checkmate() {
            // the side to move has been mated
            let winner = from_shakmaty_color(pos.turn()).opposite();
            return GameStatus::new(format!("{} won", winner.name()));
        }
        if pos.is_stalemate() {
            return GameStatus::new("Draw by stalemate");
        }
        if pos.is_insufficient_material() {
            return GameStatus::new("Draw by insufficient mating material");
        }
        if self
            .repetitions
            .get(&repetition_key(pos))
            .is_some_and(|&n| n >= 3)
        {
            return GameStatus::new("Draw by repetition");
        }
        if pos.halfmoves() >= FIFTY_MOVE_HALFMOVES {
            return GameStatus::new("Draw by 50 move rule");
        }
        GameStatus::in_progress()
    }

    fn outcome(&self) -> MoveOutcome {
        MoveOutcome {
            status: self.status(),
            board: self.board(),
            last_move: self.last_move,
        }
    }

    /// Play a legal move and record it
    fn play(&mut self, m: Move) -> Result<(), EngineError> {
        let described = format!("{:?}", m);
        let (from, to) = move_squares(&m).ok_or_else(|| EngineError::IllegalMove(described.clone()))?;
        self.position = self
            .position
            .clone()
            .play(m)
            .map_err(|_| EngineError::IllegalMove(described))?;
        self.last_move = Some(BoardMove::new(from_square(from), from_square(to)));
        *self.repetitions.entry(repetition_key(&self.position)).or_insert(0) += 1;
        Ok(())
    }

    /// Legal moves from `start` to `end`, with castling entered as the king's
    /// destination square
    fn matching_moves(&self, start: Cell, end: Cell) -> Vec<Move> {
        let (from, to) = (to_square(start), to_square(end));
        self.position
            .legal_moves()
            .into_iter()
            .filter(|m| move_squares(m) == Some((from, to)))
            .collect()
    }

    /// Reply from a supplied search, or from one run here when the host did
    /// not search ahead
    fn uci_reply(&mut self) -> Result<Move, EngineError> {
        let result = match self.searched.take() {
            Some(result) => result,
            None => self.search_request().ok_or(EngineError::NoMove)?.run(),
        };
        let best = result.best?.ok_or(EngineError::NoMove)?;
        let parsed: UciMove = best
            .parse()
            .map_err(|_| EngineError::Protocol(format!("bad bestmove {}", best)))?;
        parsed
            .to_move(&self.position)
            .map_err(|_| EngineError::IllegalMove(best))
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessEngine for LocalEngine {
    fn board(&self) -> BoardSnapshot {
        let board = self.position.board();
        BoardSnapshot::from_fn(|cell| board.piece_at(to_square(cell)).map(shakmaty_to_piece))
    }

    fn legal_destinations(&mut self, cell: Cell) -> Vec<Cell> {
        if !cell.is_on_board() || self.turn() != self.player || !self.status().is_in_progress() {
            return Vec::new();
        }
        let from = to_square(cell);
        let mut destinations: Vec<Cell> = Vec::new();
        for m in &self.position.legal_moves() {
            if let Some((start, end)) = move_squares(m) {
                let end = from_square(end);
                // promotions list one move per piece
                if start == from && !destinations.contains(&end) {
                    destinations.push(end);
                }
            }
        }
        destinations
    }

    fn apply_move(&mut self, start: Cell, end: Cell) -> MoveOutcome {
        let candidates = self.matching_moves(start, end);
        let chosen = kind_to_role(self.promotion);
        let m = candidates
            .iter()
            .find(|m| m.promotion().is_none_or(|role| role == chosen))
            .cloned();

        match m {
            Some(m) => {
                if let Err(e) = self.play(m) {
                    warn!("move {:?} -> {:?} rejected: {}", start, end, e);
                }
            }
            None => debug!("illegal move {:?} -> {:?} ignored", start, end),
        }
        self.promotion = PieceKind::Queen;
        self.outcome()
    }

    fn turn(&self) -> PieceColor {
        from_shakmaty_color(self.position.turn())
    }

    fn set_promotion_choice(&mut self, kind: PieceKind) {
        self.promotion = kind;
    }

    fn start_new_game(&mut self, orientation: Orientation, budget: Duration, book: bool) {
        self.position = Chess::default();
        self.player = orientation.player_color();
        self.promotion = PieceKind::Queen;
        self.last_move = None;
        self.reply_budget = budget;
        self.use_opening_book = book;
        self.repetitions.clear();
        self.repetitions.insert(repetition_key(&self.position), 1);
        self.searched = None;
        match self.reply_source() {
            ReplySource::Uci => self.pending_new_game = Some(book),
            ReplySource::Builtin => info!(
                "built-in mover ignores reply time {:?} and opening book {}",
                budget, book
            ),
        }
        info!("local engine reset, human plays {}", self.player.name());
    }

    fn computer_reply(&mut self) -> Result<MoveOutcome, EngineError> {
        if self.turn() == self.player || !self.status().is_in_progress() {
            return Ok(self.outcome());
        }
        let m = match self.reply_source() {
            ReplySource::Uci => self.uci_reply()?,
            ReplySource::Builtin => greedy_move(&self.position).ok_or(EngineError::NoMove)?,
        };
        debug!("computer plays {:?}", m);
        self.play(m)?;
        Ok(self.outcome())
    }
}

/// Board squares a move is entered with; castling uses the king's destination
fn move_squares(m: &Move) -> Option<(SSquare, SSquare)> {
    match m {
        Move::Normal { from, to, .. } | Move::EnPassant { from, to } => Some((*from, *to)),
        Move::Castle { king, rook } => {
            let file = if rook.file() == File::H { File::G } else { File::C };
            Some((*king, SSquare::from_coords(file, king.rank())))
        }
        Move::Put { .. } => None,
    }
}

fn fen_string(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// Board placement, side to move, castling rights and en passant square:
/// the first four FEN fields
fn repetition_key(pos: &Chess) -> String {
    let fen = fen_string(pos);
    fen.split(' ').take(4).collect::<Vec<_>>().join(" ")
}

fn role_value(role: Role) -> u32 {
    match role {
        Role::Pawn => 1,
        Role::Knight | Role::Bishop => 3,
        Role::Rook => 5,
        Role::Queen => 9,
        Role::King => 0,
    }
}

/// Mate if available, else the most valuable capture, else a promotion, else
/// the first legal move
pub fn greedy_move(pos: &Chess) -> Option<Move> {
    let moves = pos.legal_moves();

    let mate = moves.iter().find(|m| {
        pos.clone()
            .play((*m).clone())
            .is_ok_and(|after| after.is_checkmate())
    });
    if let Some(m) = mate {
        return Some(m.clone());
    }

    let capture = moves
        .iter()
        .filter_map(|m| m.capture().map(|role| (role_value(role), m)))
        .max_by_key(|(value, _)| *value);
    if let Some((_, m)) = capture {
        return Some(m.clone());
    }

    if let Some(m) = moves.iter().find(|m| m.promotion() == Some(Role::Queen)) {
        return Some(m.clone());
    }

    moves.first().cloned()
}
