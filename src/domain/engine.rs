//! Contract between the board controller and the game authority.
//!
//! The controller never computes legality or game status itself; everything
//! it knows about the game comes through [`ChessEngine`].

use std::time::Duration;

use thiserror::Error;

use crate::domain::chess::{BoardSnapshot, Cell, GameStatus, Move, PieceColor, PieceKind};
use crate::domain::transform::Orientation;

/// Result of applying a move (human or computer) on the engine
#[derive(Clone, Debug)]
pub struct MoveOutcome {
    pub status: GameStatus,
    pub board: BoardSnapshot,
    /// `None` until the first move of the game has been played
    pub last_move: Option<Move>,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine at {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("engine pipe closed")]
    Disconnected,
    #[error("engine did not answer within {0:?}")]
    Timeout(Duration),
    #[error("engine sent an unusable reply: {0}")]
    Protocol(String),
    #[error("engine proposed an illegal move: {0}")]
    IllegalMove(String),
    #[error("no legal move available")]
    NoMove,
}

/// The game authority the controller plays against.
pub trait ChessEngine {
    /// Current board contents
    fn board(&self) -> BoardSnapshot;

    /// Cells the piece on `cell` may move to. Empty when the cell holds no
    /// piece of the side allowed to move.
    fn legal_destinations(&mut self, cell: Cell) -> Vec<Cell>;

    /// Apply a move. An illegal move leaves the game unchanged and returns
    /// the current state.
    fn apply_move(&mut self, start: Cell, end: Cell) -> MoveOutcome;

    fn turn(&self) -> PieceColor;

    /// Must be called before the `apply_move` that completes a promotion.
    fn set_promotion_choice(&mut self, kind: PieceKind);

    fn start_new_game(
        &mut self,
        orientation: Orientation,
        reply_time_budget: Duration,
        use_opening_book: bool,
    );

    /// Let the computer play its move for the side to move.
    fn computer_reply(&mut self) -> Result<MoveOutcome, EngineError>;
}
