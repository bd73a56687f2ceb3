//! Move commit and the promotion sub-flow.

use log::{debug, warn};

use super::{BoardController, ControllerEvent};
use crate::domain::chess::{Cell, Move, PieceColor, PieceKind};
use crate::domain::engine::{ChessEngine, MoveOutcome};

/// A pawn move to the last rank waiting for the player to pick a piece.
/// While it exists the normal commit path is suspended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingPromotion {
    pub origin: Cell,
    pub destination: Cell,
    pub color: PieceColor,
}

impl<E: ChessEngine> BoardController<E> {
    /// Commit a validated human move. Gesture state must already be cleared.
    pub(super) fn commit(&mut self, origin: Cell, destination: Cell) {
        let moving = self.snapshot.piece_at(origin);
        debug_assert!(moving.is_some(), "commit from empty square {:?}", origin);

        if moving.is_some_and(|p| p.kind == PieceKind::Pawn) && destination.is_last_rank() {
            let color = self.engine.turn();
            debug!("promotion pending {:?} -> {:?} for {:?}", origin, destination, color);
            self.pending_promotion = Some(PendingPromotion {
                origin,
                destination,
                color,
            });
            self.events.push(ControllerEvent::PromotionPrompt {
                color,
                placement: self.geometry.surface,
            });
            self.redraw();
            return;
        }

        self.apply_human_move(origin, destination);
    }

    /// Resume a suspended promotion with the piece the player picked.
    pub fn choose_promotion(&mut self, kind: PieceKind) {
        let Some(pending) = self.pending_promotion.take() else {
            warn!("promotion choice {:?} without a pending promotion", kind);
            return;
        };
        debug_assert!(pending.destination.is_last_rank());
        debug!("promoting to {:?}", kind);

        self.engine.set_promotion_choice(kind);
        self.events.push(ControllerEvent::PromotionPromptHidden);
        self.apply_human_move(pending.origin, pending.destination);
    }

    fn apply_human_move(&mut self, origin: Cell, destination: Cell) {
        debug!("committing {:?} -> {:?}", origin, destination);
        let outcome = self.engine.apply_move(origin, destination);
        self.apply_outcome(outcome);
        self.schedule_reply();
    }

    /// Replace the snapshot wholesale with the engine's report and redraw.
    pub(super) fn apply_outcome(&mut self, outcome: MoveOutcome) {
        self.snapshot = outcome.board;
        self.last_move = outcome.last_move.and_then(Move::from_reported);
        self.publish_status(outcome.status);
        self.redraw();
    }
}
