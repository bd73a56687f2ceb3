//! Computer-reply scheduling.
//!
//! The controller does not own a timer. It publishes
//! [`ControllerEvent::ComputerReplyScheduled`] and the host calls
//! [`BoardController::complete_computer_reply`] once the delay has passed.
//! Input stays blocked from scheduling until completion, so at most one
//! request is ever outstanding.

use log::{debug, error, warn};

use super::{BoardController, ControllerEvent};
use crate::domain::chess::GameStatus;
use crate::domain::engine::ChessEngine;

impl<E: ChessEngine> BoardController<E> {
    /// Schedule one reply if the game is still in progress.
    /// Returns whether a request was scheduled.
    pub(super) fn schedule_reply(&mut self) -> bool {
        if !self.status.is_in_progress() {
            debug!("game over ({}), no reply", self.status.as_str());
            return false;
        }
        if self.reply_outstanding {
            return false;
        }
        self.reply_outstanding = true;
        self.events.push(ControllerEvent::ComputerReplyScheduled {
            delay: self.reply_delay,
        });
        true
    }

    /// Ask the engine for its move and apply it. Called by the host when the
    /// scheduled delay has elapsed.
    pub fn complete_computer_reply(&mut self) {
        if !self.reply_outstanding {
            warn!("computer reply completed without a scheduled request");
            return;
        }

        match self.engine.computer_reply() {
            Ok(outcome) => {
                debug!("computer replied {:?}", outcome.last_move);
                self.apply_outcome(outcome);
            }
            Err(e) => {
                error!("computer reply failed: {}", e);
                self.publish_status(GameStatus::new(format!("Engine error: {}", e)));
                self.redraw();
            }
        }
        self.reply_outstanding = false;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::testing::*;
    use super::super::{DEFAULT_REPLY_DELAY, InputPhase};
    use super::*;
    use crate::domain::chess::{Cell, Move, PieceKind};

    const E2: Cell = Cell::new(6, 4);
    const E4: Cell = Cell::new(4, 4);
    const E7: Cell = Cell::new(1, 4);
    const E5: Cell = Cell::new(3, 4);

    fn engine() -> ScriptedEngine {
        ScriptedEngine::new(&[(E2, white(PieceKind::Pawn)), (E7, black(PieceKind::Pawn))])
            .with_destinations(E2, &[E4])
    }

    fn play_e4(c: &mut BoardController<ScriptedEngine>) {
        c.pointer_down(at(c, E2));
        c.pointer_move(at(c, E4));
        c.pointer_up(at(c, E4));
    }

    fn scheduled(events: &[ControllerEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, ControllerEvent::ComputerReplyScheduled { .. }))
            .count()
    }

    #[test]
    fn test_ongoing_game_schedules_exactly_one_reply() {
        let mut c = controller(engine());
        play_e4(&mut c);
        let events = c.take_events();
        assert_eq!(scheduled(&events), 1);
        assert!(events.contains(&ControllerEvent::ComputerReplyScheduled {
            delay: DEFAULT_REPLY_DELAY
        }));
        assert!(c.reply_outstanding());
        // the reply has not been requested yet
        assert_eq!(c.engine().replies, 0);
        // gesture cleared before the scheduler ran
        assert_eq!(c.phase(), InputPhase::Idle);
    }

    #[test]
    fn test_terminal_status_schedules_nothing() {
        let mut e = engine();
        e.move_status = GameStatus::new("Checkmate");
        let mut c = controller(e);
        play_e4(&mut c);
        assert_eq!(scheduled(&c.take_events()), 0);
        assert!(!c.reply_outstanding());
        assert_eq!(c.status().as_str(), "Checkmate");
    }

    #[test]
    fn test_completion_applies_reply() {
        let mut c = controller(engine());
        play_e4(&mut c);
        c.take_events();
        c.complete_computer_reply();

        assert_eq!(c.engine().replies, 1);
        assert_eq!(c.last_move(), Some(Move::new(E7, E5)));
        assert_eq!(c.snapshot().piece_at(E5), Some(black(PieceKind::Pawn)));
        assert!(!c.reply_outstanding());
        assert_eq!(scheduled(&c.take_events()), 0);
    }

    #[test]
    fn test_input_blocked_until_reply_lands() {
        let mut c = controller(engine().with_destinations(E4, &[Cell::new(3, 4)]));
        play_e4(&mut c);
        let queries = c.engine().destination_queries.len();
        c.pointer_down(at(&c, E4));
        assert_eq!(c.engine().destination_queries.len(), queries);
        assert_eq!(c.phase(), InputPhase::Idle);
    }

    #[test]
    fn test_sentinel_reply_move_is_not_highlighted() {
        let mut e = engine();
        e.reply_move = Move::NONE_SENTINEL;
        let mut c = controller(e);
        play_e4(&mut c);
        assert!(c.last_move().is_some());
        // the scripted engine plays nothing for the sentinel
        c.complete_computer_reply();
        assert_eq!(c.last_move(), None);
    }

    #[test]
    fn test_spurious_completion_is_ignored() {
        let mut c = controller(engine());
        c.complete_computer_reply();
        assert_eq!(c.engine().replies, 0);
    }

    #[test]
    fn test_engine_failure_is_published_and_ends_round() {
        let mut e = engine();
        e.reply_fails = true;
        let mut c = controller(e);
        play_e4(&mut c);
        c.take_events();
        c.complete_computer_reply();
        assert!(!c.reply_outstanding());
        assert!(c.status().as_str().starts_with("Engine error"));
        assert!(c
            .take_events()
            .iter()
            .any(|e| matches!(e, ControllerEvent::StatusChanged(s) if !s.is_in_progress())));
    }

    #[test]
    fn test_promotion_completion_schedules_reply() {
        let b7 = Cell::new(1, 1);
        let b8 = Cell::new(0, 1);
        let e = ScriptedEngine::new(&[(b7, white(PieceKind::Pawn))]).with_destinations(b7, &[b8]);
        let mut c = controller(e).with_reply_delay(Duration::from_millis(10));
        c.pointer_down(at(&c, b7));
        c.pointer_move(at(&c, b8));
        c.pointer_up(at(&c, b8));
        assert_eq!(scheduled(&c.take_events()), 0);
        c.choose_promotion(PieceKind::Queen);
        assert!(c.take_events().contains(&ControllerEvent::ComputerReplyScheduled {
            delay: Duration::from_millis(10)
        }));
    }
}
