//! Input state machine for pointer drags and touch taps.
//!
//! Pointer: press on a movable piece, drag over a legal destination, release
//! on it. Touch: tap a movable piece, then tap a legal destination; a tap
//! anywhere else is taken as a new origin selection. Only the path matching
//! `using_touch` is processed, so the synthetic mouse events that accompany
//! touches are never handled twice.

use log::debug;

use super::BoardController;
use crate::domain::chess::Cell;
use crate::domain::engine::ChessEngine;
use crate::domain::transform::{Point, pixel_to_cell};

/// Live gesture state, reset at the end of every gesture
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractionState {
    /// A pointer press started a gesture and has not been released
    pub pointer_active: bool,
    /// Square the gesture started from; set only when it has legal destinations
    pub origin: Option<Cell>,
    /// Legal destination currently under the pointer
    pub chosen: Option<Cell>,
    pub using_touch: bool,
    /// Last pointer position (surface-local) once the pointer has moved
    pub lifted_at: Option<Point>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputPhase {
    Idle,
    GestureStarted,
    Dragging,
    AwaitingPromotionChoice,
}

impl<E: ChessEngine> BoardController<E> {
    pub fn phase(&self) -> InputPhase {
        if self.pending_promotion.is_some() {
            InputPhase::AwaitingPromotionChoice
        } else if self.interaction.origin.is_none() {
            InputPhase::Idle
        } else if self.interaction.lifted_at.is_some() {
            InputPhase::Dragging
        } else {
            InputPhase::GestureStarted
        }
    }

    /// Select which input path is live. Switching aborts any gesture.
    pub fn set_using_touch(&mut self, using_touch: bool) {
        if self.interaction.using_touch == using_touch {
            return;
        }
        let had_gesture = self.interaction.origin.is_some();
        self.reset_gesture();
        self.interaction.using_touch = using_touch;
        if had_gesture {
            self.redraw();
        }
    }

    pub fn pointer_down(&mut self, position: Point) {
        if self.interaction.using_touch || !self.accepting_input() {
            return;
        }
        let cell = self.hit(position);
        if self.begin_gesture(cell) {
            self.interaction.pointer_active = true;
        }
    }

    pub fn pointer_move(&mut self, position: Point) {
        if self.interaction.using_touch || !self.interaction.pointer_active {
            return;
        }
        let cell = self.hit(position);
        self.interaction.chosen = self.legal_destinations.contains(&cell).then_some(cell);
        self.interaction.lifted_at = Some(self.to_local(position));
        self.redraw();
    }

    pub fn pointer_up(&mut self, position: Point) {
        if self.interaction.using_touch || !self.interaction.pointer_active {
            return;
        }
        let cell = self.hit(position);
        let origin = self.interaction.origin;
        let chosen = self.interaction.chosen;
        self.reset_gesture();

        match (origin, chosen) {
            (Some(origin), Some(chosen)) if chosen == cell => self.commit(origin, chosen),
            _ => {
                debug!("drag aborted at {:?}", cell);
                self.redraw();
            }
        }
    }

    pub fn tap(&mut self, position: Point) {
        if !self.interaction.using_touch || !self.accepting_input() {
            return;
        }
        let cell = self.hit(position);
        if let Some(origin) = self.interaction.origin {
            if self.legal_destinations.contains(&cell) {
                self.reset_gesture();
                self.commit(origin, cell);
                return;
            }
        }
        self.begin_gesture(cell);
    }

    /// New input is ignored while a promotion choice or computer reply is pending
    fn accepting_input(&self) -> bool {
        self.pending_promotion.is_none() && !self.reply_outstanding
    }

    /// Start a gesture on `cell`. Returns false (and stays idle) when the
    /// engine offers no destination for it.
    fn begin_gesture(&mut self, cell: Cell) -> bool {
        let had_overlay = self.interaction.origin.is_some();
        self.reset_gesture();

        let destinations = if cell.is_on_board() {
            self.engine.legal_destinations(cell)
        } else {
            Vec::new()
        };
        if destinations.is_empty() {
            if had_overlay {
                self.redraw();
            }
            return false;
        }

        debug!("gesture from {:?}: {} destinations", cell, destinations.len());
        self.interaction.origin = Some(cell);
        self.legal_destinations = destinations;
        self.redraw();
        true
    }

    pub(super) fn reset_gesture(&mut self) {
        self.interaction = InteractionState {
            using_touch: self.interaction.using_touch,
            ..Default::default()
        };
        self.legal_destinations.clear();
    }

    fn hit(&self, position: Point) -> Cell {
        pixel_to_cell(
            position,
            self.geometry.surface,
            self.geometry.square_size,
            self.orientation,
        )
    }

    fn to_local(&self, position: Point) -> Point {
        Point::new(
            position.x - self.geometry.surface.left,
            position.y - self.geometry.surface.top,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::controller::render::{CAPTURE_MARKER, DrawOp, GHOST_OPACITY};
    use crate::domain::chess::PieceKind;
    use crate::domain::transform::Orientation;

    const E2: Cell = Cell::new(6, 4);
    const E3: Cell = Cell::new(5, 4);
    const E4: Cell = Cell::new(4, 4);
    const D3: Cell = Cell::new(5, 3);

    fn pawn_engine() -> ScriptedEngine {
        ScriptedEngine::new(&[
            (E2, white(PieceKind::Pawn)),
            (Cell::new(0, 4), black(PieceKind::King)),
        ])
        .with_destinations(E2, &[E4, E3])
    }

    fn assert_invariant(c: &BoardController<ScriptedEngine>) {
        let active = c.phase() == InputPhase::GestureStarted || c.phase() == InputPhase::Dragging;
        assert_eq!(c.interaction().origin.is_some(), active);
        if c.interaction().origin.is_none() {
            assert!(c.legal_destinations().is_empty());
        }
    }

    #[test]
    fn test_press_on_empty_square_stays_idle() {
        let mut c = controller(pawn_engine());
        let before = c.display_list().clone();
        c.pointer_down(at(&c, Cell::new(4, 0)));
        assert_eq!(c.phase(), InputPhase::Idle);
        assert_eq!(c.display_list(), &before);
        assert_invariant(&c);
    }

    #[test]
    fn test_press_shows_destinations() {
        let mut c = controller(pawn_engine());
        c.pointer_down(at(&c, E2));
        assert_eq!(c.phase(), InputPhase::GestureStarted);
        assert_eq!(c.interaction().origin, Some(E2));
        assert!(c.interaction().pointer_active);
        assert_eq!(c.legal_destinations(), &[E4, E3]);
        let ghosts = c
            .display_list()
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { alpha, .. } if *alpha == GHOST_OPACITY))
            .count();
        assert_eq!(ghosts, 2);
        assert_invariant(&c);
    }

    #[test]
    fn test_press_outside_board_is_ignored() {
        let mut c = controller(pawn_engine());
        c.pointer_down(Point::new(5.0, 5.0));
        assert_eq!(c.phase(), InputPhase::Idle);
        assert!(c.engine().destination_queries.is_empty());
    }

    #[test]
    fn test_release_on_chosen_destination_commits() {
        let mut c = controller(pawn_engine());
        c.pointer_down(at(&c, E2));
        c.pointer_move(at(&c, E3));
        assert_eq!(c.phase(), InputPhase::Dragging);
        assert_eq!(c.interaction().chosen, Some(E3));
        c.pointer_up(at(&c, E3));

        assert_eq!(c.engine().applied, vec![(E2, E3)]);
        assert_eq!(c.snapshot().piece_at(E3), Some(white(PieceKind::Pawn)));
        assert_eq!(c.phase(), InputPhase::Idle);
        assert_invariant(&c);
    }

    #[test]
    fn test_release_off_destinations_aborts() {
        let mut c = controller(pawn_engine());
        let before = c.snapshot().clone();
        c.pointer_down(at(&c, E2));
        c.pointer_move(at(&c, D3));
        assert_eq!(c.interaction().chosen, None);
        c.pointer_up(at(&c, D3));

        assert!(c.engine().applied.is_empty());
        assert_eq!(c.snapshot(), &before);
        assert_eq!(c.phase(), InputPhase::Idle);
        assert!(!c
            .display_list()
            .ops()
            .iter()
            .any(|op| matches!(op, DrawOp::Image { alpha, .. } if *alpha == GHOST_OPACITY)));
        assert_invariant(&c);
    }

    #[test]
    fn test_release_on_non_destination_row_four_aborts() {
        let mut c = controller(pawn_engine());
        let d4 = Cell::new(4, 3);
        c.pointer_down(at(&c, E2));
        c.pointer_move(at(&c, d4));
        c.pointer_up(at(&c, d4));
        assert!(c.engine().applied.is_empty());
        assert_eq!(c.snapshot().piece_at(E2), Some(white(PieceKind::Pawn)));
        assert_eq!(c.phase(), InputPhase::Idle);
        assert_invariant(&c);
    }

    #[test]
    fn test_release_elsewhere_after_hovering_destination_aborts() {
        let mut c = controller(pawn_engine());
        c.pointer_down(at(&c, E2));
        c.pointer_move(at(&c, E4));
        c.pointer_up(at(&c, E3));
        assert!(c.engine().applied.is_empty());
        assert_eq!(c.phase(), InputPhase::Idle);
    }

    #[test]
    fn test_release_without_move_aborts() {
        let mut c = controller(pawn_engine());
        c.pointer_down(at(&c, E2));
        c.pointer_up(at(&c, E2));
        assert!(c.engine().applied.is_empty());
        assert_eq!(c.phase(), InputPhase::Idle);
    }

    #[test]
    fn test_drag_ghost_follows_pointer() {
        let mut c = controller(pawn_engine());
        c.pointer_down(at(&c, E2));
        let p = Point::new(SURFACE.left + 133.0, SURFACE.top + 211.0);
        c.pointer_move(p);
        match c.display_list().ops().last() {
            Some(DrawOp::Image { rect, alpha, .. }) => {
                assert_eq!(*alpha, GHOST_OPACITY);
                assert!((rect.center().x - 133.0).abs() < 1e-3);
                assert!((rect.center().y - 211.0).abs() < 1e-3);
            }
            other => panic!("unexpected last op {:?}", other),
        }
    }

    #[test]
    fn test_new_press_invalidates_previous_destinations() {
        let engine = ScriptedEngine::new(&[
            (E2, white(PieceKind::Pawn)),
            (Cell::new(7, 6), white(PieceKind::Knight)),
        ])
        .with_destinations(E2, &[E4, E3])
        .with_destinations(Cell::new(7, 6), &[Cell::new(5, 5)]);
        let mut c = controller(engine);
        c.pointer_down(at(&c, E2));
        // release was lost (e.g. outside the window); next press starts over
        c.pointer_down(at(&c, Cell::new(7, 6)));
        assert_eq!(c.legal_destinations(), &[Cell::new(5, 5)]);
        c.pointer_move(at(&c, E3));
        assert_eq!(c.interaction().chosen, None);
        c.pointer_up(at(&c, E3));
        assert!(c.engine().applied.is_empty());
    }

    #[test]
    fn test_black_orientation_hit_testing() {
        let mut c = controller(pawn_engine());
        c.set_orientation(Orientation::PlayingBlack);
        c.pointer_down(at(&c, E2));
        assert_eq!(c.interaction().origin, Some(E2));
        c.pointer_move(at(&c, E4));
        c.pointer_up(at(&c, E4));
        assert_eq!(c.engine().applied, vec![(E2, E4)]);
    }

    #[test]
    fn test_pointer_ignored_in_touch_mode() {
        let mut c = controller(pawn_engine());
        c.set_using_touch(true);
        c.pointer_down(at(&c, E2));
        assert_eq!(c.phase(), InputPhase::Idle);
        assert!(c.engine().destination_queries.is_empty());
    }

    #[test]
    fn test_tap_ignored_in_pointer_mode() {
        let mut c = controller(pawn_engine());
        c.tap(at(&c, E2));
        assert_eq!(c.phase(), InputPhase::Idle);
    }

    #[test]
    fn test_tap_select_then_commit() {
        let mut c = controller(pawn_engine());
        c.set_using_touch(true);
        c.tap(at(&c, E2));
        assert_eq!(c.phase(), InputPhase::GestureStarted);
        assert!(!c.interaction().pointer_active);
        c.tap(at(&c, E4));
        assert_eq!(c.engine().applied, vec![(E2, E4)]);
        assert_eq!(c.phase(), InputPhase::Idle);
        assert_invariant(&c);
    }

    #[test]
    fn test_second_tap_on_empty_square_reselects_and_goes_idle() {
        let mut c = controller(pawn_engine());
        c.set_using_touch(true);
        c.tap(at(&c, E2));
        c.tap(at(&c, Cell::new(3, 0)));
        assert_eq!(c.phase(), InputPhase::Idle);
        assert!(c.legal_destinations().is_empty());
        assert!(c.engine().applied.is_empty());
        assert_eq!(c.engine().destination_queries, vec![E2, Cell::new(3, 0)]);
        assert_invariant(&c);
    }

    #[test]
    fn test_touch_capture_marker() {
        let engine = ScriptedEngine::new(&[
            (E2, white(PieceKind::Pawn)),
            (D3, black(PieceKind::Knight)),
        ])
        .with_destinations(E2, &[D3, E3]);
        let mut c = controller(engine);
        c.set_using_touch(true);
        c.tap(at(&c, E2));
        let captures = c
            .display_list()
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill { color, .. } if *color == CAPTURE_MARKER))
            .count();
        assert_eq!(captures, 1);
    }

    #[test]
    fn test_switching_input_mode_aborts_gesture() {
        let mut c = controller(pawn_engine());
        c.pointer_down(at(&c, E2));
        c.set_using_touch(true);
        assert_eq!(c.phase(), InputPhase::Idle);
        assert!(c.interaction().using_touch);
        assert_invariant(&c);
    }
}
