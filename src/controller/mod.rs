//! Interactive board controller.
//!
//! Owns the board snapshot and the live gesture, turns raw pointer/touch
//! positions into moves against a [`ChessEngine`], and keeps a display list of
//! the board that is redrawn synchronously after every state change.
//!
//! The controller never talks to the UI toolkit. Everything the host needs to
//! know (status text, promotion prompt, reply timer) is queued as a
//! [`ControllerEvent`] and drained with [`BoardController::take_events`].

mod commit;
mod input;
pub mod render;
mod reply;

use std::time::Duration;

use log::info;

use crate::domain::chess::{BoardSnapshot, Cell, GameStatus, Move, PieceColor};
use crate::domain::engine::ChessEngine;
use crate::domain::transform::{Orientation, Rect};

pub use commit::PendingPromotion;
pub use input::{InputPhase, InteractionState};
use render::{DisplayList, Highlight, LiftedPiece, PieceSet};

/// Delay before asking the engine for its reply, so the human move shows first
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(250);

/// Signals published to the host
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerEvent {
    StatusChanged(GameStatus),
    /// Show the promotion picker for `color` over `placement` (window pixels)
    PromotionPrompt { color: PieceColor, placement: Rect },
    PromotionPromptHidden,
    /// Call [`BoardController::complete_computer_reply`] after `delay`
    ComputerReplyScheduled { delay: Duration },
    NewGameStarted { orientation: Orientation },
    OrientationChanged(Orientation),
}

/// Parameters of a new game
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NewGameOptions {
    pub orientation: Orientation,
    pub reply_time_budget: Duration,
    pub use_opening_book: bool,
}

/// Where the board is on screen
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    /// Bounding rectangle of the drawing surface, in window pixels
    pub surface: Rect,
    pub square_size: f32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            surface: Rect::new(0.0, 0.0, 400.0, 400.0),
            square_size: 50.0,
        }
    }
}

pub struct BoardController<E: ChessEngine> {
    engine: E,
    snapshot: BoardSnapshot,
    last_move: Option<Move>,
    status: GameStatus,
    orientation: Orientation,
    geometry: Geometry,
    interaction: InteractionState,
    /// Destinations for `interaction.origin`; emptied whenever a gesture starts or ends
    legal_destinations: Vec<Cell>,
    pending_promotion: Option<PendingPromotion>,
    reply_outstanding: bool,
    reply_delay: Duration,
    pieces: PieceSet,
    display: DisplayList,
    events: Vec<ControllerEvent>,
}

impl<E: ChessEngine> BoardController<E> {
    pub fn new(engine: E, pieces: PieceSet) -> Self {
        let snapshot = engine.board();
        let mut controller = Self {
            engine,
            snapshot,
            last_move: None,
            status: GameStatus::in_progress(),
            orientation: Orientation::default(),
            geometry: Geometry::default(),
            interaction: InteractionState::default(),
            legal_destinations: Vec::new(),
            pending_promotion: None,
            reply_outstanding: false,
            reply_delay: DEFAULT_REPLY_DELAY,
            pieces,
            display: DisplayList::new(),
            events: Vec::new(),
        };
        controller.redraw();
        controller
    }

    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Engine access for hosts that prepare a reply outside the controller
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.snapshot
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn legal_destinations(&self) -> &[Cell] {
        &self.legal_destinations
    }

    pub fn pending_promotion(&self) -> Option<&PendingPromotion> {
        self.pending_promotion.as_ref()
    }

    pub fn reply_outstanding(&self) -> bool {
        self.reply_outstanding
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.display
    }

    /// Drain the events published since the last call
    pub fn take_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Reset the game on the engine and repaint from a fresh snapshot.
    pub fn start_new_game(&mut self, options: NewGameOptions) {
        info!(
            "new game: {:?}, reply budget {:?}, opening book {}",
            options.orientation, options.reply_time_budget, options.use_opening_book
        );
        self.engine.start_new_game(
            options.orientation,
            options.reply_time_budget,
            options.use_opening_book,
        );

        self.reset_gesture();
        if self.pending_promotion.take().is_some() {
            self.events.push(ControllerEvent::PromotionPromptHidden);
        }
        if self.orientation != options.orientation {
            self.orientation = options.orientation;
            self.events
                .push(ControllerEvent::OrientationChanged(options.orientation));
        }
        self.snapshot = self.engine.board();
        self.last_move = None;
        self.events.push(ControllerEvent::NewGameStarted {
            orientation: options.orientation,
        });
        self.publish_status(GameStatus::in_progress());
        self.redraw();

        // the computer opens when the human plays black
        if self.engine.turn() != options.orientation.player_color() {
            self.schedule_reply();
        }
    }

    /// Flip the board without touching the game.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.orientation == orientation {
            return;
        }
        self.orientation = orientation;
        self.events.push(ControllerEvent::OrientationChanged(orientation));
        self.redraw();
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        if self.geometry == geometry {
            return;
        }
        self.geometry = geometry;
        self.redraw();
    }

    fn publish_status(&mut self, status: GameStatus) {
        if !status.is_in_progress() {
            info!("game status: {}", status.as_str());
        }
        self.status = status.clone();
        self.events.push(ControllerEvent::StatusChanged(status));
    }

    /// Full synchronous redraw from the current snapshot and gesture.
    fn redraw(&mut self) {
        let origin = self.interaction.origin;
        let moving = origin.and_then(|c| self.snapshot.piece_at(c));
        let dragging = self.interaction.lifted_at.is_some();

        let highlight = Highlight {
            current: if dragging { origin } else { None },
            selected: self.interaction.chosen,
            legal_destinations: &self.legal_destinations,
            moving,
            last_move: self.last_move,
        };
        let lifted = match (moving, self.interaction.lifted_at) {
            (Some(piece), Some(position)) => Some(LiftedPiece { piece, position }),
            _ => None,
        };

        render::render(
            &mut self.display,
            &self.snapshot,
            self.geometry.square_size,
            self.orientation,
            &self.pieces,
            &highlight,
            lifted,
        );
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::domain::chess::PieceKind;

    fn options(orientation: Orientation) -> NewGameOptions {
        NewGameOptions {
            orientation,
            reply_time_budget: Duration::from_millis(500),
            use_opening_book: true,
        }
    }

    #[test]
    fn test_new_controller_draws_engine_board() {
        let engine = ScriptedEngine::new(&[(Cell::new(6, 4), white(PieceKind::Pawn))]);
        let c = controller(engine);
        assert_eq!(c.snapshot().piece_at(Cell::new(6, 4)), Some(white(PieceKind::Pawn)));
        assert!(!c.display_list().ops().is_empty());
        assert_eq!(c.last_move(), None);
    }

    #[test]
    fn test_new_game_resets_last_move_and_repaints() {
        let engine = ScriptedEngine::new(&[(Cell::new(6, 4), white(PieceKind::Pawn))])
            .with_destinations(Cell::new(6, 4), &[Cell::new(5, 4)]);
        let mut c = controller(engine);
        c.pointer_down(at(&c, Cell::new(6, 4)));
        c.pointer_move(at(&c, Cell::new(5, 4)));
        c.pointer_up(at(&c, Cell::new(5, 4)));
        c.complete_computer_reply();
        assert!(c.last_move().is_some());
        c.take_events();

        c.start_new_game(options(Orientation::PlayingWhite));
        assert_eq!(c.last_move(), None);
        assert_eq!(c.phase(), InputPhase::Idle);
        assert_eq!(c.engine().new_games.len(), 1);
        assert_eq!(c.snapshot(), &c.engine().board);
        let events = c.take_events();
        assert!(events.contains(&ControllerEvent::NewGameStarted {
            orientation: Orientation::PlayingWhite
        }));
        assert!(!events.iter().any(|e| matches!(e, ControllerEvent::ComputerReplyScheduled { .. })));
    }

    #[test]
    fn test_new_game_as_black_lets_computer_open() {
        let mut c = controller(ScriptedEngine::new(&[]));
        c.start_new_game(options(Orientation::PlayingBlack));
        assert_eq!(c.orientation(), Orientation::PlayingBlack);
        assert!(c.reply_outstanding());
        let events = c.take_events();
        assert!(events.contains(&ControllerEvent::OrientationChanged(Orientation::PlayingBlack)));
        assert!(events.contains(&ControllerEvent::ComputerReplyScheduled {
            delay: DEFAULT_REPLY_DELAY
        }));
    }

    #[test]
    fn test_set_orientation_publishes_once() {
        let mut c = controller(ScriptedEngine::new(&[]));
        c.take_events();
        c.set_orientation(Orientation::PlayingBlack);
        c.set_orientation(Orientation::PlayingBlack);
        assert_eq!(
            c.take_events(),
            vec![ControllerEvent::OrientationChanged(Orientation::PlayingBlack)]
        );
    }
}
