//! Game model - the application layer between GPUI and the board controller.
//!
//! Owns the controller, drains its events after every call and runs the
//! computer-reply timer on the GPUI executor. UCI searches run on the
//! background executor so the window keeps painting while the engine thinks.

use gpui::{AsyncApp, Bounds, Context, Pixels, Task, WeakEntity};
use log::debug;

use crate::config::Settings;
use crate::controller::render::{DisplayList, PieceSet};
use crate::controller::{BoardController, ControllerEvent, NewGameOptions};
use crate::domain::chess::{GameStatus, Piece, PieceColor, PieceKind};
use crate::domain::engine::ChessEngine;
use crate::domain::transform::{Orientation, Point, Rect};
use crate::models::local_engine::{LocalEngine, ReplySource};
use crate::ui::BoardLayout;

/// Promotion picker the side panel should show
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PromotionPrompt {
    pub color: PieceColor,
    /// Board surface the picker belongs to, in window pixels
    pub placement: Rect,
}

pub struct GameModel {
    controller: BoardController<LocalEngine>,
    settings: Settings,
    /// Text shown in the status line
    status_text: String,
    promotion_prompt: Option<PromotionPrompt>,
    /// Measured board panel, used to size the board
    pub panel_bounds: Bounds<Pixels>,
    _reply_task: Option<Task<()>>,
}

impl GameModel {
    pub fn new(engine: LocalEngine, pieces: PieceSet, settings: Settings) -> Self {
        let mut controller =
            BoardController::new(engine, pieces).with_reply_delay(settings.reply_delay());
        controller.set_using_touch(settings.using_touch());
        controller.set_orientation(settings.orientation());
        let layout = BoardLayout::default();
        controller.set_geometry(layout.geometry());
        controller.take_events();

        Self {
            controller,
            settings,
            status_text: GameStatus::NEW_GAME.to_string(),
            promotion_prompt: None,
            panel_bounds: layout.panel_bounds,
            _reply_task: None,
        }
    }

    pub fn display_list(&self) -> &DisplayList {
        self.controller.display_list()
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn promotion_prompt(&self) -> Option<PromotionPrompt> {
        self.promotion_prompt
    }

    pub fn using_touch(&self) -> bool {
        self.controller.interaction().using_touch
    }

    pub fn square_size(&self) -> f32 {
        self.controller.geometry().square_size
    }

    /// Image path for `piece` under the configured assets directory
    pub fn piece_image(&self, piece: Piece) -> String {
        format!("{}/{}", self.settings.assets_dir, PieceSet::file_name(piece))
    }

    pub fn reply_pending(&self) -> bool {
        self.controller.reply_outstanding()
    }

    pub fn reply_source(&self) -> ReplySource {
        self.controller.engine().reply_source()
    }

    /// Store the measured board panel and resize the board to it
    pub fn set_panel_bounds(&mut self, bounds: Bounds<Pixels>, cx: &mut Context<Self>) {
        if self.panel_bounds == bounds {
            return;
        }
        self.panel_bounds = bounds;
        self.controller.set_geometry(BoardLayout::new(bounds).geometry());
        self.process_events(cx);
    }

    pub fn pointer_down(&mut self, position: Point, cx: &mut Context<Self>) {
        self.controller.pointer_down(position);
        self.process_events(cx);
    }

    pub fn pointer_move(&mut self, position: Point, cx: &mut Context<Self>) {
        self.controller.pointer_move(position);
        self.process_events(cx);
    }

    pub fn pointer_up(&mut self, position: Point, cx: &mut Context<Self>) {
        self.controller.pointer_up(position);
        self.process_events(cx);
    }

    pub fn tap(&mut self, position: Point, cx: &mut Context<Self>) {
        self.controller.tap(position);
        self.process_events(cx);
    }

    pub fn choose_promotion(&mut self, kind: PieceKind, cx: &mut Context<Self>) {
        self.controller.choose_promotion(kind);
        self.process_events(cx);
    }

    /// Start a new game with the human playing `color`
    pub fn new_game(&mut self, color: PieceColor, cx: &mut Context<Self>) {
        self.controller.start_new_game(NewGameOptions {
            orientation: Orientation::from_color(color),
            reply_time_budget: self.settings.reply_time(),
            use_opening_book: self.settings.use_opening_book,
        });
        self.process_events(cx);
    }

    /// Turn the board around without changing sides
    pub fn flip_board(&mut self, cx: &mut Context<Self>) {
        let flipped = self.controller.orientation().flipped();
        self.controller.set_orientation(flipped);
        self.process_events(cx);
    }

    pub fn toggle_input_mode(&mut self, cx: &mut Context<Self>) {
        let using_touch = !self.using_touch();
        self.controller.set_using_touch(using_touch);
        self.process_events(cx);
    }

    /// Apply every event the controller published since the last call
    fn process_events(&mut self, cx: &mut Context<Self>) {
        for event in self.controller.take_events() {
            match event {
                ControllerEvent::StatusChanged(status) => {
                    self.status_text = self.describe(&status);
                }
                ControllerEvent::PromotionPrompt { color, placement } => {
                    self.promotion_prompt = Some(PromotionPrompt { color, placement });
                }
                ControllerEvent::PromotionPromptHidden => {
                    self.promotion_prompt = None;
                }
                ControllerEvent::ComputerReplyScheduled { delay } => {
                    debug!("computer reply in {:?}", delay);
                    let task = cx.spawn(async move |weak: WeakEntity<GameModel>, cx: &mut AsyncApp| {
                        cx.background_executor().timer(delay).await;
                        // entity dropped means the window closed; nothing to do
                        loop {
                            let Ok(Some(request)) = weak.update(cx, |game, _| {
                                game.controller.engine_mut().search_request()
                            }) else {
                                break;
                            };
                            let result = cx
                                .background_executor()
                                .spawn(async move { request.run() })
                                .await;
                            // a new game during the search needs a fresh one
                            match weak.update(cx, |game, _| {
                                game.controller.engine_mut().supply_search(result)
                            }) {
                                Ok(true) => break,
                                Ok(false) => continue,
                                Err(_) => return,
                            }
                        }
                        let _ = weak.update(cx, |game, cx| {
                            game.controller.complete_computer_reply();
                            game.process_events(cx);
                        });
                    });
                    self._reply_task = Some(task);
                }
                ControllerEvent::NewGameStarted { .. } => {
                    self.status_text = GameStatus::NEW_GAME.to_string();
                }
                ControllerEvent::OrientationChanged(orientation) => {
                    debug!("board orientation {:?}", orientation);
                }
            }
        }
        cx.notify();
    }

    fn describe(&self, status: &GameStatus) -> String {
        if !status.is_in_progress() {
            return status.as_str().to_string();
        }
        if self.controller.last_move().is_none() {
            return GameStatus::NEW_GAME.to_string();
        }
        format!("{} to move", self.controller.engine().turn().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> GameModel {
        GameModel::new(
            LocalEngine::new(),
            PieceSet::standard("assets"),
            Settings::default(),
        )
    }

    #[test]
    fn test_starts_with_new_game_status() {
        let game = model();
        assert_eq!(game.status_text(), GameStatus::NEW_GAME);
        assert!(game.promotion_prompt().is_none());
        assert!(!game.reply_pending());
        assert!(!game.using_touch());
        assert_eq!(game.reply_source(), ReplySource::Builtin);
    }

    #[test]
    fn test_board_sized_to_default_panel() {
        let game = model();
        assert_eq!(game.square_size(), BoardLayout::default().square_size());
        let (width, _) = game.display_list().size();
        assert_eq!(width, game.square_size() * 8.0);
    }

    #[test]
    fn test_terminal_status_shown_verbatim() {
        let game = model();
        assert_eq!(
            game.describe(&GameStatus::new("Draw by stalemate")),
            "Draw by stalemate"
        );
        assert_eq!(game.describe(&GameStatus::in_progress()), GameStatus::NEW_GAME);
    }

    #[test]
    fn test_piece_image_under_assets_dir() {
        let settings = Settings {
            assets_dir: "pieces".to_string(),
            ..Settings::default()
        };
        let game = GameModel::new(LocalEngine::new(), PieceSet::standard("pieces"), settings);
        let knight = Piece::new(PieceKind::Knight, PieceColor::Black);
        assert_eq!(game.piece_image(knight), "pieces/knight-black.svg");
    }
}
