//! Application setup and window creation.

use anyhow::Context as _;
use gpui::{App, Bounds, WindowBounds, WindowOptions, prelude::*, px, size};
use gpui_component::Root;
use log::{debug, error, warn};

use crate::config::Settings;
use crate::controller::render::PieceSet;
use crate::models::{GameModel, LocalEngine, UciEngine};
use crate::ui::FileAssets;
use crate::ui::views::ChessBoardView;

/// Built-in mover, or the configured UCI engine when it starts
fn build_engine(settings: &Settings) -> LocalEngine {
    let engine = LocalEngine::new();
    let Some(path) = &settings.engine_path else {
        return engine;
    };
    match UciEngine::start(path) {
        Ok(uci) => engine.with_uci(uci),
        Err(e) => {
            warn!("{}; falling back to the built-in mover", e);
            engine
        }
    }
}

/// Initialize and run the chess application
pub fn run(settings: Settings, cx: &mut App) {
    gpui_component::init(cx);

    let assets = FileAssets::new();
    let pieces = PieceSet::discover(assets.root_for(&settings.assets_dir), &settings.assets_dir);
    debug!("{} piece images available", pieces.len());
    let color = settings.player_color.into();
    let engine = build_engine(&settings);

    // Create the game model and start the first game
    let model = cx.new(|_| GameModel::new(engine, pieces, settings));
    model.update(cx, |game, cx| game.new_game(color, cx));

    let bounds = Bounds::centered(None, size(px(900.0), px(640.0)), cx);
    let opened = cx
        .open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(bounds)),
                ..Default::default()
            },
            |window, cx| {
                let view = cx.new(|cx| ChessBoardView::new(model, cx));
                cx.new(|cx| Root::new(view, window, cx))
            },
        )
        .context("failed to open the main window");

    if let Err(e) = opened {
        error!("{:#}", e);
        cx.quit();
    }
}
