//! Chess board: play against the computer on a drag-and-drop or tap-to-move
//! board.

mod app;
mod config;
mod controller;
mod domain;
mod models;
mod ui;

use gpui::{App, Application};
use log::info;

use crate::config::Settings;
use crate::ui::FileAssets;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = Settings::path_from_args(std::env::args());
    let settings = Settings::load_or_default(&path);
    info!(
        "playing {:?}, reply time {:?}",
        settings.player_color,
        settings.reply_time()
    );

    Application::new()
        .with_assets(FileAssets::new())
        .run(move |cx: &mut App| app::run(settings, cx));
}
