//! Side panel - game status and controls.

use gpui::{App, Entity, SharedString, div, prelude::*, px, rgb};
use gpui_component::button::{Button, ButtonVariants};

use crate::domain::chess::PieceColor;
use crate::models::GameModel;
use crate::ui::theme::{
    BOARD_PADDING, BORDER_COLOR, PANEL_BG, SIDE_PANEL_BG, TEXT_PRIMARY, TEXT_SECONDARY,
};

/// Render the side panel with the status line and game controls
pub fn render_side_panel(model: &Entity<GameModel>, cx: &App) -> impl IntoElement {
    let game = model.read(cx);
    let status = SharedString::from(game.status_text().to_string());
    let thinking = game.reply_pending();
    let opponent = SharedString::from(format!("Opponent: {}", game.reply_source()));
    let using_touch = game.using_touch();

    let new_game_button = |color: PieceColor| {
        let model = model.clone();
        Button::new(SharedString::from(format!(
            "new-game-{}",
            color.name().to_lowercase()
        )))
        .label(format!("New Game ({})", color.name()))
        .primary()
        .compact()
        .on_click(move |_, _, cx| {
            model.update(cx, |game, cx| game.new_game(color, cx));
        })
    };

    let model_flip = model.clone();
    let flip_button = Button::new("flip-board")
        .label("Flip Board")
        .compact()
        .on_click(move |_, _, cx| {
            model_flip.update(cx, |game, cx| game.flip_board(cx));
        });

    let model_input = model.clone();
    let input_button = Button::new("input-mode")
        .label(if using_touch {
            "Input: Touch"
        } else {
            "Input: Pointer"
        })
        .compact()
        .on_click(move |_, _, cx| {
            model_input.update(cx, |game, cx| game.toggle_input_mode(cx));
        });

    let panel = div()
        .flex_1()
        .min_h_0()
        .flex()
        .flex_col()
        .gap_4()
        .p_4()
        .bg(rgb(SIDE_PANEL_BG))
        .border_1()
        .border_color(rgb(BORDER_COLOR))
        .rounded_md()
        .child(
            div()
                .flex()
                .flex_col()
                .gap_1()
                .child(
                    div()
                        .text_color(rgb(TEXT_PRIMARY))
                        .font_weight(gpui::FontWeight::SEMIBOLD)
                        .child("Status"),
                )
                .child(div().text_color(rgb(TEXT_PRIMARY)).child(status))
                .child(div().text_xs().text_color(rgb(TEXT_SECONDARY)).child(opponent))
                .when(thinking, |el| {
                    el.child(
                        div()
                            .text_xs()
                            .text_color(rgb(TEXT_SECONDARY))
                            .child("Computer is thinking..."),
                    )
                }),
        )
        .child(
            div()
                .flex()
                .flex_col()
                .gap_2()
                .child(new_game_button(PieceColor::White))
                .child(new_game_button(PieceColor::Black))
                .child(flip_button)
                .child(input_button),
        );

    div()
        .size_full()
        .flex()
        .flex_col()
        .overflow_hidden()
        .bg(rgb(PANEL_BG))
        .p(px(BOARD_PADDING))
        .child(panel)
}
