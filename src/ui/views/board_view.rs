//! Chess board view - replays the controller's display list and routes mouse
//! input back to it.

use gpui::{
    AnyElement, Context, Entity, MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent, Pixels,
    SharedString, Subscription, Window, canvas, div, img, prelude::*, px, rgb,
};
use gpui_component::resizable::{h_resizable, resizable_panel};

use crate::controller::render::{DisplayList, DrawOp};
use crate::domain::chess::{Piece, PieceKind};
use crate::domain::transform::Point;
use crate::models::{GameModel, PromotionPrompt};
use crate::ui::theme::{
    BORDER_COLOR, BOARD_PADDING, INITIAL_LEFT_PANEL, INITIAL_RIGHT_PANEL, PANEL_BG, PICKER_BG,
    TEXT_PRIMARY,
};
use crate::ui::views::render_side_panel;

/// The main chess board view that observes a GameModel
pub struct ChessBoardView {
    model: Entity<GameModel>,
    _subscription: Subscription,
}

impl ChessBoardView {
    pub fn new(model: Entity<GameModel>, cx: &mut Context<Self>) -> Self {
        let _subscription = cx.observe(&model, |_, _, cx| cx.notify());
        Self {
            model,
            _subscription,
        }
    }
}

fn to_point(position: gpui::Point<Pixels>) -> Point {
    Point::new(position.x.into(), position.y.into())
}

/// Turn one recorded draw operation into an absolutely positioned element
fn render_op(op: &DrawOp) -> AnyElement {
    match op {
        DrawOp::Fill { rect, color, alpha } => div()
            .absolute()
            .left(px(rect.left))
            .top(px(rect.top))
            .w(px(rect.width))
            .h(px(rect.height))
            .bg(rgb(*color))
            .opacity(*alpha)
            .into_any_element(),
        // outline width is fixed by the theme
        DrawOp::Stroke {
            rect, color, alpha, ..
        } => div()
            .absolute()
            .left(px(rect.left))
            .top(px(rect.top))
            .w(px(rect.width))
            .h(px(rect.height))
            .border_4()
            .border_color(rgb(*color))
            .opacity(*alpha)
            .into_any_element(),
        DrawOp::Image { rect, path, alpha } => div()
            .absolute()
            .left(px(rect.left))
            .top(px(rect.top))
            .size(px(rect.width))
            .opacity(*alpha)
            .child(img(SharedString::from(path.clone())).size(px(rect.width)))
            .into_any_element(),
    }
}

fn render_board(display: &DisplayList) -> impl IntoElement {
    let (width, height) = display.size();
    div()
        .flex_shrink_0()
        .relative()
        .w(px(width))
        .h(px(height))
        .overflow_hidden()
        .rounded_md()
        .children(display.ops().iter().map(render_op))
}

/// Piece picker laid over the board while a promotion waits for a choice
fn render_promotion_picker(
    prompt: PromotionPrompt,
    panel_origin: Point,
    square_size: f32,
    images: Vec<(PieceKind, String)>,
    model: Entity<GameModel>,
) -> impl IntoElement {
    let choices = images.into_iter().map(|(kind, image)| {
        let model = model.clone();
        div()
            .id(SharedString::from(format!("promote-{}", kind.name().to_lowercase())))
            .flex()
            .flex_col()
            .items_center()
            .p_1()
            .rounded(px(4.0))
            .cursor_pointer()
            .hover(|s| s.bg(rgb(BORDER_COLOR)))
            .on_click(move |_ev, _window, cx| {
                model.update(cx, |game, cx| game.choose_promotion(kind, cx));
            })
            .child(img(SharedString::from(image)).size(px(square_size)))
            .child(div().text_xs().text_color(rgb(TEXT_PRIMARY)).child(kind.name()))
    });

    div()
        .absolute()
        .left(px(prompt.placement.left - panel_origin.x))
        .top(px(prompt.placement.top - panel_origin.y))
        .w(px(prompt.placement.width))
        .h(px(prompt.placement.height))
        .flex()
        .items_center()
        .justify_center()
        .child(
            div()
                .flex()
                .gap_2()
                .p_2()
                .bg(rgb(PICKER_BG))
                .border_1()
                .border_color(rgb(BORDER_COLOR))
                .rounded_md()
                .children(choices),
        )
}

impl Render for ChessBoardView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let model = self.model.clone();
        let model_down = model.clone();
        let model_move = model.clone();
        let model_up = model.clone();
        let model_measure = model.clone();

        let game = self.model.read(cx);
        let board = render_board(game.display_list());
        let panel_origin = to_point(game.panel_bounds.origin);
        let square_size = game.square_size();
        let picker = game.promotion_prompt().map(|prompt| {
            let images = PieceKind::PROMOTION_CHOICES
                .iter()
                .map(|&kind| (kind, game.piece_image(Piece::new(kind, prompt.color))))
                .collect();
            render_promotion_picker(prompt, panel_origin, square_size, images, model.clone())
        });

        let board_panel_content = div()
            .id("board-panel")
            .relative()
            .size_full()
            .overflow_hidden()
            .bg(rgb(PANEL_BG))
            .p(px(BOARD_PADDING))
            .child(board)
            .when_some(picker, |el, picker| el.child(picker))
            // touch mode takes every press as a tap
            .on_mouse_down(
                MouseButton::Left,
                move |ev: &MouseDownEvent, _window, cx| {
                    model_down.update(cx, |game, cx| {
                        let position = to_point(ev.position);
                        if game.using_touch() {
                            game.tap(position, cx);
                        } else {
                            game.pointer_down(position, cx);
                        }
                    });
                },
            )
            .on_mouse_move(move |ev: &MouseMoveEvent, _, cx| {
                model_move.update(cx, |game, cx| {
                    if !game.using_touch() {
                        game.pointer_move(to_point(ev.position), cx);
                    }
                });
            })
            .on_mouse_up(MouseButton::Left, move |ev: &MouseUpEvent, _window, cx| {
                model_up.update(cx, |game, cx| {
                    if !game.using_touch() {
                        game.pointer_up(to_point(ev.position), cx);
                    }
                });
            });

        // Canvas to measure actual panel bounds
        let measure_canvas = canvas(
            move |bounds, _window, cx| {
                model_measure.update(cx, |game, cx| game.set_panel_bounds(bounds, cx));
            },
            |_, _, _, _| {},
        )
        .absolute()
        .top_0()
        .left_0()
        .size_full();

        let board_panel_with_measure = div()
            .relative()
            .size_full()
            .child(measure_canvas)
            .child(board_panel_content);

        let side_panel_content = render_side_panel(&model, cx);

        // Main resizable layout
        div().size_full().font_family("Berkeley Mono").child(
            h_resizable("chess-layout")
                .child(
                    resizable_panel()
                        .size(px(INITIAL_LEFT_PANEL))
                        .size_range(px(320.)..px(1200.))
                        .child(board_panel_with_measure),
                )
                .child(
                    resizable_panel()
                        .size(px(INITIAL_RIGHT_PANEL))
                        .size_range(px(150.)..Pixels::MAX)
                        .child(side_panel_content),
                ),
        )
    }
}
